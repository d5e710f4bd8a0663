use mailwave_domain::campaign::{CampaignStatus, SendSummary};
use uuid::Uuid;

use crate::domain::repository::CampaignStore;
use crate::domain::types::{AuthContext, BatchOutcome, CampaignPatch};
use crate::error::DispatchServiceError;

// ── PersistSummary ───────────────────────────────────────────────────────────

/// Fold a delivery run into the campaign record.
///
/// The campaign moves to `sent` only when at least one recipient was actually
/// delivered to; an all-failed run leaves it in `draft` so the operator can
/// fix and re-dispatch.
pub struct PersistSummaryUseCase<S: CampaignStore> {
    pub store: S,
}

impl<S: CampaignStore> PersistSummaryUseCase<S> {
    pub async fn execute(
        &self,
        campaign_id: Uuid,
        outcome: &BatchOutcome,
        auth: &AuthContext,
    ) -> Result<(), DispatchServiceError> {
        let patch = summary_patch(outcome);
        self.store.update(campaign_id, &patch, auth).await
    }
}

fn summary_patch(outcome: &BatchOutcome) -> CampaignPatch {
    let status = if outcome.sent > 0 {
        CampaignStatus::Sent
    } else {
        CampaignStatus::Draft
    };
    let error_log = if outcome.errors.is_empty() {
        None
    } else {
        Some(outcome.errors.join("\n"))
    };
    CampaignPatch {
        status,
        send_summary: Some(SendSummary {
            total_sent: outcome.sent,
            total_failed: outcome.failed,
            total_delivered: outcome.delivered,
        }),
        error_log,
    }
}
