use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use uuid::Uuid;

use mailwave_domain::campaign::{Campaign, CampaignStatus};

use crate::domain::repository::{CampaignStore, ContactDirectory, MailTransport, TrackingStore};
use crate::domain::types::{AuthContext, BatchOutcome, CampaignPatch, DispatchOutcome, SendSettings};
use crate::error::DispatchServiceError;
use crate::usecase::batch::BatchDeliveryEngine;
use crate::usecase::resolve::ResolveRecipientsUseCase;
use crate::usecase::summary::PersistSummaryUseCase;

/// Error text persisted to the campaign on an aborted run is capped here.
const RESET_ERROR_MAX: usize = 500;

// ── DispatchGuard ────────────────────────────────────────────────────────────

/// In-process mutual exclusion per campaign. A second dispatch of the same
/// campaign is rejected while one is running; different campaigns proceed
/// independently.
#[derive(Clone, Default)]
pub struct DispatchGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl DispatchGuard {
    pub fn try_acquire(&self, campaign_id: Uuid) -> Option<DispatchPermit> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(campaign_id) {
            return None;
        }
        Some(DispatchPermit {
            active: Arc::clone(&self.active),
            campaign_id,
        })
    }
}

/// Releases the campaign slot when dropped, on every exit path.
pub struct DispatchPermit {
    active: Arc<Mutex<HashSet<Uuid>>>,
    campaign_id: Uuid,
}

impl Drop for DispatchPermit {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.campaign_id);
    }
}

// ── DispatchCampaign ─────────────────────────────────────────────────────────

/// End-to-end campaign dispatch: fetch, resolve recipients, batched delivery,
/// summary persistence. On an infrastructural abort the campaign is reset to
/// draft (best-effort) so it can be re-dispatched.
pub struct DispatchCampaignUseCase<S, D, T, K>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
{
    pub store: S,
    pub directory: D,
    pub transport: T,
    pub tracking: K,
    pub guard: DispatchGuard,
    pub settings: SendSettings,
}

impl<S, D, T, K> DispatchCampaignUseCase<S, D, T, K>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
{
    pub async fn execute(
        &self,
        campaign_id: Uuid,
        auth: &AuthContext,
    ) -> Result<DispatchOutcome, DispatchServiceError> {
        let _permit = self
            .guard
            .try_acquire(campaign_id)
            .ok_or(DispatchServiceError::DispatchInProgress)?;

        let started = Instant::now();
        let campaign = self
            .store
            .fetch(campaign_id, auth)
            .await?
            .ok_or(DispatchServiceError::CampaignNotFound)?;

        match self.run_and_persist(&campaign, auth).await {
            Ok((total_contacts, outcome)) => {
                tracing::info!(
                    campaign = %campaign.id,
                    total_contacts,
                    sent = outcome.sent,
                    failed = outcome.failed,
                    batches = outcome.total_batches,
                    "dispatch complete"
                );
                Ok(DispatchOutcome {
                    total_contacts,
                    sent: outcome.sent,
                    failed: outcome.failed,
                    delivered: outcome.delivered,
                    processing_time_seconds: started.elapsed().as_secs_f64(),
                })
            }
            Err(e) => {
                tracing::error!(campaign = %campaign.id, error = %e, "dispatch aborted");
                self.reset_to_draft(&campaign, &e, auth).await;
                Err(e)
            }
        }
    }

    async fn run_and_persist(
        &self,
        campaign: &Campaign,
        auth: &AuthContext,
    ) -> Result<(usize, BatchOutcome), DispatchServiceError> {
        let resolver = ResolveRecipientsUseCase {
            directory: self.directory.clone(),
        };
        let recipients = resolver.execute(campaign, auth).await?;

        let engine = BatchDeliveryEngine {
            transport: self.transport.clone(),
            tracking: self.tracking.clone(),
            settings: self.settings.clone(),
        };
        let outcome = engine.send_batches(campaign, &recipients).await;

        let summary = PersistSummaryUseCase {
            store: self.store.clone(),
        };
        summary.execute(campaign.id, &outcome, auth).await?;

        Ok((recipients.len(), outcome))
    }

    /// Best-effort: a failed reset only logs, the original error still
    /// propagates to the caller (and the queue's retry logic).
    async fn reset_to_draft(
        &self,
        campaign: &Campaign,
        error: &DispatchServiceError,
        auth: &AuthContext,
    ) {
        let mut message = match error {
            // Keep the cause chain, "internal error" alone is useless to an
            // operator reading the campaign record.
            DispatchServiceError::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        };
        if message.len() > RESET_ERROR_MAX {
            let mut end = RESET_ERROR_MAX;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        let patch = CampaignPatch {
            status: CampaignStatus::Draft,
            send_summary: None,
            error_log: Some(message),
        };
        if let Err(e) = self.store.update(campaign.id, &patch, auth).await {
            tracing::warn!(campaign = %campaign.id, error = %e, "failed to reset campaign to draft");
        }
    }
}
