use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TokenIssuer, TrackingStore,
};
use crate::domain::types::AuthContext;
use crate::error::DispatchServiceError;
use crate::queue::{JobHandler, JobOptions, JobQueue};
use crate::usecase::dispatch::DispatchCampaignUseCase;

pub const DISPATCH_JOB_KIND: &str = "campaign.dispatch";

/// Payload of a queued campaign dispatch. The caller's bearer may be carried
/// along; when absent the handler authenticates with a service-account token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchJobPayload {
    pub campaign_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

/// Producer side: enqueues a `campaign.dispatch` job carrying the caller's
/// bearer so the worker acts with the caller's authority.
#[derive(Clone)]
pub struct QueuedDispatcher {
    pub queue: JobQueue,
    pub options: JobOptions,
}

impl DispatchScheduler for QueuedDispatcher {
    async fn schedule(
        &self,
        campaign_id: Uuid,
        auth: &AuthContext,
    ) -> Result<Uuid, DispatchServiceError> {
        let payload = serde_json::to_value(DispatchJobPayload {
            campaign_id,
            auth: Some(auth.token.clone()),
        })
        .map_err(|e| anyhow::anyhow!("encode dispatch payload: {e}"))?;
        let job_id = self
            .queue
            .enqueue(DISPATCH_JOB_KIND, payload, self.options)
            .await?;
        Ok(job_id)
    }
}

/// Queue handler that runs the full dispatch pipeline for one campaign.
pub struct DispatchJobHandler<S, D, T, K, I>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
    I: TokenIssuer,
{
    pub usecase: DispatchCampaignUseCase<S, D, T, K>,
    pub token_issuer: I,
}

#[async_trait::async_trait]
impl<S, D, T, K, I> JobHandler for DispatchJobHandler<S, D, T, K, I>
where
    S: CampaignStore + Clone + Send + Sync,
    D: ContactDirectory + Clone + Send + Sync,
    T: MailTransport + Clone + Send + Sync,
    K: TrackingStore + Clone + Send + Sync,
    I: TokenIssuer + Send + Sync,
{
    async fn run(&self, payload: serde_json::Value) -> anyhow::Result<()> {
        let payload: DispatchJobPayload =
            serde_json::from_value(payload).map_err(|e| anyhow::anyhow!("bad payload: {e}"))?;

        let auth = match payload.auth {
            Some(token) => AuthContext::new(token),
            None => self
                .token_issuer
                .issue()
                .await
                .map_err(|e| anyhow::anyhow!("issue service token: {e}"))?,
        };

        match self.usecase.execute(payload.campaign_id, &auth).await {
            Ok(_) => Ok(()),
            // A vanished campaign is terminal, retrying cannot make it appear.
            Err(DispatchServiceError::CampaignNotFound) => {
                tracing::warn!(
                    campaign = %payload.campaign_id,
                    "queued dispatch dropped, campaign no longer exists"
                );
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e)),
        }
    }
}
