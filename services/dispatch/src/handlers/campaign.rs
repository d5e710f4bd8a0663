use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TrackingStore,
};
use crate::domain::types::AuthContext;
use crate::error::DispatchServiceError;
use crate::state::AppState;
use crate::usecase::dispatch::DispatchCampaignUseCase;

// ── POST /marketing-email/send-now ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNowRequest {
    pub marketing_email_id: Uuid,
}

#[derive(Serialize)]
pub struct SendNowResponse {
    pub success: bool,
    pub data: SendNowData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNowData {
    pub marketing_email_id: Uuid,
    pub total_contacts: usize,
    pub sent: u32,
    pub failed: u32,
    pub delivered: u32,
    pub processing_time: f64,
}

pub async fn send_now<S, D, T, K, Q>(
    auth: AuthContext,
    State(state): State<AppState<S, D, T, K, Q>>,
    Json(body): Json<SendNowRequest>,
) -> Result<Json<SendNowResponse>, DispatchServiceError>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
    Q: DispatchScheduler + Clone,
{
    let usecase = DispatchCampaignUseCase {
        store: state.campaigns.clone(),
        directory: state.directory.clone(),
        transport: state.transport.clone(),
        tracking: state.tracking.clone(),
        guard: state.guard.clone(),
        settings: state.settings.clone(),
    };
    let outcome = usecase.execute(body.marketing_email_id, &auth).await?;
    Ok(Json(SendNowResponse {
        success: true,
        data: SendNowData {
            marketing_email_id: body.marketing_email_id,
            total_contacts: outcome.total_contacts,
            sent: outcome.sent,
            failed: outcome.failed,
            delivered: outcome.delivered,
            processing_time: outcome.processing_time_seconds,
        },
    }))
}

// ── POST /marketing-email/send ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct ScheduleSendResponse {
    pub success: bool,
    pub data: ScheduleSendData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSendData {
    pub marketing_email_id: Uuid,
    pub job_id: Uuid,
}

/// Enqueue the dispatch instead of running it inline; the worker pool picks
/// it up with the caller's bearer and the queue's retry policy applies.
pub async fn schedule_send<S, D, T, K, Q>(
    auth: AuthContext,
    State(state): State<AppState<S, D, T, K, Q>>,
    Json(body): Json<SendNowRequest>,
) -> Result<(StatusCode, Json<ScheduleSendResponse>), DispatchServiceError>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
    Q: DispatchScheduler + Clone,
{
    let job_id = state
        .scheduler
        .schedule(body.marketing_email_id, &auth)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ScheduleSendResponse {
            success: true,
            data: ScheduleSendData {
                marketing_email_id: body.marketing_email_id,
                job_id,
            },
        }),
    ))
}
