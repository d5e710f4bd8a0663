use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mailwave_domain::campaign::{CampaignStatus, SendSummary};
use mailwave_domain::tracking::{TrackingEventKind, UtmParams};

/// Caller credentials forwarded verbatim to the content store and directory.
/// Comes either from the HTTP bearer header or from the service-account
/// token issuer (queued dispatches).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub token: String,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// One fully personalized message handed to the mail transport.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub from_email: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub html: String,
    /// Stable per-(campaign, contact) key so a queue retry of the whole
    /// campaign does not duplicate delivery.
    #[serde(skip)]
    pub idempotency_key: String,
}

/// Transport acknowledgement for a single send.
#[derive(Debug, Clone, Deserialize)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

/// Single-recipient send failure. Recovered locally by the batch engine,
/// never aborts siblings.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("send rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Sent,
    Failed,
}

/// Per-recipient delivery record emitted by the batch engine.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    pub contact_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub status: SendStatus,
    #[serde(serialize_with = "mailwave_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
}

/// Aggregate result of one batched delivery run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub sent: u32,
    pub failed: u32,
    pub delivered: u32,
    /// Truncated per-recipient error strings, bounded for persistence.
    pub errors: Vec<String>,
    pub send_results: Vec<SendRecord>,
    pub batch_size: usize,
    pub total_batches: usize,
}

/// Result of one dispatch attempt, as reported to the caller.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub total_contacts: usize,
    pub sent: u32,
    pub failed: u32,
    pub delivered: u32,
    pub processing_time_seconds: f64,
}

/// Delivery pacing and link instrumentation settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct SendSettings {
    pub batch_size: usize,
    pub batch_pause: std::time::Duration,
    pub tracking_base_url: String,
}

/// Request metadata captured on tracking hits.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: Option<String>,
    pub referrer: Option<String>,
}

/// A tracking event about to be recorded. Append-only once persisted.
#[derive(Debug, Clone)]
pub struct NewTrackingEvent {
    pub kind: TrackingEventKind,
    pub campaign_id: Uuid,
    pub contact_id: Uuid,
    pub message_id: Option<String>,
    pub url: Option<String>,
    pub utm: UtmParams,
    pub meta: RequestMeta,
}

impl NewTrackingEvent {
    /// SENT event recorded by the delivery engine after a successful send.
    pub fn sent(campaign_id: Uuid, contact_id: Uuid, message_id: Option<String>) -> Self {
        Self {
            kind: TrackingEventKind::Sent,
            campaign_id,
            contact_id,
            message_id,
            url: None,
            utm: UtmParams::default(),
            meta: RequestMeta::default(),
        }
    }
}

/// Partial campaign update written by the summary aggregator
/// (and the orchestrator's error-reset path).
#[derive(Debug, Clone, Serialize)]
pub struct CampaignPatch {
    pub status: CampaignStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_summary: Option<SendSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<String>,
}
