//! Campaign definition as stored by the external content store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a campaign. Written only by the summary aggregator,
/// exactly once per dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Sent,
}

/// Aggregate counters for one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendSummary {
    #[serde(default)]
    pub total_sent: u32,
    #[serde(default)]
    pub total_failed: u32,
    #[serde(default)]
    pub total_delivered: u32,
}

/// Recipient selection: either named segments or an explicit contact list.
/// Resolved against the external directory at dispatch time, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecipientSpec {
    Segments { segments: Vec<Uuid> },
    Contacts { contacts: Vec<Uuid> },
}

/// A bulk email campaign: content + recipient spec + summary/status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub subject: String,
    pub from_email: String,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    pub html_body: String,
    #[serde(default)]
    pub preview_text: Option<String>,
    pub recipients: RecipientSpec,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub send_summary: SendSummary,
    #[serde(default)]
    pub error_log: Option<String>,
}
