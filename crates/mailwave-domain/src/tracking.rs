//! Engagement-tracking primitives.

use serde::{Deserialize, Serialize};

/// Kind of a tracking event. SENT is recorded by the delivery engine;
/// OPEN and CLICK arrive through the public tracking endpoints and are the
/// only kinds that participate in unique counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingEventKind {
    Sent,
    Open,
    Click,
}

impl TrackingEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Open => "open",
            Self::Click => "click",
        }
    }

    /// Whether this kind contributes to a per-campaign unique counter.
    pub fn unique_counted(self) -> bool {
        matches!(self, Self::Open | Self::Click)
    }
}

/// UTM attribution fields carried through redirect and pixel URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UtmParams {
    /// Present fields as `utm_*` query pairs, in canonical order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.source.as_deref() {
            pairs.push(("utm_source", v));
        }
        if let Some(v) = self.medium.as_deref() {
            pairs.push(("utm_medium", v));
        }
        if let Some(v) = self.campaign.as_deref() {
            pairs.push(("utm_campaign", v));
        }
        if let Some(v) = self.term.as_deref() {
            pairs.push(("utm_term", v));
        }
        if let Some(v) = self.content.as_deref() {
            pairs.push(("utm_content", v));
        }
        pairs
    }
}
