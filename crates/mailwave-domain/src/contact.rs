//! Contact and segment records, owned by the external directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flatten::flatten;

/// An addressable recipient. Read-only to this service; any extra fields the
/// directory returns (custom attributes, nested profile objects) are kept in
/// `extra` and exposed to template personalization via [`Contact::flattened`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten, default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Contact {
    /// Project the full contact record into a flat key→value map for
    /// `{contact_<field>}` token resolution.
    pub fn flattened(&self) -> BTreeMap<String, String> {
        let value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        flatten(&value)
    }
}

/// A named group resolving to a contact-id set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub contact_ids: Vec<Uuid>,
}
