use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use uuid::Uuid;

use mailwave_domain::campaign::{Campaign, RecipientSpec};
use mailwave_domain::contact::Contact;
use mailwave_domain::tracking::TrackingEventKind;

use mailwave_dispatch::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TrackingStore,
};
use mailwave_dispatch::domain::types::{
    AuthContext, CampaignPatch, NewTrackingEvent, OutboundEmail, SendReceipt, SendSettings,
    TransportError,
};
use mailwave_dispatch::error::DispatchServiceError;

pub fn test_auth() -> AuthContext {
    AuthContext::new("test-token")
}

pub fn test_settings() -> SendSettings {
    SendSettings {
        batch_size: 10,
        batch_pause: std::time::Duration::from_millis(1000),
        tracking_base_url: "https://track.example.com/marketing-email/tracking".to_owned(),
    }
}

pub fn test_contact(n: usize) -> Contact {
    Contact {
        id: Uuid::new_v4(),
        email: format!("contact{n}@example.com"),
        name: Some(format!("Contact {n}")),
        extra: serde_json::Map::new(),
    }
}

pub fn test_contacts(count: usize) -> Vec<Contact> {
    (0..count).map(test_contact).collect()
}

pub fn test_campaign(contact_ids: Vec<Uuid>) -> Campaign {
    Campaign {
        id: Uuid::new_v4(),
        subject: "Spring launch".to_owned(),
        from_email: "news@example.com".to_owned(),
        from_name: Some("Example News".to_owned()),
        reply_to: None,
        html_body: "<html><body><p>Hi {contact_name}</p>\
                    <a href=\"https://example.com/launch\">Read more</a></body></html>"
            .to_owned(),
        preview_text: None,
        recipients: RecipientSpec::Contacts {
            contacts: contact_ids,
        },
        status: Default::default(),
        send_summary: Default::default(),
        error_log: None,
    }
}

// ── MockCampaignStore ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockCampaignStore {
    pub campaigns: Arc<Vec<Campaign>>,
    pub patches: Arc<Mutex<Vec<(Uuid, CampaignPatch)>>>,
}

impl MockCampaignStore {
    pub fn new(campaigns: Vec<Campaign>) -> Self {
        Self {
            campaigns: Arc::new(campaigns),
            patches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the recorded patches for post-execution inspection.
    pub fn patches_handle(&self) -> Arc<Mutex<Vec<(Uuid, CampaignPatch)>>> {
        Arc::clone(&self.patches)
    }
}

impl CampaignStore for MockCampaignStore {
    async fn fetch(
        &self,
        id: Uuid,
        _auth: &AuthContext,
    ) -> Result<Option<Campaign>, DispatchServiceError> {
        Ok(self.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CampaignPatch,
        _auth: &AuthContext,
    ) -> Result<(), DispatchServiceError> {
        self.patches.lock().unwrap().push((id, patch.clone()));
        Ok(())
    }
}

// ── MockDirectory ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDirectory {
    pub segments: Arc<HashMap<Uuid, Vec<Uuid>>>,
    pub contacts: Arc<Vec<Contact>>,
    pub fail: bool,
}

impl MockDirectory {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: Arc::new(contacts),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl ContactDirectory for MockDirectory {
    async fn segment_contact_ids(
        &self,
        segment_id: Uuid,
        _auth: &AuthContext,
    ) -> Result<Vec<Uuid>, DispatchServiceError> {
        if self.fail {
            return Err(anyhow::anyhow!("directory unreachable").into());
        }
        Ok(self.segments.get(&segment_id).cloned().unwrap_or_default())
    }

    async fn contacts_by_ids(
        &self,
        ids: &[Uuid],
        _auth: &AuthContext,
    ) -> Result<Vec<Contact>, DispatchServiceError> {
        if self.fail {
            return Err(anyhow::anyhow!("directory unreachable").into());
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.contacts.iter().find(|c| c.id == *id).cloned())
            .collect())
    }
}

// ── MockTransport ────────────────────────────────────────────────────────────

/// Recorded send: recipient address and the (tokio) instant it was attempted,
/// so paused-clock tests can assert inter-batch pacing.
pub type SentLog = Arc<Mutex<Vec<(String, Instant)>>>;

#[derive(Clone, Default)]
pub struct MockTransport {
    pub failing_emails: Arc<HashSet<String>>,
    pub sends: SentLog,
    pub idempotency_keys: Arc<Mutex<Vec<String>>>,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn failing_for(emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            failing_emails: Arc::new(emails.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn sends_handle(&self) -> SentLog {
        Arc::clone(&self.sends)
    }
}

impl MailTransport for MockTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, TransportError> {
        self.sends
            .lock()
            .unwrap()
            .push((email.to_email.clone(), Instant::now()));
        self.idempotency_keys
            .lock()
            .unwrap()
            .push(email.idempotency_key.clone());
        self.bodies.lock().unwrap().push(email.html.clone());
        if self.failing_emails.contains(&email.to_email) {
            return Err(TransportError::Rejected("mailbox unavailable".to_owned()));
        }
        Ok(SendReceipt {
            message_id: Some(format!("msg-{}", email.to_email)),
        })
    }
}

// ── MockScheduler ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockScheduler {
    pub scheduled: Arc<Mutex<Vec<(Uuid, String)>>>,
}

impl DispatchScheduler for MockScheduler {
    async fn schedule(
        &self,
        campaign_id: Uuid,
        auth: &AuthContext,
    ) -> Result<Uuid, DispatchServiceError> {
        self.scheduled
            .lock()
            .unwrap()
            .push((campaign_id, auth.token.clone()));
        Ok(Uuid::now_v7())
    }
}

// ── MockTrackingStore ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockTrackingStore {
    pub events: Arc<Mutex<Vec<NewTrackingEvent>>>,
    pub claims: Arc<Mutex<HashSet<(Uuid, Uuid, TrackingEventKind)>>>,
    pub counters: Arc<Mutex<HashMap<(Uuid, TrackingEventKind), u64>>>,
    pub fail: bool,
}

impl MockTrackingStore {
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events_handle(&self) -> Arc<Mutex<Vec<NewTrackingEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn counter(&self, campaign_id: Uuid, kind: TrackingEventKind) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(&(campaign_id, kind))
            .copied()
            .unwrap_or(0)
    }
}

impl TrackingStore for MockTrackingStore {
    async fn insert_event(&self, event: &NewTrackingEvent) -> Result<(), DispatchServiceError> {
        if self.fail {
            return Err(anyhow::anyhow!("tracking store unreachable").into());
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn claim_first(
        &self,
        campaign_id: Uuid,
        contact_id: Uuid,
        kind: TrackingEventKind,
    ) -> Result<bool, DispatchServiceError> {
        if self.fail {
            return Err(anyhow::anyhow!("tracking store unreachable").into());
        }
        Ok(self
            .claims
            .lock()
            .unwrap()
            .insert((campaign_id, contact_id, kind)))
    }

    async fn bump_unique(
        &self,
        campaign_id: Uuid,
        kind: TrackingEventKind,
    ) -> Result<(), DispatchServiceError> {
        if self.fail {
            return Err(anyhow::anyhow!("tracking store unreachable").into());
        }
        *self
            .counters
            .lock()
            .unwrap()
            .entry((campaign_id, kind))
            .or_default() += 1;
        Ok(())
    }
}
