use std::future::Future;

use uuid::Uuid;

use mailwave_domain::campaign::Campaign;
use mailwave_domain::contact::Contact;
use mailwave_domain::tracking::TrackingEventKind;

use crate::domain::types::{
    AuthContext, CampaignPatch, NewTrackingEvent, OutboundEmail, SendReceipt, TransportError,
};
use crate::error::DispatchServiceError;

// Port methods return `impl Future + Send` rather than plain `async fn`:
// the futures cross `tokio::spawn` and axum handler bounds through generic
// code, which needs the `Send` promise in the trait itself. Implementations
// still write `async fn`.

/// Port to the external campaign/content store.
pub trait CampaignStore: Send + Sync {
    /// Fetch a campaign by id. `Ok(None)` when the store has no such campaign.
    fn fetch(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> impl Future<Output = Result<Option<Campaign>, DispatchServiceError>> + Send;

    /// Apply a partial update to a campaign record.
    fn update(
        &self,
        id: Uuid,
        patch: &CampaignPatch,
        auth: &AuthContext,
    ) -> impl Future<Output = Result<(), DispatchServiceError>> + Send;
}

/// Port to the external contact/segment directory. Read-only.
pub trait ContactDirectory: Send + Sync {
    /// Contact ids belonging to one segment, resolved at dispatch time.
    fn segment_contact_ids(
        &self,
        segment_id: Uuid,
        auth: &AuthContext,
    ) -> impl Future<Output = Result<Vec<Uuid>, DispatchServiceError>> + Send;

    /// Batch-fetch contact records by id.
    fn contacts_by_ids(
        &self,
        ids: &[Uuid],
        auth: &AuthContext,
    ) -> impl Future<Output = Result<Vec<Contact>, DispatchServiceError>> + Send;
}

/// Port to the mail transport. One call per recipient; failures here are
/// per-recipient, not infrastructural.
pub trait MailTransport: Send + Sync {
    fn send(
        &self,
        email: &OutboundEmail,
    ) -> impl Future<Output = Result<SendReceipt, TransportError>> + Send;
}

/// Port to the tracking-event store.
pub trait TrackingStore: Send + Sync {
    /// Append a raw event. Every event is retained regardless of first-ness.
    fn insert_event(
        &self,
        event: &NewTrackingEvent,
    ) -> impl Future<Output = Result<(), DispatchServiceError>> + Send;

    /// Atomically claim "first event of this kind for (campaign, contact)".
    /// Returns `true` exactly once per triple across all concurrent callers.
    fn claim_first(
        &self,
        campaign_id: Uuid,
        contact_id: Uuid,
        kind: TrackingEventKind,
    ) -> impl Future<Output = Result<bool, DispatchServiceError>> + Send;

    /// Increment the campaign's unique counter for `kind`.
    fn bump_unique(
        &self,
        campaign_id: Uuid,
        kind: TrackingEventKind,
    ) -> impl Future<Output = Result<(), DispatchServiceError>> + Send;
}

/// Port to the service-account token issuer, used when a queued job carries
/// no caller bearer.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> impl Future<Output = Result<AuthContext, DispatchServiceError>> + Send;
}

/// Producer port to the durable job queue: schedule a campaign dispatch to
/// run asynchronously, returning the job id.
pub trait DispatchScheduler: Send + Sync {
    fn schedule(
        &self,
        campaign_id: Uuid,
        auth: &AuthContext,
    ) -> impl Future<Output = Result<Uuid, DispatchServiceError>> + Send;
}
