use mailwave_core::drain::TaskDrain;

use crate::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TrackingStore,
};
use crate::domain::types::SendSettings;
use crate::usecase::dispatch::DispatchGuard;

/// Shared application state passed to every handler via axum `State`.
///
/// Generic over the outbound ports so handler tests can swap in mocks; the
/// binary instantiates it with the HTTP/DB implementations from `infra`.
#[derive(Clone)]
pub struct AppState<S, D, T, K, Q>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
    Q: DispatchScheduler + Clone,
{
    pub campaigns: S,
    pub directory: D,
    pub transport: T,
    pub tracking: K,
    pub scheduler: Q,
    pub guard: DispatchGuard,
    pub drain: TaskDrain,
    pub settings: SendSettings,
}
