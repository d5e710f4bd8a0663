use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use mailwave_core::health::{healthz, readyz};
use mailwave_core::middleware::request_id_layer;

use crate::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TrackingStore,
};
use crate::handlers::campaign::{schedule_send, send_now};
use crate::handlers::tracking::{track_click, track_open};
use crate::state::AppState;

pub fn build_router<S, D, T, K, Q>(state: AppState<S, D, T, K, Q>) -> Router
where
    S: CampaignStore + Clone + 'static,
    D: ContactDirectory + Clone + 'static,
    T: MailTransport + Clone + 'static,
    K: TrackingStore + Clone + 'static,
    Q: DispatchScheduler + Clone + 'static,
{
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Dispatch
        .route(
            "/marketing-email/send-now",
            post(send_now::<S, D, T, K, Q>),
        )
        .route(
            "/marketing-email/send",
            post(schedule_send::<S, D, T, K, Q>),
        )
        // Public tracking endpoints (no auth, hit from mail clients)
        .route(
            "/marketing-email/tracking/open",
            get(track_open::<S, D, T, K, Q>),
        )
        .route(
            "/marketing-email/tracking/click",
            get(track_click::<S, D, T, K, Q>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
