use axum::http::StatusCode;

/// `GET /healthz` — liveness probe. Answers as long as the process serves
/// requests at all; never touches collaborators.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /readyz` — readiness probe. Services with startup dependencies
/// (migrations, warm caches) should route their own handler instead.
pub async fn readyz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ready")
}
