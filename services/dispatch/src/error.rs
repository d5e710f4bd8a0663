use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Dispatch service error variants.
///
/// `CampaignNotFound` and `MissingRedirectUrl` are terminal — the queue never
/// retries them. `Internal` propagates infrastructure failures and triggers
/// the queue's retry-with-backoff when thrown from a job.
#[derive(Debug, thiserror::Error)]
pub enum DispatchServiceError {
    #[error("campaign not found")]
    CampaignNotFound,
    #[error("missing redirect url")]
    MissingRedirectUrl,
    #[error("unauthorized")]
    Unauthorized,
    #[error("dispatch already in progress for this campaign")]
    DispatchInProgress,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DispatchServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CampaignNotFound => "CAMPAIGN_NOT_FOUND",
            Self::MissingRedirectUrl => "MISSING_REDIRECT_URL",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::DispatchInProgress => "DISPATCH_IN_PROGRESS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for DispatchServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::CampaignNotFound => StatusCode::NOT_FOUND,
            Self::MissingRedirectUrl => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::DispatchInProgress => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, code = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
