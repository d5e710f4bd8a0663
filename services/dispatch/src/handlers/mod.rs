pub mod campaign;
pub mod tracking;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use crate::domain::types::AuthContext;
use crate::error::DispatchServiceError;

/// Bearer-token extractor. Rejects with 401 when the `Authorization` header
/// is absent or not a bearer credential.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = DispatchServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();
        async move {
            let bearer = bearer.ok_or(DispatchServiceError::Unauthorized)?;
            Ok(AuthContext::new(bearer.token()))
        }
    }
}
