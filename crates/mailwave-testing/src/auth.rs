//! Bearer-auth helpers for integration tests.
//!
//! The dispatch service forwards the caller's bearer token to the content
//! store and directory; tests use `MockBearer` to build the `Authorization`
//! header without a real token issuer.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// A canned bearer token injected into test requests.
pub struct MockBearer {
    pub token: String,
}

impl MockBearer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Return headers as if an authenticated client sent them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        );
        map
    }
}
