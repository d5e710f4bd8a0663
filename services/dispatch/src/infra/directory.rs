use anyhow::Context;
use serde::Deserialize;
use uuid::Uuid;

use mailwave_domain::contact::Contact;

use crate::domain::repository::{ContactDirectory, TokenIssuer};
use crate::domain::types::AuthContext;
use crate::error::DispatchServiceError;

/// Contact/segment directory backed by the external directory service.
#[derive(Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SegmentResponse {
    #[allow(dead_code)]
    id: Uuid,
    contact_ids: Vec<Uuid>,
}

impl HttpDirectory {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl ContactDirectory for HttpDirectory {
    async fn segment_contact_ids(
        &self,
        segment_id: Uuid,
        auth: &AuthContext,
    ) -> Result<Vec<Uuid>, DispatchServiceError> {
        let url = format!("{}/segments/{segment_id}", self.base_url);
        let segment = self
            .client
            .get(&url)
            .bearer_auth(&auth.token)
            .send()
            .await
            .context("fetch segment")?
            .error_for_status()
            .context("fetch segment status")?
            .json::<SegmentResponse>()
            .await
            .context("decode segment")?;
        Ok(segment.contact_ids)
    }

    async fn contacts_by_ids(
        &self,
        ids: &[Uuid],
        auth: &AuthContext,
    ) -> Result<Vec<Contact>, DispatchServiceError> {
        let url = format!("{}/contacts/batch", self.base_url);
        let contacts = self
            .client
            .post(&url)
            .bearer_auth(&auth.token)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await
            .context("fetch contacts")?
            .error_for_status()
            .context("fetch contacts status")?
            .json::<Vec<Contact>>()
            .await
            .context("decode contacts")?;
        Ok(contacts)
    }
}

/// Service-account token issuer, used by queued dispatches that carry no
/// caller bearer.
#[derive(Clone)]
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    token_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl HttpTokenIssuer {
    pub fn new(client: reqwest::Client, token_url: &str) -> Self {
        Self {
            client,
            token_url: token_url.to_owned(),
        }
    }
}

impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self) -> Result<AuthContext, DispatchServiceError> {
        let response = self
            .client
            .post(&self.token_url)
            .send()
            .await
            .context("issue service token")?
            .error_for_status()
            .context("issue service token status")?
            .json::<TokenResponse>()
            .await
            .context("decode service token")?;
        Ok(AuthContext::new(response.token))
    }
}
