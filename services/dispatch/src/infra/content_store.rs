use anyhow::Context;
use reqwest::StatusCode;
use uuid::Uuid;

use mailwave_domain::campaign::Campaign;

use crate::domain::repository::CampaignStore;
use crate::domain::types::{AuthContext, CampaignPatch};
use crate::error::DispatchServiceError;

/// Campaign store backed by the external content service's REST API.
#[derive(Clone)]
pub struct HttpCampaignStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCampaignStore {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl CampaignStore for HttpCampaignStore {
    async fn fetch(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> Result<Option<Campaign>, DispatchServiceError> {
        let url = format!("{}/marketing-emails/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&auth.token)
            .send()
            .await
            .context("fetch campaign")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .context("fetch campaign status")?;
        let campaign = response
            .json::<Campaign>()
            .await
            .context("decode campaign")?;
        Ok(Some(campaign))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CampaignPatch,
        auth: &AuthContext,
    ) -> Result<(), DispatchServiceError> {
        let url = format!("{}/marketing-emails/{id}", self.base_url);
        self.client
            .patch(&url)
            .bearer_auth(&auth.token)
            .json(patch)
            .send()
            .await
            .context("update campaign")?
            .error_for_status()
            .context("update campaign status")?;
        Ok(())
    }
}
