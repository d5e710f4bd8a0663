use anyhow::Context;
use serde::Deserialize;

use crate::domain::repository::MailTransport;
use crate::domain::types::{OutboundEmail, SendReceipt, TransportError};

/// Mail transport backed by the external sending gateway.
///
/// The `Idempotency-Key` header carries the stable per-(campaign, contact)
/// key so a queue retry of a whole campaign cannot double-deliver.
#[derive(Clone)]
pub struct HttpMailTransport {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TransportResponse {
    accepted: bool,
    message_id: Option<String>,
    error: Option<String>,
}

impl HttpMailTransport {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, TransportError> {
        let url = format!("{}/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("idempotency-key", &email.idempotency_key)
            .json(email)
            .send()
            .await
            .context("send email")?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(format!(
                "transport returned {status}"
            )));
        }

        let body = response
            .json::<TransportResponse>()
            .await
            .context("decode transport response")?;
        if !body.accepted {
            return Err(TransportError::Rejected(
                body.error.unwrap_or_else(|| "rejected without reason".to_owned()),
            ));
        }
        Ok(SendReceipt {
            message_id: body.message_id,
        })
    }
}
