use chrono::Utc;

use mailwave_domain::campaign::Campaign;
use mailwave_domain::contact::Contact;
use mailwave_domain::tracking::UtmParams;

use crate::content::personalize::personalize;
use crate::content::tracking::{TrackingParams, inject_tracking};
use crate::domain::repository::{MailTransport, TrackingStore};
use crate::domain::types::{
    BatchOutcome, NewTrackingEvent, OutboundEmail, SendRecord, SendSettings, SendStatus,
};

/// At most this many per-recipient error strings are kept for persistence.
const MAX_PERSISTED_ERRORS: usize = 100;
/// Per-recipient error strings are truncated to this length.
const ERROR_MESSAGE_MAX: usize = 200;

// ── BatchDeliveryEngine ──────────────────────────────────────────────────────

/// Rate-controlled delivery: fixed-size batches run strictly in sequence, the
/// sends inside one batch run concurrently with a settle-all strategy, and a
/// fixed pause separates consecutive batches (omitted after the last).
pub struct BatchDeliveryEngine<T: MailTransport, K: TrackingStore> {
    pub transport: T,
    pub tracking: K,
    pub settings: SendSettings,
}

impl<T: MailTransport, K: TrackingStore> BatchDeliveryEngine<T, K> {
    /// Send `recipients` in batches. Per-recipient failures are folded into
    /// the outcome and never abort siblings or the run.
    pub async fn send_batches(&self, campaign: &Campaign, recipients: &[Contact]) -> BatchOutcome {
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = recipients.len().div_ceil(batch_size);
        let mut outcome = BatchOutcome {
            batch_size,
            total_batches,
            ..Default::default()
        };
        let utm = campaign_utm(campaign);

        for (index, batch) in recipients.chunks(batch_size).enumerate() {
            let results = futures::future::join_all(
                batch
                    .iter()
                    .map(|contact| self.send_one(campaign, contact, &utm)),
            )
            .await;

            for (contact, result) in batch.iter().zip(results) {
                match result {
                    Ok(record) => {
                        outcome.sent += 1;
                        outcome.delivered += 1;
                        outcome.send_results.push(record);
                    }
                    Err(message) => {
                        outcome.failed += 1;
                        if outcome.errors.len() < MAX_PERSISTED_ERRORS {
                            outcome.errors.push(format!("{}: {message}", contact.email));
                        }
                        outcome.send_results.push(SendRecord {
                            contact_id: contact.id,
                            email: contact.email.clone(),
                            name: contact.name.clone(),
                            status: SendStatus::Failed,
                            timestamp: Utc::now(),
                        });
                    }
                }
            }

            if index + 1 < total_batches {
                tokio::time::sleep(self.settings.batch_pause).await;
            }
        }
        outcome
    }

    async fn send_one(
        &self,
        campaign: &Campaign,
        contact: &Contact,
        utm: &UtmParams,
    ) -> Result<SendRecord, String> {
        let html = personalize(
            &campaign.html_body,
            campaign.preview_text.as_deref(),
            contact,
        );
        let html = inject_tracking(
            &html,
            &TrackingParams {
                base_url: &self.settings.tracking_base_url,
                campaign_id: campaign.id,
                contact_id: contact.id,
                utm,
            },
        );
        let email = OutboundEmail {
            to_email: contact.email.clone(),
            to_name: contact.name.clone(),
            subject: campaign.subject.clone(),
            from_email: campaign.from_email.clone(),
            from_name: campaign.from_name.clone(),
            reply_to: campaign.reply_to.clone(),
            html,
            // Stable across queue retries so the transport can deduplicate.
            idempotency_key: format!("{}:{}", campaign.id, contact.id),
        };

        let receipt = self
            .transport
            .send(&email)
            .await
            .map_err(|e| truncate(&e.to_string(), ERROR_MESSAGE_MAX))?;

        // Best-effort: a tracking-write failure must not flip a successful
        // send into a failure.
        let event = NewTrackingEvent::sent(campaign.id, contact.id, receipt.message_id);
        if let Err(e) = self.tracking.insert_event(&event).await {
            tracing::warn!(
                error = %e,
                campaign = %campaign.id,
                contact = %contact.id,
                "failed to record SENT event"
            );
        }

        Ok(SendRecord {
            contact_id: contact.id,
            email: contact.email.clone(),
            name: contact.name.clone(),
            status: SendStatus::Sent,
            timestamp: Utc::now(),
        })
    }
}

fn campaign_utm(campaign: &Campaign) -> UtmParams {
    UtmParams {
        source: Some("newsletter".to_owned()),
        medium: Some("email".to_owned()),
        campaign: Some(campaign.subject.clone()),
        term: None,
        content: None,
    }
}

fn truncate(message: &str, max: usize) -> String {
    if message.len() <= max {
        return message.to_owned();
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_owned()
}
