use mailwave_domain::campaign::{Campaign, RecipientSpec};
use mailwave_domain::contact::Contact;

use crate::domain::repository::ContactDirectory;
use crate::domain::types::AuthContext;
use crate::error::DispatchServiceError;

// ── ResolveRecipients ────────────────────────────────────────────────────────

/// Expand a campaign's recipient spec into concrete contacts, re-resolved
/// against the directory on every dispatch (never cached).
pub struct ResolveRecipientsUseCase<D: ContactDirectory> {
    pub directory: D,
}

impl<D: ContactDirectory> ResolveRecipientsUseCase<D> {
    pub async fn execute(
        &self,
        campaign: &Campaign,
        auth: &AuthContext,
    ) -> Result<Vec<Contact>, DispatchServiceError> {
        let ids = match &campaign.recipients {
            RecipientSpec::Segments { segments } => {
                let mut ids = Vec::new();
                for segment_id in segments {
                    // Ids are concatenated across segments without deduplication.
                    let mut segment_ids =
                        self.directory.segment_contact_ids(*segment_id, auth).await?;
                    ids.append(&mut segment_ids);
                }
                ids
            }
            RecipientSpec::Contacts { contacts } => contacts.clone(),
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.directory.contacts_by_ids(&ids, auth).await
    }
}
