use crate::domain::repository::TrackingStore;
use crate::domain::types::NewTrackingEvent;
use crate::error::DispatchServiceError;

// ── RecordTrackingEvent ──────────────────────────────────────────────────────

/// Record one engagement event with deduplicated unique counting.
///
/// The raw event is always inserted — every OPEN/CLICK is retained for audit.
/// The unique counter only moves when the atomic first-claim insert lands, so
/// two near-simultaneous first events from the same contact cannot
/// double-increment.
pub struct RecordTrackingEventUseCase<K: TrackingStore> {
    pub store: K,
}

impl<K: TrackingStore> RecordTrackingEventUseCase<K> {
    pub async fn execute(&self, event: NewTrackingEvent) -> Result<(), DispatchServiceError> {
        self.store.insert_event(&event).await?;

        if event.kind.unique_counted() {
            let first = self
                .store
                .claim_first(event.campaign_id, event.contact_id, event.kind)
                .await?;
            if first {
                self.store.bump_unique(event.campaign_id, event.kind).await?;
            }
        }
        Ok(())
    }
}
