use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, EntityTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use mailwave_dispatch_schema::{campaign_counters, tracking_events, tracking_uniques};
use mailwave_domain::tracking::TrackingEventKind;

use crate::domain::repository::TrackingStore;
use crate::domain::types::NewTrackingEvent;
use crate::error::DispatchServiceError;

/// Tracking store over the service-owned tables.
#[derive(Clone)]
pub struct DbTrackingStore {
    db: Arc<DatabaseConnection>,
}

impl DbTrackingStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TrackingStore for DbTrackingStore {
    async fn insert_event(&self, event: &NewTrackingEvent) -> Result<(), DispatchServiceError> {
        let row = tracking_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            event_type: Set(event.kind.as_str().to_owned()),
            campaign_id: Set(event.campaign_id),
            contact_id: Set(event.contact_id),
            message_id: Set(event.message_id.clone()),
            url: Set(event.url.clone()),
            utm_source: Set(event.utm.source.clone()),
            utm_medium: Set(event.utm.medium.clone()),
            utm_campaign: Set(event.utm.campaign.clone()),
            utm_term: Set(event.utm.term.clone()),
            utm_content: Set(event.utm.content.clone()),
            ip: Set(event.meta.ip.clone()),
            user_agent: Set(event.meta.user_agent.clone()),
            browser: Set(event.meta.browser.clone()),
            os: Set(event.meta.os.clone()),
            device_type: Set(event.meta.device_type.clone()),
            referrer: Set(event.meta.referrer.clone()),
            created_at: Set(Utc::now()),
        };
        tracking_events::Entity::insert(row)
            .exec_without_returning(self.db.as_ref())
            .await
            .context("insert tracking event")?;
        Ok(())
    }

    async fn claim_first(
        &self,
        campaign_id: Uuid,
        contact_id: Uuid,
        kind: TrackingEventKind,
    ) -> Result<bool, DispatchServiceError> {
        let claim = tracking_uniques::ActiveModel {
            campaign_id: Set(campaign_id),
            contact_id: Set(contact_id),
            event_type: Set(kind.as_str().to_owned()),
            created_at: Set(Utc::now()),
        };
        // DO NOTHING + rows-affected is the atomic "was this the first"
        // primitive; two concurrent claims cannot both see an insert land.
        let inserted = tracking_uniques::Entity::insert(claim)
            .on_conflict(
                OnConflict::columns([
                    tracking_uniques::Column::CampaignId,
                    tracking_uniques::Column::ContactId,
                    tracking_uniques::Column::EventType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .context("claim first tracking event")?;
        Ok(inserted > 0)
    }

    async fn bump_unique(
        &self,
        campaign_id: Uuid,
        kind: TrackingEventKind,
    ) -> Result<(), DispatchServiceError> {
        let column = match kind {
            TrackingEventKind::Open => campaign_counters::Column::OpensUnique,
            TrackingEventKind::Click => campaign_counters::Column::ClicksUnique,
            TrackingEventKind::Sent => return Ok(()),
        };
        let now = Utc::now();
        let row = campaign_counters::ActiveModel {
            campaign_id: Set(campaign_id),
            opens_unique: Set(i64::from(kind == TrackingEventKind::Open)),
            clicks_unique: Set(i64::from(kind == TrackingEventKind::Click)),
            updated_at: Set(now),
        };
        campaign_counters::Entity::insert(row)
            .on_conflict(
                OnConflict::column(campaign_counters::Column::CampaignId)
                    .values([
                        (column, Expr::col(column).add(1).into()),
                        (
                            campaign_counters::Column::UpdatedAt,
                            Expr::current_timestamp().into(),
                        ),
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .context("bump unique counter")?;
        Ok(())
    }
}
