use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackingEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackingEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackingEvents::EventType).string().not_null())
                    .col(ColumnDef::new(TrackingEvents::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(TrackingEvents::ContactId).uuid().not_null())
                    .col(ColumnDef::new(TrackingEvents::MessageId).string())
                    .col(ColumnDef::new(TrackingEvents::Url).text())
                    .col(ColumnDef::new(TrackingEvents::UtmSource).string())
                    .col(ColumnDef::new(TrackingEvents::UtmMedium).string())
                    .col(ColumnDef::new(TrackingEvents::UtmCampaign).string())
                    .col(ColumnDef::new(TrackingEvents::UtmTerm).string())
                    .col(ColumnDef::new(TrackingEvents::UtmContent).string())
                    .col(ColumnDef::new(TrackingEvents::Ip).string())
                    .col(ColumnDef::new(TrackingEvents::UserAgent).text())
                    .col(ColumnDef::new(TrackingEvents::Browser).string())
                    .col(ColumnDef::new(TrackingEvents::Os).string())
                    .col(ColumnDef::new(TrackingEvents::DeviceType).string())
                    .col(ColumnDef::new(TrackingEvents::Referrer).text())
                    .col(
                        ColumnDef::new(TrackingEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TrackingEvents::Table)
                    .col(TrackingEvents::CampaignId)
                    .col(TrackingEvents::ContactId)
                    .col(TrackingEvents::EventType)
                    .name("idx_tracking_events_campaign_contact_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackingEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TrackingEvents {
    Table,
    Id,
    EventType,
    CampaignId,
    ContactId,
    MessageId,
    Url,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmTerm,
    UtmContent,
    Ip,
    UserAgent,
    Browser,
    Os,
    DeviceType,
    Referrer,
    CreatedAt,
}
