use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackingUniques::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrackingUniques::CampaignId).uuid().not_null())
                    .col(ColumnDef::new(TrackingUniques::ContactId).uuid().not_null())
                    .col(ColumnDef::new(TrackingUniques::EventType).string().not_null())
                    .col(
                        ColumnDef::new(TrackingUniques::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TrackingUniques::CampaignId)
                            .col(TrackingUniques::ContactId)
                            .col(TrackingUniques::EventType),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackingUniques::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TrackingUniques {
    Table,
    CampaignId,
    ContactId,
    EventType,
    CreatedAt,
}
