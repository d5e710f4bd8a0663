use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DispatchJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DispatchJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DispatchJobs::Kind).string().not_null())
                    .col(ColumnDef::new(DispatchJobs::Payload).json_binary().not_null())
                    .col(ColumnDef::new(DispatchJobs::Status).string().not_null())
                    .col(ColumnDef::new(DispatchJobs::Attempts).integer().not_null())
                    .col(ColumnDef::new(DispatchJobs::MaxAttempts).integer().not_null())
                    .col(
                        ColumnDef::new(DispatchJobs::RunAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DispatchJobs::LastError).text())
                    .col(
                        ColumnDef::new(DispatchJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DispatchJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The worker claims by (status, run_at); keep that scan indexed.
        manager
            .create_index(
                Index::create()
                    .table(DispatchJobs::Table)
                    .col(DispatchJobs::Status)
                    .col(DispatchJobs::RunAt)
                    .name("idx_dispatch_jobs_status_run_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DispatchJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DispatchJobs {
    Table,
    Id,
    Kind,
    Payload,
    Status,
    Attempts,
    MaxAttempts,
    RunAt,
    LastError,
    CreatedAt,
    UpdatedAt,
}
