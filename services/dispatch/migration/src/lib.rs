use sea_orm_migration::prelude::*;

mod m20260815_000001_create_tracking_events;
mod m20260815_000002_create_tracking_uniques;
mod m20260815_000003_create_campaign_counters;
mod m20260815_000004_create_dispatch_jobs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_create_tracking_events::Migration),
            Box::new(m20260815_000002_create_tracking_uniques::Migration),
            Box::new(m20260815_000003_create_campaign_counters::Migration),
            Box::new(m20260815_000004_create_dispatch_jobs::Migration),
        ]
    }
}
