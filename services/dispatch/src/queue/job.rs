use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use rand::RngExt;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use mailwave_dispatch_schema::dispatch_jobs;

pub mod status {
    pub const QUEUED: &str = "queued";
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// Per-job scheduling knobs, fixed at enqueue time.
#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    pub max_attempts: i32,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// A unit of work the worker pool knows how to execute. The payload is the
/// JSON stored at enqueue time.
#[async_trait::async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, payload: serde_json::Value) -> anyhow::Result<()>;
}

/// Maps a job `kind` string to its handler. Built once at startup.
#[derive(Default)]
pub struct JobRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: impl Into<String>, handler: Arc<dyn JobHandler>) {
        self.handlers.insert(kind.into(), handler);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(kind).cloned()
    }
}

/// Producer half of the queue: inserts a `queued` row that survives restarts.
#[derive(Clone)]
pub struct JobQueue {
    db: Arc<DatabaseConnection>,
}

impl JobQueue {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Enqueue a job runnable immediately. Returns the job id.
    pub async fn enqueue(
        &self,
        kind: &str,
        payload: serde_json::Value,
        options: JobOptions,
    ) -> anyhow::Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let job = dispatch_jobs::ActiveModel {
            id: Set(id),
            kind: Set(kind.to_owned()),
            payload: Set(payload),
            status: Set(status::QUEUED.to_owned()),
            attempts: Set(0),
            max_attempts: Set(options.max_attempts),
            run_at: Set(now),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        dispatch_jobs::Entity::insert(job)
            .exec(self.db.as_ref())
            .await
            .context("enqueue job")?;
        tracing::info!(job = %id, kind, "job enqueued");
        Ok(id)
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt - 1)` plus up to 20%
/// random slack so retrying workers do not thunder in lockstep.
pub fn backoff_delay(base: Duration, attempt: i32) -> Duration {
    let exponent = attempt.saturating_sub(1).clamp(0, 16) as u32;
    let delay = base.saturating_mul(1 << exponent);
    let slack_ms = delay.as_millis() as u64 / 5;
    let jitter = if slack_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=slack_ms)
    };
    delay + Duration::from_millis(jitter)
}
