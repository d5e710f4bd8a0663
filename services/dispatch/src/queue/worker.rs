use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tokio::sync::{Semaphore, watch};

use mailwave_dispatch_schema::dispatch_jobs;

use crate::queue::job::{JobRegistry, backoff_delay, status};

/// Pulls runnable jobs off the queue and executes them on the runtime.
///
/// Job starts are paced by a fixed-interval ticker and bounded by a
/// semaphore, so at most `concurrency` jobs run at once and no more than
/// `jobs_per_sec` start in any second. Claiming is an optimistic conditional
/// update keyed on the `queued` status, safe across concurrent workers.
pub struct WorkerPool {
    db: Arc<DatabaseConnection>,
    registry: Arc<JobRegistry>,
    concurrency: usize,
    jobs_per_sec: u64,
    backoff_base: Duration,
    shutdown: watch::Receiver<bool>,
}

impl WorkerPool {
    pub fn new(
        db: Arc<DatabaseConnection>,
        registry: Arc<JobRegistry>,
        concurrency: usize,
        jobs_per_sec: u64,
        backoff_base: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            registry,
            concurrency,
            jobs_per_sec,
            backoff_base,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let tick = Duration::from_millis(1000 / self.jobs_per_sec.max(1));
        let mut interval = tokio::time::interval(tick);
        tracing::info!(
            concurrency = self.concurrency,
            jobs_per_sec = self.jobs_per_sec,
            "worker pool started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                        continue;
                    };
                    match self.claim_next().await {
                        Ok(Some(job)) => {
                            let db = Arc::clone(&self.db);
                            let registry = Arc::clone(&self.registry);
                            let backoff_base = self.backoff_base;
                            tokio::spawn(async move {
                                execute(db, registry, job, backoff_base).await;
                                drop(permit);
                            });
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "failed to claim job");
                        }
                    }
                }
            }
        }

        // Wait for in-flight jobs before returning so graceful shutdown does
        // not abandon active claims.
        let _ = semaphore.acquire_many(self.concurrency.max(1) as u32).await;
        tracing::info!("worker pool stopped");
    }

    /// Claim the oldest runnable job. The conditional update only wins when
    /// the row is still `queued`, so a job observed by two workers is started
    /// by exactly one.
    async fn claim_next(&self) -> anyhow::Result<Option<dispatch_jobs::Model>> {
        let now = Utc::now();
        let candidate = dispatch_jobs::Entity::find()
            .filter(dispatch_jobs::Column::Status.eq(status::QUEUED))
            .filter(dispatch_jobs::Column::RunAt.lte(now))
            .order_by_asc(dispatch_jobs::Column::RunAt)
            .limit(1)
            .one(self.db.as_ref())
            .await
            .context("find runnable job")?;
        let Some(mut job) = candidate else {
            return Ok(None);
        };

        let claimed = dispatch_jobs::Entity::update_many()
            .filter(dispatch_jobs::Column::Id.eq(job.id))
            .filter(dispatch_jobs::Column::Status.eq(status::QUEUED))
            .col_expr(dispatch_jobs::Column::Status, Expr::value(status::ACTIVE))
            .col_expr(
                dispatch_jobs::Column::Attempts,
                Expr::col(dispatch_jobs::Column::Attempts).add(1),
            )
            .col_expr(dispatch_jobs::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .context("claim job")?;
        if claimed.rows_affected == 0 {
            // Another worker won the race.
            return Ok(None);
        }
        job.attempts += 1;
        Ok(Some(job))
    }
}

async fn execute(
    db: Arc<DatabaseConnection>,
    registry: Arc<JobRegistry>,
    job: dispatch_jobs::Model,
    backoff_base: Duration,
) {
    let Some(handler) = registry.get(&job.kind) else {
        tracing::error!(job = %job.id, kind = %job.kind, "no handler registered for job kind");
        finish(&db, &job, status::FAILED, Some("no handler registered".to_owned())).await;
        return;
    };

    match handler.run(job.payload.clone()).await {
        Ok(()) => {
            tracing::info!(job = %job.id, kind = %job.kind, attempt = job.attempts, "job completed");
            finish(&db, &job, status::COMPLETED, None).await;
        }
        Err(e) => {
            let message = format!("{e:#}");
            match retry_verdict(job.attempts, job.max_attempts, backoff_base) {
                RetryVerdict::Exhausted => {
                    tracing::error!(
                        job = %job.id,
                        kind = %job.kind,
                        attempt = job.attempts,
                        error = %message,
                        "job failed permanently, operator attention required"
                    );
                    finish(&db, &job, status::FAILED, Some(message)).await;
                }
                RetryVerdict::Retry(delay) => {
                    tracing::warn!(
                        job = %job.id,
                        kind = %job.kind,
                        attempt = job.attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %message,
                        "job failed, retrying"
                    );
                    requeue(&db, &job, delay, message).await;
                }
            }
        }
    }
}

#[derive(Debug)]
enum RetryVerdict {
    Retry(Duration),
    Exhausted,
}

/// Decide what a failed attempt becomes: a requeue with backoff, or the
/// terminal `failed` state once attempts are used up.
fn retry_verdict(attempts: i32, max_attempts: i32, base: Duration) -> RetryVerdict {
    if attempts >= max_attempts {
        RetryVerdict::Exhausted
    } else {
        RetryVerdict::Retry(backoff_delay(base, attempts))
    }
}

async fn finish(
    db: &DatabaseConnection,
    job: &dispatch_jobs::Model,
    status: &str,
    last_error: Option<String>,
) {
    let update = dispatch_jobs::ActiveModel {
        id: Set(job.id),
        status: Set(status.to_owned()),
        last_error: Set(last_error),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Err(e) = dispatch_jobs::Entity::update(update).exec(db).await {
        tracing::error!(job = %job.id, error = %e, "failed to finalize job");
    }
}

async fn requeue(
    db: &DatabaseConnection,
    job: &dispatch_jobs::Model,
    delay: Duration,
    last_error: String,
) {
    let now = Utc::now();
    let run_at = now + chrono::Duration::milliseconds(delay.as_millis() as i64);
    let update = dispatch_jobs::ActiveModel {
        id: Set(job.id),
        status: Set(status::QUEUED.to_owned()),
        run_at: Set(run_at),
        last_error: Set(Some(last_error)),
        updated_at: Set(now),
        ..Default::default()
    };
    if let Err(e) = dispatch_jobs::Entity::update(update).exec(db).await {
        tracing::error!(job = %job.id, error = %e, "failed to requeue job");
    }
}
