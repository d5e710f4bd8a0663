use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tokio::sync::watch;
use tracing::info;

use mailwave_core::drain::TaskDrain;
use mailwave_core::tracing::init_tracing;

use mailwave_dispatch::config::DispatchConfig;
use mailwave_dispatch::domain::types::SendSettings;
use mailwave_dispatch::infra::{
    DbTrackingStore, HttpCampaignStore, HttpDirectory, HttpMailTransport, HttpTokenIssuer,
};
use mailwave_dispatch::jobs::{DISPATCH_JOB_KIND, DispatchJobHandler, QueuedDispatcher};
use mailwave_dispatch::queue::{JobOptions, JobQueue, JobRegistry, WorkerPool};
use mailwave_dispatch::router::build_router;
use mailwave_dispatch::state::AppState;
use mailwave_dispatch::usecase::dispatch::{DispatchCampaignUseCase, DispatchGuard};

/// How long shutdown waits for detached tracking writes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    init_tracing();

    let config = DispatchConfig::from_env();

    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("failed to connect to database"),
    );

    // One pooled client shared by every outbound collaborator.
    let client = reqwest::Client::new();
    let campaigns = HttpCampaignStore::new(client.clone(), &config.content_store_url);
    let directory = HttpDirectory::new(client.clone(), &config.directory_url);
    let transport = HttpMailTransport::new(client.clone(), &config.mail_transport_url);
    let token_issuer = HttpTokenIssuer::new(client, &config.service_token_url);
    let tracking = DbTrackingStore::new(Arc::clone(&db));

    let scheduler = QueuedDispatcher {
        queue: JobQueue::new(Arc::clone(&db)),
        options: JobOptions {
            max_attempts: config.job_max_attempts,
        },
    };
    let guard = DispatchGuard::default();
    let drain = TaskDrain::new();
    let settings = SendSettings {
        batch_size: config.send_batch_size,
        batch_pause: config.send_batch_pause,
        tracking_base_url: config.tracking_base_url.clone(),
    };

    let mut registry = JobRegistry::new();
    registry.register(
        DISPATCH_JOB_KIND,
        Arc::new(DispatchJobHandler {
            usecase: DispatchCampaignUseCase {
                store: campaigns.clone(),
                directory: directory.clone(),
                transport: transport.clone(),
                tracking: tracking.clone(),
                guard: guard.clone(),
                settings: settings.clone(),
            },
            token_issuer,
        }),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = WorkerPool::new(
        db,
        Arc::new(registry),
        config.worker_concurrency,
        u64::from(config.worker_jobs_per_sec),
        config.job_backoff_base,
        shutdown_rx,
    );
    let worker_handle = tokio::spawn(worker.run());

    let state = AppState {
        campaigns,
        directory,
        transport,
        tracking,
        scheduler,
        guard,
        drain: drain.clone(),
        settings,
    };
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.dispatch_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("dispatch service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server error");

    info!("shutting down");
    let _ = shutdown_tx.send(true);
    drain.drain(DRAIN_TIMEOUT).await;
    let _ = worker_handle.await;
}
