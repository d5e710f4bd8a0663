use std::time::Duration;

/// Dispatch service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// PostgreSQL connection URL (tracking events + job queue).
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `DISPATCH_PORT`.
    pub dispatch_port: u16,
    /// Base URL of the campaign/content store (e.g. "http://content-store:4000").
    pub content_store_url: String,
    /// Base URL of the contact/segment directory.
    pub directory_url: String,
    /// Base URL of the mail transport.
    pub mail_transport_url: String,
    /// Token endpoint for service-account bearer tokens (queued dispatches).
    pub service_token_url: String,
    /// Public base URL for pixel/click links
    /// (e.g. "https://api.example.com/marketing-email/tracking").
    pub tracking_base_url: String,
    /// Recipients per concurrent send batch (default 10).
    pub send_batch_size: usize,
    /// Pause between consecutive batches (default 1000 ms).
    pub send_batch_pause: Duration,
    /// Max concurrently executing jobs in the worker pool (default 20).
    pub worker_concurrency: usize,
    /// Max job starts per second (default 10).
    pub worker_jobs_per_sec: u32,
    /// Default attempts per job before terminal failure (default 3).
    pub job_max_attempts: i32,
    /// Base of the exponential retry backoff (default 3 s).
    pub job_backoff_base: Duration,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            dispatch_port: parse_or("DISPATCH_PORT", 3120),
            content_store_url: std::env::var("CONTENT_STORE_URL").expect("CONTENT_STORE_URL"),
            directory_url: std::env::var("DIRECTORY_URL").expect("DIRECTORY_URL"),
            mail_transport_url: std::env::var("MAIL_TRANSPORT_URL").expect("MAIL_TRANSPORT_URL"),
            service_token_url: std::env::var("SERVICE_TOKEN_URL").expect("SERVICE_TOKEN_URL"),
            tracking_base_url: std::env::var("TRACKING_BASE_URL").expect("TRACKING_BASE_URL"),
            send_batch_size: parse_or("SEND_BATCH_SIZE", 10),
            send_batch_pause: Duration::from_millis(parse_or("SEND_BATCH_PAUSE_MS", 1000)),
            worker_concurrency: parse_or("WORKER_CONCURRENCY", 20),
            worker_jobs_per_sec: parse_or("WORKER_JOBS_PER_SEC", 10),
            job_max_attempts: parse_or("JOB_MAX_ATTEMPTS", 3),
            job_backoff_base: Duration::from_secs(parse_or("JOB_BACKOFF_BASE_SECS", 3)),
        }
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
