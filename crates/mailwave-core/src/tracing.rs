use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging to stdout. Call once at startup.
///
/// The filter comes from `RUST_LOG`; when unset everything logs at `info`,
/// which keeps dispatch/tracking request lines visible in production without
/// per-deployment configuration. Re-initialization is a silent no-op so test
/// binaries can call this from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .try_init();
}
