use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging. Call once, before anything logs.
///
/// `RUST_LOG` controls the filter; the default is `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
