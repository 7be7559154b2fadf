use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: `LOG_LEVEL` (default "info") with noisy dependencies held at warn.
pub(crate) fn default_env_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},tower_http=warn,hyper=warn,tonic=warn,h2=warn,sqlx=warn",
            log_level
        ))
    })
}

/// Console-only logging, used by the CLI and when observability is disabled.
///
/// Compact format with file and line numbers; ANSI colors are auto-detected
/// by the formatter.
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(default_env_filter());

    // A subscriber may already be installed (tests, repeated CLI calls).
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
