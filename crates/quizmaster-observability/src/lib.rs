//! QuizMaster observability.
//!
//! - Structured logging via `tracing` (console, daily-rolling plain and JSON files)
//! - HTTP request logging and Prometheus metrics middleware
//! - Business counters (registrations, logins, quizzes, payments)
//! - OpenTelemetry span export behind the `otel` feature
//!
//! At runtime the file logs and metrics can be switched off with
//! `OBSERVABILITY_ENABLED=false`, which leaves console logging only.
//!
//! ```no_run
//! use quizmaster_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
pub mod logging;
pub mod metrics;
#[cfg(feature = "otel")]
mod otel;

use std::sync::OnceLock;

pub use basic_logging::init_basic_console_logging;
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
pub use metrics::{
    init_metrics, metrics_middleware, track_jwt_issued, track_payment, track_quiz_created,
    track_quiz_played, track_user_login_failure, track_user_login_success, track_user_registered,
};
pub use metrics_exporter_prometheus::PrometheusHandle;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// `OBSERVABILITY_ENABLED` (default: enabled). Read once per process.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}
