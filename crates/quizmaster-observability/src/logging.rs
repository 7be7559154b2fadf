use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::{default_env_filter, init_basic_console_logging};
use crate::is_observability_enabled;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs every request with a generated request id, the matched route,
/// status and latency. The id is echoed back in `x-request-id`.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(request_id = %request_id, method = %method, path = %path, "Incoming request");

    let mut response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Installs the global subscriber.
///
/// With observability enabled: console output, errors to
/// `{LOG_DIR}/quizmaster.log` and info-level JSON to
/// `{LOG_DIR}/quizmaster.json` (daily rotation), plus OTLP export when the
/// `otel` feature is compiled in. Otherwise console only.
pub fn init_tracing() {
    if !is_observability_enabled() {
        init_basic_console_logging();
        eprintln!("ℹ️  Observability disabled - console logging only");
        return;
    }

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string());
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        init_basic_console_logging();
        warn!(error = %e, log_dir = %log_dir, "Cannot create log directory, file logging disabled");
        return;
    }

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(default_env_filter());

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "quizmaster.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "quizmaster.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer);

    #[cfg(feature = "otel")]
    {
        match crate::otel::init_tracer() {
            Ok(tracer) => {
                registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .init();
                info!("Tracing initialized with OpenTelemetry and file logging");
            }
            Err(e) => {
                registry.init();
                warn!(error = %e, "Failed to initialize OpenTelemetry, file logging only");
            }
        }
    }

    #[cfg(not(feature = "otel"))]
    {
        registry.init();
        info!(log_dir = %log_dir, "Tracing initialized with file logging");
    }
}

pub async fn shutdown_tracer() {
    #[cfg(feature = "otel")]
    {
        info!("Shutting down OpenTelemetry tracer...");
        crate::otel::shutdown();
    }
}
