use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use quizmaster_config::{IpGovernorConfig, RateLimitConfig};
use quizmaster_core::AppError;
use quizmaster_core::errors::codes;
use quizmaster_observability::{logging_middleware, metrics_middleware};

use crate::docs::ApiDoc;
use crate::modules::admin::init_admin_router;
use crate::modules::auth::init_auth_router;
use crate::modules::health::init_health_router;
use crate::modules::payments::init_payments_router;
use crate::modules::questions::init_questions_router;
use crate::modules::quizzes::init_quizzes_router;
use crate::modules::results::init_results_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/auth",
                    rate_limited(
                        init_auth_router(),
                        &state.rate_limit_config,
                        RateLimitConfig::auth_governor_config,
                    ),
                )
                .merge(rate_limited(
                    Router::new()
                        .nest("/quizzes", init_quizzes_router())
                        .nest("/questions", init_questions_router())
                        .nest("/results", init_results_router())
                        .nest("/admin", init_admin_router(state.clone())),
                    &state.rate_limit_config,
                    RateLimitConfig::general_governor_config,
                ))
                .nest("/payments", init_payments_router())
                .nest("/health", init_health_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        })
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

/// Wraps `router` in a per-IP governor built by `build` when rate limiting
/// is enabled.
fn rate_limited(
    router: Router<AppState>,
    config: &RateLimitConfig,
    build: fn(&RateLimitConfig) -> Option<IpGovernorConfig>,
) -> Router<AppState> {
    if !config.enabled {
        return router;
    }

    match build(config) {
        Some(governor) => router
            .layer(GovernorLayer::new(Arc::new(governor)))
            .layer(middleware::map_response(rate_limited_envelope)),
        None => {
            tracing::warn!("Invalid rate limit settings, routes are not rate limited");
            router
        }
    }
}

/// Rewrites the governor's plain-text 429 into the JSON error envelope.
async fn rate_limited_envelope(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let retry_after = response.headers().get(header::RETRY_AFTER).cloned();
    let mut rewritten = AppError::new(
        StatusCode::TOO_MANY_REQUESTS,
        anyhow::anyhow!("Too many requests, please try again later"),
    )
    .with_code(codes::RATE_LIMITED)
    .into_response();

    if let Some(value) = retry_after {
        rewritten.headers_mut().insert(header::RETRY_AFTER, value);
    }
    rewritten
}
