mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_prof, test_state};
use http_body_util::BodyExt;
use quizmaster::router::init_router;
use quizmaster_config::RateLimitConfig;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

/// One request per bucket, refilled every minute.
fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        general_per_second: 60,
        general_burst_size: 2,
        auth_per_second: 60,
        auth_burst_size: 1,
    }
}

fn setup_rate_limited_app(pool: PgPool, config: RateLimitConfig) -> Router {
    let mut state = test_state(pool, None);
    state.rate_limit_config = config;
    init_router(state)
}

fn login_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "nobody@example.com", "password": "Password123" }).to_string(),
        ))
        .unwrap()
}

fn get_request(uri: &str, ip: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", ip)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_auth_rate_limit_exceeded(pool: PgPool) {
    let app = setup_rate_limited_app(pool, strict_rate_limit_config());

    let first = app.clone().oneshot(login_request("192.168.1.100")).await.unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = app.oneshot(login_request("192.168.1.100")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = json_body(second).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_different_ips_have_separate_limits(pool: PgPool) {
    let app = setup_rate_limited_app(pool, strict_rate_limit_config());

    let first = app.clone().oneshot(login_request("10.0.0.1")).await.unwrap();
    assert_ne!(first.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_ip = app.oneshot(login_request("10.0.0.2")).await.unwrap();
    assert_ne!(other_ip.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_general_rate_limit_on_quiz_routes(pool: PgPool) {
    let prof = create_prof(&pool).await;
    let app = setup_rate_limited_app(pool, strict_rate_limit_config());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_request("/api/quizzes", "172.16.0.1", &prof.token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = app
        .oneshot(get_request("/api/quizzes", "172.16.0.1", &prof.token))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_is_not_rate_limited(pool: PgPool) {
    let app = setup_rate_limited_app(pool, strict_rate_limit_config());

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-forwarded-for", "172.16.0.2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_disabled_rate_limiting(pool: PgPool) {
    let app = setup_rate_limited_app(
        pool,
        RateLimitConfig {
            enabled: false,
            ..strict_rate_limit_config()
        },
    );

    for _ in 0..3 {
        let response = app.clone().oneshot(login_request("192.0.2.1")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
