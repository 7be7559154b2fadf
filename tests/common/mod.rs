#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quizmaster::router::init_router;
use quizmaster::state::{AppState, build_http_client};
use quizmaster_auth::{UserRole, create_access_token};
use quizmaster_config::{CorsConfig, JwtConfig, RateLimitConfig, ServerConfig, StripeConfig};
use quizmaster_core::hash_password;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "Password123";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const FRONTEND_URL: &str = "http://localhost:5173";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub token: String,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "quizmaster-test-secret".to_string(),
        expires_in: 3600,
    }
}

/// Application state for tests: rate limiting off, Stripe pointed at
/// `stripe_api_base` when given.
pub fn test_state(pool: PgPool, stripe_api_base: Option<String>) -> AppState {
    let stripe_config = match stripe_api_base {
        Some(api_base) => StripeConfig {
            secret_key: "sk_test_quizmaster".to_string(),
            price_id: "price_test_premium".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            api_base,
            ..StripeConfig::default()
        },
        None => StripeConfig {
            webhook_secret: WEBHOOK_SECRET.to_string(),
            ..StripeConfig::default()
        },
    };

    AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec![FRONTEND_URL.to_string()],
        },
        stripe_config,
        rate_limit_config: RateLimitConfig::disabled(),
        server_config: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: FRONTEND_URL.to_string(),
        },
        http_client: build_http_client().unwrap(),
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool, None))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn token_for(id: Uuid, email: &str, role: UserRole) -> String {
    create_access_token(id, email, role, &test_jwt_config()).unwrap()
}

pub async fn create_test_user(pool: &PgPool, role: UserRole, is_premium: bool) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users (email, password, role, is_premium)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(is_premium)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        token: token_for(id, &email, role),
        email,
        password: TEST_PASSWORD.to_string(),
        role,
    }
}

pub async fn create_prof(pool: &PgPool) -> TestUser {
    create_test_user(pool, UserRole::Prof, false).await
}

pub async fn create_eleve(pool: &PgPool) -> TestUser {
    create_test_user(pool, UserRole::Eleve, false).await
}

pub async fn create_admin(pool: &PgPool) -> TestUser {
    create_test_user(pool, UserRole::Admin, true).await
}

pub async fn create_test_quiz(pool: &PgPool, owner_id: Uuid, access_code: &str) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO quizzes (user_id, title, access_code)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(owner_id)
    .bind("Capitals of Europe")
    .bind(access_code)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// A multiple-choice question whose answer is `"Paris"`.
pub async fn create_test_question(pool: &PgPool, quiz_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO questions (quiz_id, type, question_text, options, correct_answer)
           VALUES ($1, 'qcm', $2, $3, 'Paris')
           RETURNING id"#,
    )
    .bind(quiz_id)
    .bind("What is the capital of France?")
    .bind(serde_json::json!(["Paris", "Lyon", "Marseille", "Nice"]))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn count_logs(pool: &PgPool, action: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE action = $1")
        .bind(action)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Sends a request and returns the status with the JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
