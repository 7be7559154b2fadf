mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use common::{WEBHOOK_SECRET, create_eleve, create_prof, create_test_user, send, test_state};
use http_body_util::BodyExt;
use quizmaster::modules::payments::stripe::{SIGNATURE_HEADER, sign_payload};
use quizmaster::router::init_router;
use quizmaster_auth::UserRole;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Serves `POST /v1/checkout/sessions` on a random local port and returns
/// its base URL.
async fn spawn_stripe_mock() -> String {
    let app = Router::new().route(
        "/v1/checkout/sessions",
        post(|| async {
            let id = format!("cs_test_{}", Uuid::new_v4().simple());
            Json(json!({
                "id": id,
                "object": "checkout.session",
                "url": format!("https://checkout.stripe.test/pay/{}", id)
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", address)
}

async fn insert_pending_payment(pool: &PgPool, user_id: Uuid, session_id: &str) {
    sqlx::query(
        r#"INSERT INTO payments (user_id, stripe_session_id, amount_cents, status)
           VALUES ($1, $2, 999, 'pending')"#,
    )
    .bind(user_id)
    .bind(session_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn payment_status(pool: &PgPool, session_id: &str) -> String {
    sqlx::query_scalar("SELECT status::text FROM payments WHERE stripe_session_id = $1")
        .bind(session_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn is_premium(pool: &PgPool, user_id: Uuid) -> bool {
    sqlx::query_scalar("SELECT is_premium FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn session_event(kind: &str, session_id: &str, user_id: Uuid) -> Value {
    json!({
        "id": format!("evt_{}", Uuid::new_v4().simple()),
        "type": kind,
        "data": { "object": {
            "id": session_id,
            "object": "checkout.session",
            "payment_status": "paid",
            "metadata": { "user_id": user_id.to_string() }
        }}
    })
}

/// Posts a raw webhook body, signed with the test secret unless
/// `signature` is given.
async fn post_webhook(app: &Router, event: &Value, signature: Option<&str>) -> (StatusCode, Value) {
    let payload = serde_json::to_vec(event).unwrap();
    let header = match signature {
        Some(signature) => signature.to_string(),
        None => {
            let timestamp = Utc::now().timestamp();
            let v1 = sign_payload(&payload, WEBHOOK_SECRET, timestamp).unwrap();
            format!("t={},v1={}", timestamp, v1)
        }
    };

    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, header)
        .body(Body::from(payload))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_checkout_records_pending_payment(pool: PgPool) {
    let stripe = spawn_stripe_mock().await;
    let app = init_router(test_state(pool.clone(), Some(stripe)));
    let prof = create_prof(&pool).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&prof.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["checkout_url"].as_str().unwrap();
    assert!(url.starts_with("https://checkout.stripe.test/pay/cs_test_"));

    let (stored_status, amount): (String, i32) = sqlx::query_as(
        "SELECT status::text, amount_cents FROM payments WHERE user_id = $1",
    )
    .bind(prof.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored_status, "pending");
    assert_eq!(amount, 999);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_checkout_already_premium(pool: PgPool) {
    let stripe = spawn_stripe_mock().await;
    let app = init_router(test_state(pool.clone(), Some(stripe)));
    let prof = create_test_user(&pool, UserRole::Prof, true).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&prof.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "You are already premium");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_checkout_without_stripe_config(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&prof.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_checkout_students_forbidden(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let eleve = create_eleve(&pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/payments/create-checkout",
        Some(&eleve.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_rejects_bad_signature(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;
    insert_pending_payment(&pool, prof.id, "cs_test_bad").await;

    let event = session_event("checkout.session.completed", "cs_test_bad", prof.id);
    let header = format!("t={},v1={}", Utc::now().timestamp(), "ab".repeat(32));
    let (status, body) = post_webhook(&app, &event, Some(&header)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Webhook Error")
    );
    assert_eq!(payment_status(&pool, "cs_test_bad").await, "pending");
    assert!(!is_premium(&pool, prof.id).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_requires_signature_header(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));

    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_completed_upgrades_user(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;
    insert_pending_payment(&pool, prof.id, "cs_test_done").await;

    let event = session_event("checkout.session.completed", "cs_test_done", prof.id);
    let (status, body) = post_webhook(&app, &event, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));
    assert_eq!(payment_status(&pool, "cs_test_done").await, "completed");
    assert!(is_premium(&pool, prof.id).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_expired_marks_failed(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;
    insert_pending_payment(&pool, prof.id, "cs_test_expired").await;

    let event = session_event("checkout.session.expired", "cs_test_expired", prof.id);
    let (status, _) = post_webhook(&app, &event, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment_status(&pool, "cs_test_expired").await, "failed");
    assert!(!is_premium(&pool, prof.id).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_async_payment_failure_marks_failed(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;
    insert_pending_payment(&pool, prof.id, "cs_test_async_failed").await;

    let event = session_event(
        "checkout.session.async_payment_failed",
        "cs_test_async_failed",
        prof.id,
    );
    let (status, body) = post_webhook(&app, &event, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(payment_status(&pool, "cs_test_async_failed").await, "failed");
    assert!(!is_premium(&pool, prof.id).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_webhook_acknowledges_unhandled_events(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));

    let event = json!({
        "id": "evt_other",
        "type": "customer.created",
        "data": { "object": { "object": "customer", "email": "someone@example.com" } }
    });
    let (status, body) = post_webhook(&app, &event, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_success_requires_session_id(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;

    let (status, body) = send(&app, "GET", "/api/payments/success", Some(&prof.token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "session_id");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_success_unknown_session(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/payments/success?session_id=cs_test_missing",
        Some(&prof.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Payment not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_success_after_completion(pool: PgPool) {
    let app = init_router(test_state(pool.clone(), None));
    let prof = create_prof(&pool).await;
    insert_pending_payment(&pool, prof.id, "cs_test_paid").await;

    let event = session_event("checkout.session.completed", "cs_test_paid", prof.id);
    post_webhook(&app, &event, None).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/payments/success?session_id=cs_test_paid",
        Some(&prof.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["is_premium"], true);
}
