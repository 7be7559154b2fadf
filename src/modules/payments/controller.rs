use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use tracing::instrument;

use quizmaster_core::errors::ErrorResponse;
use quizmaster_core::{ApiResponse, AppError};

use crate::middleware::client::ClientInfo;
use crate::middleware::role::RequireProf;
use crate::state::AppState;
use crate::validator::Query;

use super::model::{CheckoutResponse, PaymentStatusResponse, SuccessQuery, WebhookAck};
use super::service::PaymentService;
use super::stripe::SIGNATURE_HEADER;

/// Start the premium upgrade with a Stripe Checkout Session
#[utoipa::path(
    post,
    path = "/api/payments/create-checkout",
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 409, description = "Already premium", body = ErrorResponse),
        (status = 502, description = "Stripe unavailable", body = ErrorResponse)
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client), fields(user_id = %auth_user.0.sub))]
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let response = PaymentService::create_checkout(&state, auth_user.user_id()?, &client).await?;
    Ok(ApiResponse::ok(response))
}

/// Stripe webhook endpoint. Authenticated by the `Stripe-Signature` header.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body(content = String, description = "Raw Stripe event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload", body = ErrorResponse)
    ),
    tag = "Payments"
)]
#[instrument(skip(state, client, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    client: ClientInfo,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    PaymentService::handle_webhook(&state, &body, signature, &client).await?;

    Ok(Json(WebhookAck { received: true }))
}

/// Status of a checkout session after the redirect back from Stripe
#[utoipa::path(
    get,
    path = "/api/payments/success",
    params(SuccessQuery),
    responses(
        (status = 200, description = "Payment status", body = ApiResponse<PaymentStatusResponse>),
        (status = 400, description = "Missing session_id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn payment_success(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<ApiResponse<PaymentStatusResponse>>, AppError> {
    let response = PaymentService::verify_success(
        &state.db,
        auth_user.user_id()?,
        query.session_id.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(response))
}
