use anyhow::anyhow;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quizmaster_core::AppError;
use quizmaster_observability::track_payment;

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};
use crate::state::AppState;

use super::model::{CheckoutResponse, PaymentStatus, PaymentStatusResponse};
use super::stripe::{CheckoutSessionObject, StripeClient, WebhookEvent, verify_signature};

pub const EVENT_COMPLETED: &str = "checkout.session.completed";
pub const EVENT_EXPIRED: &str = "checkout.session.expired";
pub const EVENT_ASYNC_FAILED: &str = "checkout.session.async_payment_failed";

#[derive(Debug, sqlx::FromRow)]
struct SettledPayment {
    id: Uuid,
    user_id: Uuid,
}

pub struct PaymentService;

impl PaymentService {
    /// Opens a Stripe Checkout Session for the premium upgrade and records
    /// it as a pending payment.
    #[instrument(skip(state, client))]
    pub async fn create_checkout(
        state: &AppState,
        user_id: Uuid,
        client: &ClientInfo,
    ) -> Result<CheckoutResponse, AppError> {
        let db = &state.db;
        let stripe_config = &state.stripe_config;

        let is_premium =
            sqlx::query_scalar::<_, bool>("SELECT is_premium FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if is_premium {
            return Err(AppError::conflict(anyhow!("You are already premium")));
        }

        if !stripe_config.is_configured() {
            return Err(AppError::internal_error("Stripe is not configured"));
        }

        let frontend_url = state.server_config.frontend_url.trim_end_matches('/');
        let success_url = format!(
            "{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}",
            frontend_url
        );
        let cancel_url = format!("{}/payment", frontend_url);

        let session = StripeClient::new(&state.http_client, stripe_config)
            .create_checkout_session(user_id, &success_url, &cancel_url)
            .await
            .map_err(|e| AppError::new(StatusCode::BAD_GATEWAY, e))?;

        let checkout_url = session
            .url
            .ok_or_else(|| AppError::new(StatusCode::BAD_GATEWAY, anyhow!("Missing checkout url")))?;

        let payment_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO payments (user_id, stripe_session_id, amount_cents, status)
               VALUES ($1, $2, $3, 'pending')
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(&session.id)
        .bind(stripe_config.premium_price_cents)
        .fetch_one(db)
        .await?;

        track_payment("initiated");
        info!(session_id = %session.id, "Checkout session created");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::PaymentInitiated)
                .user(user_id)
                .target("payment", payment_id)
                .details(json!({
                    "stripe_session_id": session.id,
                    "amount_cents": stripe_config.premium_price_cents
                }))
                .client(client),
        )
        .await;

        Ok(CheckoutResponse { checkout_url })
    }

    /// Verifies and applies a Stripe webhook delivery.
    ///
    /// Unknown event types are acknowledged without effect. Database errors
    /// are returned so that Stripe retries the delivery.
    #[instrument(skip(state, payload, signature, client))]
    pub async fn handle_webhook(
        state: &AppState,
        payload: &[u8],
        signature: Option<&str>,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let stripe_config = &state.stripe_config;

        verify_signature(
            payload,
            signature,
            &stripe_config.webhook_secret,
            stripe_config.webhook_tolerance_secs,
            Utc::now().timestamp(),
        )
        .map_err(|e| {
            warn!(error = %e, "Rejected webhook delivery");
            AppError::bad_request(anyhow!("Webhook Error: {}", e))
        })?;

        let event: WebhookEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                // Non-session events carry other object shapes
                let kind = serde_json::from_slice::<serde_json::Value>(payload)
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
                return match kind {
                    Some(kind) if !is_handled(&kind) => {
                        info!(event_type = %kind, "Ignoring webhook event");
                        Ok(())
                    }
                    _ => Err(AppError::bad_request(anyhow!("Invalid webhook payload: {}", e))),
                };
            }
        };

        info!(event_id = %event.id, event_type = %event.kind, "Webhook received");

        match event.kind.as_str() {
            EVENT_COMPLETED => Self::complete(&state.db, &event.data.object, client).await,
            EVENT_EXPIRED | EVENT_ASYNC_FAILED => {
                Self::fail(&state.db, &event.data.object, &event.kind, client).await
            }
            _ => Ok(()),
        }
    }

    async fn complete(
        db: &PgPool,
        session: &CheckoutSessionObject,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let settled = sqlx::query_as::<_, SettledPayment>(
            r#"UPDATE payments SET status = 'completed', updated_at = NOW()
               WHERE stripe_session_id = $1
               RETURNING id, user_id"#,
        )
        .bind(&session.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = session
            .metadata_user_id()
            .or_else(|| settled.as_ref().map(|p| p.user_id))
        else {
            warn!(session_id = %session.id, "Completed session matches no user");
            return Ok(());
        };

        sqlx::query("UPDATE users SET is_premium = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        track_payment("completed");
        info!(user_id = %user_id, "User upgraded to premium");

        let mut entry = LogEntry::new(LogAction::PaymentCompleted)
            .user(user_id)
            .details(json!({
                "stripe_session_id": session.id,
                "payment_status": session.payment_status
            }))
            .client(client);
        if let Some(payment) = &settled {
            entry = entry.target("payment", payment.id);
        }
        ActivityLogService::record(db, entry).await;

        Ok(())
    }

    async fn fail(
        db: &PgPool,
        session: &CheckoutSessionObject,
        event_type: &str,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let settled = sqlx::query_as::<_, SettledPayment>(
            r#"UPDATE payments SET status = 'failed', updated_at = NOW()
               WHERE stripe_session_id = $1 AND status = 'pending'
               RETURNING id, user_id"#,
        )
        .bind(&session.id)
        .fetch_optional(db)
        .await?;

        let Some(payment) = settled else {
            return Ok(());
        };

        track_payment("failed");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::PaymentFailed)
                .user(payment.user_id)
                .target("payment", payment.id)
                .details(json!({ "stripe_session_id": session.id, "event": event_type }))
                .client(client),
        )
        .await;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn verify_success(
        db: &PgPool,
        user_id: Uuid,
        session_id: Option<&str>,
    ) -> Result<PaymentStatusResponse, AppError> {
        let session_id =
            session_id.ok_or_else(|| AppError::validation("session_id", "Session ID is missing"))?;

        let status = sqlx::query_scalar::<_, PaymentStatus>(
            "SELECT status FROM payments WHERE stripe_session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Payment not found")))?;

        let is_premium =
            sqlx::query_scalar::<_, bool>("SELECT is_premium FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .unwrap_or(false);

        Ok(PaymentStatusResponse { status, is_premium })
    }
}

fn is_handled(event_type: &str) -> bool {
    matches!(event_type, EVENT_COMPLETED | EVENT_EXPIRED | EVENT_ASYNC_FAILED)
}
