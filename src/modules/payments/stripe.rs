//! Minimal Stripe client: Checkout Session creation over the REST API and
//! webhook signature verification.
//!
//! Webhook requests carry `Stripe-Signature: t=<unix ts>,v1=<hex>` where the
//! `v1` value is `HMAC-SHA256(secret, "<ts>.<raw body>")`. Several `v1`
//! entries may be present while a secret is being rolled.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{error, instrument};
use uuid::Uuid;

use quizmaster_config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("malformed Stripe-Signature header")]
    Malformed,
    #[error("timestamp outside the tolerance window")]
    Expired,
    #[error("no signature matches the payload")]
    Mismatch,
    #[error("webhook secret is not configured")]
    NoSecret,
}

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("request to Stripe failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Stripe answered {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Stripe session has no checkout url")]
    MissingUrl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: CheckoutSessionObject,
}

/// The fields read from a `checkout.session.*` event object.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub payment_status: Option<String>,
}

impl CheckoutSessionObject {
    pub fn metadata_user_id(&self) -> Option<Uuid> {
        self.metadata
            .get("user_id")
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

pub struct StripeClient<'a> {
    http: &'a reqwest::Client,
    config: &'a StripeConfig,
}

impl<'a> StripeClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a StripeConfig) -> Self {
        Self { http, config }
    }

    /// Creates a one-item `payment` mode session for the premium upgrade.
    #[instrument(skip(self))]
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let user_id = user_id.to_string();
        let params = [
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", self.config.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("client_reference_id", user_id.as_str()),
            ("metadata[user_id]", user_id.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            error!(status = status.as_u16(), message = %message, "Stripe rejected checkout session");
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session = response.json::<CheckoutSession>().await?;
        if session.url.is_none() {
            return Err(StripeError::MissingUrl);
        }
        Ok(session)
    }
}

/// Hex `v1` signature of `payload` signed at `timestamp`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Option<String> {
    let mac = mac_for(payload, secret, timestamp)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn mac_for(payload: &[u8], secret: &str, timestamp: i64) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(mac)
}

/// Checks a `Stripe-Signature` header against the raw request body.
///
/// Signatures older than `tolerance_secs` relative to `now` are rejected.
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::NoSecret);
    }
    let header = header.ok_or(SignatureError::MissingHeader)?;

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?)
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if now - timestamp > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let mac = mac_for(payload, secret, timestamp).ok_or(SignatureError::NoSecret)?;
    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
