//! Stripe Checkout configuration.
//!
//! # Environment Variables
//!
//! - `STRIPE_SECRET_KEY`: API key used as bearer token
//! - `STRIPE_PRICE_ID`: price of the premium upgrade line item
//! - `STRIPE_WEBHOOK_SECRET`: signing secret of the webhook endpoint
//! - `STRIPE_API_BASE`: API root (default: `https://api.stripe.com`)
//! - `PREMIUM_PRICE_CENTS`: amount recorded for pending payments (default: 999)
//! - `STRIPE_WEBHOOK_TOLERANCE_SECS`: accepted signature age (default: 300)

use std::env;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub price_id: String,
    pub webhook_secret: String,
    pub api_base: String,
    pub premium_price_cents: i32,
    pub webhook_tolerance_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            price_id: String::new(),
            webhook_secret: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            premium_price_cents: 999,
            webhook_tolerance_secs: 300,
        }
    }
}

impl StripeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            price_id: env::var("STRIPE_PRICE_ID").unwrap_or_default(),
            webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            api_base: env::var("STRIPE_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            premium_price_cents: env_or("PREMIUM_PRICE_CENTS", defaults.premium_price_cents),
            webhook_tolerance_secs: env_or(
                "STRIPE_WEBHOOK_TOLERANCE_SECS",
                defaults.webhook_tolerance_secs,
            ),
        }
    }

    /// Whether a secret key is configured at all.
    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty()
    }
}
