use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_checkout, payment_success, webhook};

pub fn init_payments_router() -> Router<AppState> {
    Router::new()
        .route("/create-checkout", post(create_checkout))
        .route("/webhook", post(webhook))
        .route("/success", get(payment_success))
}
