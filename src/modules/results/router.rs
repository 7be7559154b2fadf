use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_result, my_results, quiz_results, result_answers};

pub fn init_results_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_result))
        .route("/me", get(my_results))
        .route("/quiz/{quiz_id}", get(quiz_results))
        .route("/{result_id}/answers", get(result_answers))
}
