use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_question, delete_question, play_questions, quiz_questions, update_question,
};

pub fn init_questions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_question))
        .route("/play/{quiz_id}", get(play_questions))
        .route("/quiz/{quiz_id}", get(quiz_questions))
        .route("/{id}", put(update_question).delete(delete_question))
}
