use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_quiz, delete_quiz, get_quiz, join_quiz, list_quizzes, update_quiz,
};

pub fn init_quizzes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/join/{code}", get(join_quiz))
        .route(
            "/{id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
}
