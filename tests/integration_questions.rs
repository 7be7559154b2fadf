mod common;

use axum::http::StatusCode;
use common::{
    count_logs, create_eleve, create_prof, create_test_question, create_test_quiz, send,
    setup_test_app,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn qcm_body(quiz_id: Uuid) -> serde_json::Value {
    json!({
        "quiz_id": quiz_id,
        "type": "qcm",
        "question_text": "Which planet is known as the red planet?",
        "options": ["Mars", "Venus", "Jupiter", "Saturn"],
        "correct_answer": "Mars"
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_qcm_question(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST01").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(qcm_body(quiz_id)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "qcm");
    assert_eq!(body["data"]["quiz_id"], quiz_id.to_string());
    assert_eq!(body["data"]["options"], json!(["Mars", "Venus", "Jupiter", "Saturn"]));
    assert_eq!(body["data"]["correct_answer"], "Mars");
    assert_eq!(count_logs(&pool, "QUESTION_CREATED").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_true_false_question(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST02").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(json!({
            "quiz_id": quiz_id,
            "type": "vf",
            "question_text": "The Earth orbits the Sun.",
            "options": ["Vrai", "Faux"],
            "correct_answer": "Vrai"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "vf");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_qcm_requires_four_options(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST03").await;

    let mut body = qcm_body(quiz_id);
    body["options"] = json!(["Mars", "Venus", "Jupiter"]);

    let (status, body) = send(&app, "POST", "/api/questions", Some(&prof.token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "options");
    assert_eq!(
        body["error"]["message"],
        "A multiple-choice question must have exactly 4 options"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_true_false_requires_two_options(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST04").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(json!({
            "quiz_id": quiz_id,
            "type": "vf",
            "question_text": "The Earth orbits the Sun.",
            "options": ["Vrai", "Faux", "Peut-être"],
            "correct_answer": "Vrai"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "options");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_correct_answer_must_be_an_option(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST05").await;

    let mut body = qcm_body(quiz_id);
    body["correct_answer"] = json!("Pluto");

    let (status, body) = send(&app, "POST", "/api/questions", Some(&prof.token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "correct_answer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_overlong_option_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST10").await;
    let long_option = "a".repeat(300);

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(json!({
            "quiz_id": quiz_id,
            "type": "vf",
            "question_text": "Is this answer far too long to store?",
            "options": [long_option, "Faux"],
            "correct_answer": long_option
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "options");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_type_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST06").await;

    let mut body = qcm_body(quiz_id);
    body["type"] = json!("essay");

    let (status, body) = send(&app, "POST", "/api/questions", Some(&prof.token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Type must be \"qcm\" or \"vf\"");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_question_text_too_short(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "QST07").await;

    let mut body = qcm_body(quiz_id);
    body["question_text"] = json!("Short?");

    let (status, body) = send(&app, "POST", "/api/questions", Some(&prof.token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "question_text");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_on_missing_quiz(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(qcm_body(Uuid::new_v4())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_on_foreign_quiz_forbidden(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let other = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, other.id, "QST08").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions",
        Some(&prof.token),
        Some(qcm_body(quiz_id)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_play_includes_answers_for_any_user(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let eleve = create_eleve(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "PLAY1").await;
    create_test_question(&pool, quiz_id).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/questions/play/{}", quiz_id),
        Some(&eleve.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let questions = body["data"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["correct_answer"], "Paris");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_play_missing_quiz(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let eleve = create_eleve(&pool).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/questions/play/{}", Uuid::new_v4()),
        Some(&eleve.token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_quiz_questions_owner_only(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let other = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "OWN01").await;
    create_test_question(&pool, quiz_id).await;

    let uri = format!("/api/questions/quiz/{}", quiz_id);
    let (status, body) = send(&app, "GET", &uri, Some(&prof.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", &uri, Some(&other.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_question(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "UPQ01").await;
    let question_id = create_test_question(&pool, quiz_id).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/questions/{}", question_id),
        Some(&prof.token),
        Some(json!({
            "type": "vf",
            "question_text": "Paris is the capital of France.",
            "options": ["Vrai", "Faux"],
            "correct_answer": "Vrai"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "vf");
    assert_eq!(body["data"]["options"], json!(["Vrai", "Faux"]));
    assert_eq!(count_logs(&pool, "QUESTION_UPDATED").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_foreign_question_forbidden(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let other = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, other.id, "UPQ02").await;
    let question_id = create_test_question(&pool, quiz_id).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/questions/{}", question_id),
        Some(&prof.token),
        Some(json!({
            "type": "vf",
            "question_text": "Paris is the capital of France.",
            "options": ["Vrai", "Faux"],
            "correct_answer": "Vrai"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_question(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let prof = create_prof(&pool).await;
    let quiz_id = create_test_quiz(&pool, prof.id, "DLQ01").await;
    let question_id = create_test_question(&pool, quiz_id).await;
    let uri = format!("/api/questions/{}", question_id);

    let (status, _) = send(&app, "DELETE", &uri, Some(&prof.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(count_logs(&pool, "QUESTION_DELETED").await, 1);

    let (status, body) = send(&app, "DELETE", &uri, Some(&prof.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Question not found");
}
