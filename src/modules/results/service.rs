use std::collections::HashSet;

use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use quizmaster_core::AppError;
use quizmaster_observability::track_quiz_played;

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};
use crate::modules::quizzes::service::QuizService;

use super::model::{
    AnswerDetail, AnswerDto, CreateResultDto, MAX_ANSWER_LEN, MyResult, QuizResult,
    QuizResultEntry,
};

pub struct ResultService;

impl ResultService {
    /// Records a played quiz. The result and its answers are written in one
    /// transaction.
    #[instrument(skip(db, dto, client), fields(quiz_id = %dto.quiz_id, score = dto.score))]
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        dto: CreateResultDto,
        client: &ClientInfo,
    ) -> Result<QuizResult, AppError> {
        if dto.score < 0 {
            return Err(AppError::validation(
                "score",
                "Score must be a non-negative integer",
            ));
        }
        validate_answers(&dto.answers)?;

        if !QuizService::exists(db, dto.quiz_id).await? {
            return Err(AppError::not_found(anyhow!("Quiz not found")));
        }

        let mut tx = db.begin().await?;

        if !dto.answers.is_empty() {
            let question_ids: Vec<Uuid> = dto
                .answers
                .iter()
                .map(|a| a.question_id)
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();

            let matching = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM questions WHERE quiz_id = $1 AND id = ANY($2)",
            )
            .bind(dto.quiz_id)
            .bind(&question_ids)
            .fetch_one(&mut *tx)
            .await?;

            if matching != question_ids.len() as i64 {
                return Err(AppError::validation(
                    "answers",
                    "Every answer must reference a question of this quiz",
                ));
            }
        }

        let result = sqlx::query_as::<_, QuizResult>(
            r#"INSERT INTO results (user_id, quiz_id, score)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, quiz_id, score, played_at"#,
        )
        .bind(user_id)
        .bind(dto.quiz_id)
        .bind(dto.score)
        .fetch_one(&mut *tx)
        .await?;

        if !dto.answers.is_empty() {
            let (question_ids, (user_answers, correctness)): (Vec<Uuid>, (Vec<String>, Vec<bool>)) =
                dto.answers
                    .into_iter()
                    .map(|a| (a.question_id, (a.user_answer, a.is_correct)))
                    .unzip();

            sqlx::query(
                r#"INSERT INTO answers (result_id, question_id, user_answer, is_correct)
                   SELECT $1, * FROM UNNEST($2::uuid[], $3::text[], $4::bool[])"#,
            )
            .bind(result.id)
            .bind(&question_ids)
            .bind(&user_answers)
            .bind(&correctness)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        track_quiz_played(result.score);
        info!(result_id = %result.id, "Result recorded");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuizPlayed)
                .user(user_id)
                .target("quiz", result.quiz_id)
                .details(json!({ "result_id": result.id, "score": result.score }))
                .client(client),
        )
        .await;

        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn for_student(db: &PgPool, user_id: Uuid) -> Result<Vec<MyResult>, AppError> {
        let results = sqlx::query_as::<_, MyResult>(
            r#"SELECT r.id, r.quiz_id, r.score, r.played_at, q.title AS quiz_title
               FROM results r
               JOIN quizzes q ON q.id = r.quiz_id
               WHERE r.user_id = $1
               ORDER BY r.played_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(results)
    }

    #[instrument(skip(db))]
    pub async fn for_quiz(
        db: &PgPool,
        quiz_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<QuizResultEntry>, AppError> {
        QuizService::get_owned(db, quiz_id, owner_id).await?;

        let results = sqlx::query_as::<_, QuizResultEntry>(
            r#"SELECT r.id, r.score, r.played_at, u.email AS student_email
               FROM results r
               JOIN users u ON u.id = r.user_id
               WHERE r.quiz_id = $1
               ORDER BY r.played_at DESC"#,
        )
        .bind(quiz_id)
        .fetch_all(db)
        .await?;

        Ok(results)
    }

    /// Answers of a result whose quiz `owner_id` owns; 404 otherwise.
    #[instrument(skip(db))]
    pub async fn answers(
        db: &PgPool,
        result_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<AnswerDetail>, AppError> {
        let owned = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM results r
                   JOIN quizzes q ON q.id = r.quiz_id
                   WHERE r.id = $1 AND q.user_id = $2
               )"#,
        )
        .bind(result_id)
        .bind(owner_id)
        .fetch_one(db)
        .await?;

        if !owned {
            return Err(AppError::not_found(anyhow!("Result not found")));
        }

        let answers = sqlx::query_as::<_, AnswerDetail>(
            r#"SELECT a.id, a.question_id, q.question_text, a.user_answer, a.is_correct,
                      q.correct_answer
               FROM answers a
               LEFT JOIN questions q ON q.id = a.question_id
               WHERE a.result_id = $1
               ORDER BY q.created_at NULLS LAST, a.id"#,
        )
        .bind(result_id)
        .fetch_all(db)
        .await?;

        Ok(answers)
    }
}

fn validate_answers(answers: &[AnswerDto]) -> Result<(), AppError> {
    if answers
        .iter()
        .any(|a| a.user_answer.chars().count() > MAX_ANSWER_LEN)
    {
        return Err(AppError::validation(
            "answers",
            format!("Answers must not exceed {} characters", MAX_ANSWER_LEN),
        ));
    }
    Ok(())
}
