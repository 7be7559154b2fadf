use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quizmaster_core::AppError;
use quizmaster_observability::track_quiz_created;

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};
use crate::modules::questions::model::PublicQuestion;

use super::access_code::{generate_unique_code, is_well_formed, normalize_code};
use super::model::{JoinedQuiz, Quiz, QuizDto, QuizWithStats, quiz_limit};

/// Inserts lost to a concurrent quiz taking the same code.
const INSERT_ATTEMPTS: usize = 3;

pub struct QuizService;

impl QuizService {
    #[instrument(skip(db))]
    pub async fn list_for_owner(db: &PgPool, user_id: Uuid) -> Result<Vec<QuizWithStats>, AppError> {
        let quizzes = sqlx::query_as::<_, QuizWithStats>(
            r#"SELECT q.id, q.user_id, q.title, q.access_code, q.created_at,
                      (SELECT COUNT(*) FROM questions qu WHERE qu.quiz_id = q.id) AS question_count,
                      (SELECT COUNT(*) FROM results r WHERE r.quiz_id = q.id) AS result_count
               FROM quizzes q
               WHERE q.user_id = $1
               ORDER BY q.created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(quizzes)
    }

    /// The quiz if `user_id` owns it, 404 otherwise.
    #[instrument(skip(db))]
    pub async fn get_owned(db: &PgPool, quiz_id: Uuid, user_id: Uuid) -> Result<Quiz, AppError> {
        sqlx::query_as::<_, Quiz>(
            r#"SELECT id, user_id, title, access_code, created_at
               FROM quizzes WHERE id = $1 AND user_id = $2"#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))
    }

    pub async fn exists(db: &PgPool, quiz_id: Uuid) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM quizzes WHERE id = $1)")
                .bind(quiz_id)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    /// Creates a quiz within the owner's quota. The owner row is locked so
    /// that concurrent creations cannot both pass the quota check.
    #[instrument(skip(db, dto, client), fields(title = %dto.title))]
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        dto: QuizDto,
        client: &ClientInfo,
    ) -> Result<Quiz, AppError> {
        let mut tx = db.begin().await?;

        let is_premium = sqlx::query_scalar::<_, bool>(
            "SELECT is_premium FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let owned = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let limit = quiz_limit(is_premium);
        if owned >= limit {
            return Err(AppError::forbidden(format!(
                "Quiz limit reached ({} maximum)",
                limit
            )));
        }

        let mut created = None;
        for _ in 0..INSERT_ATTEMPTS {
            let code = generate_unique_code(&mut tx).await?;

            created = sqlx::query_as::<_, Quiz>(
                r#"INSERT INTO quizzes (user_id, title, access_code)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (access_code) DO NOTHING
                   RETURNING id, user_id, title, access_code, created_at"#,
            )
            .bind(user_id)
            .bind(&dto.title)
            .bind(&code)
            .fetch_optional(&mut *tx)
            .await?;

            if created.is_some() {
                break;
            }
            warn!(code = %code, "Access code taken concurrently, retrying");
        }

        let quiz = created.ok_or_else(|| {
            AppError::internal_error("Could not generate a unique access code")
        })?;

        tx.commit().await?;

        track_quiz_created();
        info!(quiz_id = %quiz.id, access_code = %quiz.access_code, "Quiz created");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuizCreated)
                .user(user_id)
                .target("quiz", quiz.id)
                .details(json!({ "title": quiz.title, "access_code": quiz.access_code }))
                .client(client),
        )
        .await;

        Ok(quiz)
    }

    #[instrument(skip(db, dto, client))]
    pub async fn update(
        db: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
        dto: QuizDto,
        client: &ClientInfo,
    ) -> Result<Quiz, AppError> {
        let previous = Self::get_owned(db, quiz_id, user_id).await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"UPDATE quizzes SET title = $1
               WHERE id = $2 AND user_id = $3
               RETURNING id, user_id, title, access_code, created_at"#,
        )
        .bind(&dto.title)
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))?;

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuizUpdated)
                .user(user_id)
                .target("quiz", quiz.id)
                .details(json!({ "title": { "from": previous.title, "to": quiz.title } }))
                .client(client),
        )
        .await;

        Ok(quiz)
    }

    /// Questions, results and answers go with the quiz.
    #[instrument(skip(db, client))]
    pub async fn delete(
        db: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let deleted = sqlx::query_as::<_, Quiz>(
            r#"DELETE FROM quizzes WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, access_code, created_at"#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))?;

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuizDeleted)
                .user(user_id)
                .target("quiz", deleted.id)
                .details(json!({ "title": deleted.title }))
                .client(client),
        )
        .await;

        Ok(())
    }

    /// Looks a quiz up by access code for a student. Correct answers are
    /// not part of the payload.
    #[instrument(skip(db))]
    pub async fn join(db: &PgPool, code: &str) -> Result<JoinedQuiz, AppError> {
        let code = normalize_code(code);
        let not_found = || AppError::not_found(anyhow!("No quiz found with this code"));

        if !is_well_formed(&code) {
            return Err(not_found());
        }

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, user_id, title, access_code, created_at
               FROM quizzes WHERE access_code = $1"#,
        )
        .bind(&code)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)?;

        let questions = sqlx::query_as::<_, PublicQuestion>(
            r#"SELECT id, type, question_text, options
               FROM questions WHERE quiz_id = $1
               ORDER BY created_at, id"#,
        )
        .bind(quiz.id)
        .fetch_all(db)
        .await?;

        Ok(JoinedQuiz {
            id: quiz.id,
            title: quiz.title,
            access_code: quiz.access_code,
            created_at: quiz.created_at,
            questions,
        })
    }
}
