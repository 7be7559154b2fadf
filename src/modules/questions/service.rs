use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use quizmaster_core::AppError;

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};
use crate::modules::quizzes::service::QuizService;

use super::model::{Question, QuestionContent, QuestionOwner};

const QUESTION_COLUMNS: &str = "id, quiz_id, type, question_text, options, correct_answer, created_at";

pub struct QuestionService;

impl QuestionService {
    /// Questions of any existing quiz, answers included, for client-side scoring.
    #[instrument(skip(db))]
    pub async fn for_play(db: &PgPool, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        if !QuizService::exists(db, quiz_id).await? {
            return Err(AppError::not_found(anyhow!("Quiz not found")));
        }
        Self::list(db, quiz_id).await
    }

    #[instrument(skip(db))]
    pub async fn for_owner(
        db: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Question>, AppError> {
        QuizService::get_owned(db, quiz_id, user_id).await?;
        Self::list(db, quiz_id).await
    }

    async fn list(db: &PgPool, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE quiz_id = $1 ORDER BY created_at, id",
            QUESTION_COLUMNS
        ))
        .bind(quiz_id)
        .fetch_all(db)
        .await?;

        Ok(questions)
    }

    /// 404 when the quiz is missing, 403 when it belongs to someone else.
    #[instrument(skip(db, content, client), fields(kind = %content.kind))]
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        quiz_id: Uuid,
        content: QuestionContent,
        client: &ClientInfo,
    ) -> Result<Question, AppError> {
        let owner_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))?;

        if owner_id != user_id {
            return Err(AppError::forbidden(
                "You are not allowed to modify this quiz",
            ));
        }

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"INSERT INTO questions (quiz_id, type, question_text, options, correct_answer)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            QUESTION_COLUMNS
        ))
        .bind(quiz_id)
        .bind(content.kind)
        .bind(&content.question_text)
        .bind(Json(&content.options))
        .bind(&content.correct_answer)
        .fetch_one(db)
        .await?;

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuestionCreated)
                .user(user_id)
                .target("question", question.id)
                .details(json!({ "quiz_id": quiz_id, "type": question.kind }))
                .client(client),
        )
        .await;

        Ok(question)
    }

    async fn owner_of(db: &PgPool, question_id: Uuid) -> Result<QuestionOwner, AppError> {
        sqlx::query_as::<_, QuestionOwner>(
            r#"SELECT q.quiz_id, qz.user_id AS owner_id
               FROM questions q
               JOIN quizzes qz ON qz.id = q.quiz_id
               WHERE q.id = $1"#,
        )
        .bind(question_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Question not found")))
    }

    async fn check_owner(
        db: &PgPool,
        question_id: Uuid,
        user_id: Uuid,
    ) -> Result<QuestionOwner, AppError> {
        let owner = Self::owner_of(db, question_id).await?;
        if owner.owner_id != user_id {
            return Err(AppError::forbidden(
                "You are not allowed to modify this question",
            ));
        }
        Ok(owner)
    }

    #[instrument(skip(db, content, client))]
    pub async fn update(
        db: &PgPool,
        question_id: Uuid,
        user_id: Uuid,
        content: QuestionContent,
        client: &ClientInfo,
    ) -> Result<Question, AppError> {
        let owner = Self::check_owner(db, question_id, user_id).await?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"UPDATE questions
               SET type = $1, question_text = $2, options = $3, correct_answer = $4
               WHERE id = $5
               RETURNING {}"#,
            QUESTION_COLUMNS
        ))
        .bind(content.kind)
        .bind(&content.question_text)
        .bind(Json(&content.options))
        .bind(&content.correct_answer)
        .bind(question_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Question not found")))?;

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuestionUpdated)
                .user(user_id)
                .target("question", question.id)
                .details(json!({ "quiz_id": owner.quiz_id }))
                .client(client),
        )
        .await;

        Ok(question)
    }

    #[instrument(skip(db, client))]
    pub async fn delete(
        db: &PgPool,
        question_id: Uuid,
        user_id: Uuid,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let owner = Self::check_owner(db, question_id, user_id).await?;

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(db)
            .await?;

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::QuestionDeleted)
                .user(user_id)
                .target("question", question_id)
                .details(json!({ "quiz_id": owner.quiz_id }))
                .client(client),
        )
        .await;

        Ok(())
    }
}
