use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Longest accepted `user_answer`, matching the column width.
pub const MAX_ANSWER_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerDto {
    pub question_id: Uuid,
    pub user_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResultDto {
    pub quiz_id: Uuid,
    #[validate(range(min = 0, message = "Score must be a non-negative integer"))]
    #[schema(example = 7, minimum = 0)]
    pub score: i32,
    /// Per-question detail, optional
    #[serde(default)]
    pub answers: Vec<AnswerDto>,
}

/// A result in the student's history.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MyResult {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub played_at: DateTime<Utc>,
    pub quiz_title: String,
}

/// A result as listed to the quiz owner.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct QuizResultEntry {
    pub id: Uuid,
    pub score: i32,
    pub played_at: DateTime<Utc>,
    pub student_email: String,
}

/// `question_id` and the question columns are null once the question was deleted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AnswerDetail {
    pub id: Uuid,
    pub question_id: Option<Uuid>,
    pub question_text: Option<String>,
    pub user_answer: String,
    pub is_correct: bool,
    pub correct_answer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_score_rejected() {
        let dto: CreateResultDto = serde_json::from_value(serde_json::json!({
            "quiz_id": Uuid::new_v4(),
            "score": -1
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("score"));
    }

    #[test]
    fn test_answers_default_to_empty() {
        let dto: CreateResultDto = serde_json::from_value(serde_json::json!({
            "quiz_id": Uuid::new_v4(),
            "score": 0
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.answers.is_empty());
    }

    #[test]
    fn test_fractional_score_is_not_an_integer() {
        let parsed = serde_json::from_value::<CreateResultDto>(serde_json::json!({
            "quiz_id": Uuid::new_v4(),
            "score": 2.5
        }));
        assert!(parsed.is_err());
    }
}
