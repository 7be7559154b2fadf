use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::questions::model::PublicQuestion;

/// Quiz quota of a free account.
pub const FREE_QUIZ_LIMIT: i64 = 1;
/// Quiz quota of a premium account.
pub const PREMIUM_QUIZ_LIMIT: i64 = 20;

pub fn quiz_limit(is_premium: bool) -> i64 {
    if is_premium {
        PREMIUM_QUIZ_LIMIT
    } else {
        FREE_QUIZ_LIMIT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[schema(example = "X9J2K")]
    pub access_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct QuizWithStats {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub access_code: String,
    pub question_count: i64,
    pub result_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuizDto {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    #[schema(example = "European capitals")]
    pub title: String,
}

/// A quiz as seen by a student who joined with its code. Answers are withheld.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinedQuiz {
    pub id: Uuid,
    pub title: String,
    pub access_code: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<PublicQuestion>,
}
