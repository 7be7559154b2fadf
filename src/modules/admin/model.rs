use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use quizmaster_auth::UserRole;
use quizmaster_core::serde::{
    deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string,
};
use quizmaster_core::{PaginationMeta, PaginationParams};

use crate::modules::activity_logs::model::{ActivityLog, LogStats};
use crate::modules::auth::User;
use crate::modules::payments::Payment;
use crate::modules::quizzes::model::QuizWithStats;
use crate::modules::results::model::MyResult;
use crate::validator::{validate_password_strength, validation_error};

pub const DEFAULT_USER_LIMIT: i64 = 20;
pub const RECENT_LOG_LIMIT: i64 = 10;
pub const USER_DETAIL_LIMIT: i64 = 20;

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct UserStats {
    pub total: i64,
    pub profs: i64,
    pub eleves: i64,
    pub admins: i64,
    pub premium: i64,
    pub inactive: i64,
    pub new_this_week: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct QuizStats {
    pub total: i64,
    pub new_this_week: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct QuestionStats {
    pub total: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ResultStats {
    pub total: i64,
    /// Rounded to 2 decimals, 0 when nothing was played
    pub avg_score: f64,
    pub played_this_week: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PaymentStats {
    pub total: i64,
    pub total_revenue_cents: i64,
    /// Completed payments of the last 30 days
    pub revenue_this_month_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub users: UserStats,
    pub quizzes: QuizStats,
    pub questions: QuestionStats,
    pub results: ResultStats,
    pub payments: PaymentStats,
    pub recent_logs: Vec<ActivityLog>,
    pub log_stats: LogStats,
}

/// An account in the admin listing. Teachers carry `quiz_count`, students
/// carry `result_count`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilters {
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// `prof`, `eleve` or `admin`
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role: Option<String>,
    /// Case-insensitive email substring
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
}

impl UserFilters {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            page: self.page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsers {
    pub users: Vec<AdminUser>,
    pub pagination: PaginationMeta,
}

fn validate_any_role(role: &str) -> Result<(), ValidationError> {
    UserRole::from_str(role)
        .map(|_| ())
        .map_err(|_| validation_error("role", "Role must be \"prof\", \"eleve\" or \"admin\""))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(custom(function = "validate_any_role"))]
    #[schema(example = "prof")]
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub user: User,
    /// Teachers only
    pub quizzes: Vec<QuizWithStats>,
    /// Students only, latest 20
    pub results: Vec<MyResult>,
    pub payments: Vec<Payment>,
    /// Latest 20 entries written by this user
    pub logs: Vec<ActivityLog>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(custom(function = "validate_any_role"))]
    pub role: Option<String>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateUserResponse {
    pub message: String,
    /// `{ "<field>": { "from": ..., "to": ... } }`
    #[schema(value_type = Object)]
    pub changes: Value,
}

/// Fields of an account that an update actually modifies, as `(from, to)`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub role: Option<(UserRole, UserRole)>,
    pub is_premium: Option<(bool, bool)>,
    pub is_active: Option<(bool, bool)>,
}

impl UserChanges {
    /// Requested values equal to the current ones are not changes.
    pub fn between(
        current: &User,
        role: Option<UserRole>,
        is_premium: Option<bool>,
        is_active: Option<bool>,
    ) -> Self {
        Self {
            role: role.filter(|r| *r != current.role).map(|r| (current.role, r)),
            is_premium: is_premium
                .filter(|p| *p != current.is_premium)
                .map(|p| (current.is_premium, p)),
            is_active: is_active
                .filter(|a| *a != current.is_active)
                .map(|a| (current.is_active, a)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.is_premium.is_none() && self.is_active.is_none()
    }

    pub fn to_json(&self) -> Value {
        let mut changes = Map::new();
        if let Some((from, to)) = self.role {
            changes.insert("role".into(), json!({ "from": from, "to": to }));
        }
        if let Some((from, to)) = self.is_premium {
            changes.insert("is_premium".into(), json!({ "from": from, "to": to }));
        }
        if let Some((from, to)) = self.is_active {
            changes.insert("is_active".into(), json!({ "from": from, "to": to }));
        }
        Value::Object(changes)
    }
}
