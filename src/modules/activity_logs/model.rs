use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use quizmaster_core::serde::{
    deserialize_optional_date, deserialize_optional_i64, deserialize_optional_string,
    deserialize_optional_uuid,
};
use quizmaster_core::{PaginationMeta, PaginationParams};

use crate::middleware::client::ClientInfo;

/// Default page size of log listings.
pub const DEFAULT_LOG_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Login,
    LoginFailed,
    Logout,
    Register,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserActivated,
    UserDeactivated,
    UserRoleChanged,
    UserPremiumGranted,
    UserPremiumRevoked,
    QuizCreated,
    QuizUpdated,
    QuizDeleted,
    QuestionCreated,
    QuestionUpdated,
    QuestionDeleted,
    QuizPlayed,
    PaymentInitiated,
    PaymentCompleted,
    PaymentFailed,
    AdminAccess,
    AdminViewLogs,
    AdminViewUsers,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Login => "LOGIN",
            LogAction::LoginFailed => "LOGIN_FAILED",
            LogAction::Logout => "LOGOUT",
            LogAction::Register => "REGISTER",
            LogAction::UserCreated => "USER_CREATED",
            LogAction::UserUpdated => "USER_UPDATED",
            LogAction::UserDeleted => "USER_DELETED",
            LogAction::UserActivated => "USER_ACTIVATED",
            LogAction::UserDeactivated => "USER_DEACTIVATED",
            LogAction::UserRoleChanged => "USER_ROLE_CHANGED",
            LogAction::UserPremiumGranted => "USER_PREMIUM_GRANTED",
            LogAction::UserPremiumRevoked => "USER_PREMIUM_REVOKED",
            LogAction::QuizCreated => "QUIZ_CREATED",
            LogAction::QuizUpdated => "QUIZ_UPDATED",
            LogAction::QuizDeleted => "QUIZ_DELETED",
            LogAction::QuestionCreated => "QUESTION_CREATED",
            LogAction::QuestionUpdated => "QUESTION_UPDATED",
            LogAction::QuestionDeleted => "QUESTION_DELETED",
            LogAction::QuizPlayed => "QUIZ_PLAYED",
            LogAction::PaymentInitiated => "PAYMENT_INITIATED",
            LogAction::PaymentCompleted => "PAYMENT_COMPLETED",
            LogAction::PaymentFailed => "PAYMENT_FAILED",
            LogAction::AdminAccess => "ADMIN_ACCESS",
            LogAction::AdminViewLogs => "ADMIN_VIEW_LOGS",
            LogAction::AdminViewUsers => "ADMIN_VIEW_USERS",
        }
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log line waiting to be written.
///
/// ```ignore
/// LogEntry::new(LogAction::QuizCreated)
///     .user(user_id)
///     .target("quiz", quiz.id)
///     .details(json!({ "title": quiz.title }))
///     .client(&client);
/// ```
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub user_id: Option<Uuid>,
    pub action: LogAction,
    pub target_type: Option<&'static str>,
    pub target_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl LogEntry {
    pub fn new(action: LogAction) -> Self {
        Self {
            user_id: None,
            action,
            target_type: None,
            target_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn target(mut self, target_type: &'static str, target_id: Uuid) -> Self {
        self.target_type = Some(target_type);
        self.target_id = Some(target_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn client(mut self, client: &ClientInfo) -> Self {
        self.ip_address = client.ip_address.clone();
        self.user_agent = client.user_agent.clone();
        self
    }
}

/// A stored log line joined with the acting user's email.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogFilters {
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default 50)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Exact action name, e.g. `LOGIN_FAILED`
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub target_type: Option<String>,
    /// First day included (YYYY-MM-DD)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl LogFilters {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            page: self.page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedLogs {
    pub logs: Vec<ActivityLog>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TopUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub action_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogStats {
    /// Actions of the last 24 hours, most frequent first
    pub last_24h: Vec<ActionCount>,
    /// Log volume per day over the last 7 days
    pub last_7_days: Vec<DailyCount>,
    /// Most active users over the last 7 days
    pub top_users: Vec<TopUser>,
    pub total_logs: i64,
}
