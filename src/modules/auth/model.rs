use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use quizmaster_auth::UserRole;

use crate::validator::{validate_password_strength, validation_error};

/// Emails are matched case-insensitively: stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Public view of an account. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct UserWithPassword {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    fn from(row: UserWithPassword) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role,
            is_premium: row.is_premium,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

fn validate_self_registrable_role(role: &str) -> Result<(), ValidationError> {
    match UserRole::from_str(role) {
        Ok(role) if role.is_self_registrable() => Ok(()),
        _ => Err(validation_error(
            "role",
            "Role must be \"prof\" or \"eleve\"",
        )),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDto {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    #[schema(example = "prof@example.com")]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    #[schema(example = "Secret123")]
    pub password: String,
    /// `prof` or `eleve`
    #[validate(custom(function = "validate_self_registrable_role"))]
    #[schema(example = "prof")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginDto {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
