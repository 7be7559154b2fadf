//! Administrative commands used by the `quizmaster-cli` binary.

pub mod seeder;

use anyhow::anyhow;
use sqlx::PgPool;

use quizmaster_auth::UserRole;
use quizmaster_core::{AppError, hash_password};

use crate::modules::admin::model::CreateUserDto;
use crate::modules::auth::{User, normalize_email};
use crate::validator::validate_dto;

/// Creates an active, premium `admin` account.
///
/// The email and password go through the same rules as `POST /api/admin/users`.
pub async fn create_admin(db: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let dto = CreateUserDto {
        email: normalize_email(email),
        password: password.to_string(),
        role: UserRole::Admin.as_str().to_string(),
    };
    validate_dto(&dto)?;

    let hashed_password = hash_password(&dto.password)?;

    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (email, password, role, is_premium, is_active)
           VALUES ($1, $2, 'admin', TRUE, TRUE)
           ON CONFLICT (email) DO NOTHING
           RETURNING id, email, role, is_premium, is_active, created_at"#,
    )
    .bind(&dto.email)
    .bind(&hashed_password)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::conflict(anyhow!("A user with this email already exists")))
}
