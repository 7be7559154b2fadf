use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quizmaster_auth::{UserRole, create_access_token};
use quizmaster_config::JwtConfig;
use quizmaster_core::{AppError, hash_password, verify_password};
use quizmaster_observability::{
    track_jwt_issued, track_user_login_failure, track_user_login_success, track_user_registered,
};

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};

use super::model::{
    AuthResponse, LoginDto, RegisterDto, User, UserWithPassword, normalize_email,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verified against on unknown emails so both login failures cost one bcrypt check.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("quizmaster-unknown-account").unwrap_or_default());

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config, client), fields(email = %dto.email, role = %dto.role))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterDto,
        jwt_config: &JwtConfig,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let role = UserRole::from_str(&dto.role).map_err(|e| AppError::validation("role", e))?;
        let email = normalize_email(&dto.email);
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (email, password, role, is_premium)
               VALUES ($1, $2, $3, FALSE)
               RETURNING id, email, role, is_premium, is_active, created_at"#,
        )
        .bind(&email)
        .bind(&hashed_password)
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow!("This email is already in use"))
                    .with_field("email");
            }
            AppError::database(e)
        })?;

        let token = create_access_token(user.id, &user.email, user.role, jwt_config)?;

        track_user_registered(user.role.as_str());
        track_jwt_issued();
        info!(user_id = %user.id, "User registered");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::Register)
                .user(user.id)
                .target("user", user.id)
                .details(json!({ "email": user.email, "role": user.role }))
                .client(client),
        )
        .await;

        Ok(AuthResponse { user, token })
    }

    #[instrument(skip(db, dto, jwt_config, client), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginDto,
        jwt_config: &JwtConfig,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let row = sqlx::query_as::<_, UserWithPassword>(
            r#"SELECT id, email, password, role, is_premium, is_active, created_at
               FROM users WHERE email = $1"#,
        )
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(row) = row else {
            let _ = verify_password(&dto.password, &DUMMY_HASH);
            Self::record_failed_login(db, None, &email, "unknown_email", client).await;
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &row.password)? {
            Self::record_failed_login(db, Some(row.id), &email, "invalid_password", client).await;
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !row.is_active {
            Self::record_failed_login(db, Some(row.id), &email, "account_disabled", client).await;
            return Err(AppError::forbidden("This account has been deactivated"));
        }

        let user = User::from(row);
        let token = create_access_token(user.id, &user.email, user.role, jwt_config)?;

        track_user_login_success(user.role.as_str());
        track_jwt_issued();

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::Login)
                .user(user.id)
                .target("user", user.id)
                .client(client),
        )
        .await;

        Ok(AuthResponse { user, token })
    }

    async fn record_failed_login(
        db: &PgPool,
        user_id: Option<Uuid>,
        email: &str,
        reason: &str,
        client: &ClientInfo,
    ) {
        warn!(email = %email, reason = %reason, "Login failed");
        track_user_login_failure(reason);

        let mut entry = LogEntry::new(LogAction::LoginFailed)
            .details(json!({ "email": email, "reason": reason }))
            .client(client);
        if let Some(user_id) = user_id {
            entry = entry.user(user_id);
        }
        ActivityLogService::record(db, entry).await;
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, role, is_premium, is_active, created_at
               FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db, client))]
    pub async fn logout(db: &PgPool, user_id: Uuid, client: &ClientInfo) {
        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::Logout)
                .user(user_id)
                .target("user", user_id)
                .client(client),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_is_a_real_bcrypt_hash() {
        assert!(DUMMY_HASH.starts_with("$2b$10$"));
        assert!(!verify_password("Secret123", &DUMMY_HASH).unwrap());
    }
}
