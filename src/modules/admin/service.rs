use std::str::FromStr;

use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use quizmaster_auth::UserRole;
use quizmaster_core::{AppError, PaginationMeta, hash_password};

use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::model::{LogFilters, LogStats, PaginatedLogs};
use crate::modules::activity_logs::{ActivityLogService, LogAction, LogEntry};
use crate::modules::auth::{User, normalize_email};
use crate::modules::payments::Payment;
use crate::modules::quizzes::model::QuizWithStats;
use crate::modules::results::model::MyResult;

use super::model::{
    AdminUser, CreateUserDto, CreatedUser, DEFAULT_USER_LIMIT, Dashboard, PaginatedUsers,
    PaymentStats, QuestionStats, QuizStats, RECENT_LOG_LIMIT, ResultStats, USER_DETAIL_LIMIT,
    UpdateUserDto, UpdateUserResponse, UserChanges, UserDetail, UserFilters, UserStats,
};

pub struct AdminService;

fn parse_role(role: &str) -> Result<UserRole, AppError> {
    UserRole::from_str(role).map_err(|_| {
        AppError::validation("role", "Role must be \"prof\", \"eleve\" or \"admin\"")
    })
}

/// `%`, `_` and `\` match literally in the search term.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl AdminService {
    #[instrument(skip(db, client))]
    pub async fn dashboard(
        db: &PgPool,
        admin_id: Uuid,
        client: &ClientInfo,
    ) -> Result<Dashboard, AppError> {
        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::AdminAccess)
                .user(admin_id)
                .details(json!({ "page": "dashboard" }))
                .client(client),
        )
        .await;

        let users = sqlx::query_as::<_, UserStats>(
            r#"SELECT
                 COUNT(*) AS total,
                 COUNT(*) FILTER (WHERE role = 'prof') AS profs,
                 COUNT(*) FILTER (WHERE role = 'eleve') AS eleves,
                 COUNT(*) FILTER (WHERE role = 'admin') AS admins,
                 COUNT(*) FILTER (WHERE is_premium) AS premium,
                 COUNT(*) FILTER (WHERE NOT is_active) AS inactive,
                 COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS new_this_week
               FROM users"#,
        )
        .fetch_one(db)
        .await?;

        let quizzes = sqlx::query_as::<_, QuizStats>(
            r#"SELECT
                 COUNT(*) AS total,
                 COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS new_this_week
               FROM quizzes"#,
        )
        .fetch_one(db)
        .await?;

        let questions =
            sqlx::query_as::<_, QuestionStats>("SELECT COUNT(*) AS total FROM questions")
                .fetch_one(db)
                .await?;

        let results = sqlx::query_as::<_, ResultStats>(
            r#"SELECT
                 COUNT(*) AS total,
                 COALESCE(ROUND(AVG(score)::numeric, 2), 0)::float8 AS avg_score,
                 COUNT(*) FILTER (WHERE played_at >= NOW() - INTERVAL '7 days') AS played_this_week
               FROM results"#,
        )
        .fetch_one(db)
        .await?;

        let payments = sqlx::query_as::<_, PaymentStats>(
            r#"SELECT
                 COUNT(*) AS total,
                 COALESCE(SUM(amount_cents) FILTER (WHERE status = 'completed'), 0)::int8
                     AS total_revenue_cents,
                 COALESCE(SUM(amount_cents) FILTER (
                     WHERE status = 'completed' AND created_at >= NOW() - INTERVAL '30 days'
                 ), 0)::int8 AS revenue_this_month_cents
               FROM payments"#,
        )
        .fetch_one(db)
        .await?;

        let recent_logs = ActivityLogService::recent(db, RECENT_LOG_LIMIT).await?;
        let log_stats = ActivityLogService::stats(db).await?;

        Ok(Dashboard {
            users,
            quizzes,
            questions,
            results,
            payments,
            recent_logs,
            log_stats,
        })
    }

    #[instrument(skip(db, client))]
    pub async fn list_users(
        db: &PgPool,
        admin_id: Uuid,
        filters: &UserFilters,
        client: &ClientInfo,
    ) -> Result<PaginatedUsers, AppError> {
        let role = filters.role.as_deref().map(parse_role).transpose()?;
        let search = filters.search.as_deref().map(like_pattern);

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::AdminViewUsers)
                .user(admin_id)
                .details(json!({ "filters": {
                    "role": filters.role,
                    "search": filters.search,
                    "is_active": filters.is_active
                }}))
                .client(client),
        )
        .await;

        let pagination = filters.pagination();
        let limit = pagination.limit_or(DEFAULT_USER_LIMIT);
        let page = pagination.page();
        let offset = pagination.offset_for(limit);

        const FILTERS: &str = r#"($1::user_role IS NULL OR u.role = $1)
              AND ($2::text IS NULL OR u.email ILIKE $2)
              AND ($3::bool IS NULL OR u.is_active = $3)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users u WHERE {}",
            FILTERS
        ))
        .bind(role)
        .bind(&search)
        .bind(filters.is_active)
        .fetch_one(db)
        .await?;

        let users = sqlx::query_as::<_, AdminUser>(&format!(
            r#"SELECT u.id, u.email, u.role, u.is_premium, u.is_active, u.created_at,
                      CASE WHEN u.role = 'prof'
                           THEN (SELECT COUNT(*) FROM quizzes q WHERE q.user_id = u.id)
                      END AS quiz_count,
                      CASE WHEN u.role = 'eleve'
                           THEN (SELECT COUNT(*) FROM results r WHERE r.user_id = u.id)
                      END AS result_count
               FROM users u
               WHERE {}
               ORDER BY u.created_at DESC
               LIMIT $4 OFFSET $5"#,
            FILTERS
        ))
        .bind(role)
        .bind(&search)
        .bind(filters.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsers {
            users,
            pagination: PaginationMeta::new(total, page, limit),
        })
    }

    /// Admin accounts are created premium.
    #[instrument(skip(db, dto, client), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(
        db: &PgPool,
        admin_id: Uuid,
        dto: CreateUserDto,
        client: &ClientInfo,
    ) -> Result<CreatedUser, AppError> {
        let role = parse_role(&dto.role)?;
        let email = normalize_email(&dto.email);
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (email, password, role, is_premium, is_active)
               VALUES ($1, $2, $3, $4, TRUE)
               RETURNING id, email, role, is_premium, is_active, created_at"#,
        )
        .bind(&email)
        .bind(&hashed_password)
        .bind(role)
        .bind(role == UserRole::Admin)
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

        info!(user_id = %user.id, "User created by admin");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::UserCreated)
                .user(admin_id)
                .target("user", user.id)
                .details(json!({ "email": user.email, "role": user.role }))
                .client(client),
        )
        .await;

        Ok(CreatedUser {
            id: user.id,
            email: user.email,
            role: user.role,
            message: "User created successfully".to_string(),
        })
    }

    async fn find_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, role, is_premium, is_active, created_at
               FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn user_detail(db: &PgPool, user_id: Uuid) -> Result<UserDetail, AppError> {
        let user = Self::find_user(db, user_id).await?;

        let quizzes = if user.role == UserRole::Prof {
            sqlx::query_as::<_, QuizWithStats>(
                r#"SELECT q.id, q.user_id, q.title, q.access_code, q.created_at,
                          (SELECT COUNT(*) FROM questions qu WHERE qu.quiz_id = q.id) AS question_count,
                          (SELECT COUNT(*) FROM results r WHERE r.quiz_id = q.id) AS result_count
                   FROM quizzes q
                   WHERE q.user_id = $1
                   ORDER BY q.created_at DESC"#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await?
        } else {
            Vec::new()
        };

        let results = if user.role == UserRole::Eleve {
            sqlx::query_as::<_, MyResult>(
                r#"SELECT r.id, r.quiz_id, r.score, r.played_at, q.title AS quiz_title
                   FROM results r
                   JOIN quizzes q ON q.id = r.quiz_id
                   WHERE r.user_id = $1
                   ORDER BY r.played_at DESC
                   LIMIT $2"#,
            )
            .bind(user_id)
            .bind(USER_DETAIL_LIMIT)
            .fetch_all(db)
            .await?
        } else {
            Vec::new()
        };

        let payments = sqlx::query_as::<_, Payment>(
            r#"SELECT id, user_id, stripe_session_id, amount_cents, status, created_at, updated_at
               FROM payments WHERE user_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        let logs = ActivityLogService::for_user(db, user_id, USER_DETAIL_LIMIT).await?;

        Ok(UserDetail {
            user,
            quizzes,
            results,
            payments,
            logs,
        })
    }

    /// Applies the fields that differ from the stored account. Each change
    /// is logged with its own action, then the whole diff as `USER_UPDATED`.
    #[instrument(skip(db, dto, client))]
    pub async fn update_user(
        db: &PgPool,
        admin_id: Uuid,
        user_id: Uuid,
        dto: UpdateUserDto,
        client: &ClientInfo,
    ) -> Result<UpdateUserResponse, AppError> {
        let role = dto.role.as_deref().map(parse_role).transpose()?;

        let mut tx = db.begin().await?;

        let current = sqlx::query_as::<_, User>(
            r#"SELECT id, email, role, is_premium, is_active, created_at
               FROM users WHERE id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if user_id == admin_id {
            if role.is_some_and(|r| r != UserRole::Admin) {
                return Err(AppError::forbidden(
                    "You cannot remove your own admin rights",
                ));
            }
            if dto.is_active == Some(false) {
                return Err(AppError::forbidden(
                    "You cannot deactivate your own account",
                ));
            }
        }

        let changes = UserChanges::between(&current, role, dto.is_premium, dto.is_active);
        if changes.is_empty() {
            return Err(AppError::bad_request(anyhow!("No changes provided")));
        }

        sqlx::query(
            r#"UPDATE users
               SET role = COALESCE($1, role),
                   is_premium = COALESCE($2, is_premium),
                   is_active = COALESCE($3, is_active)
               WHERE id = $4"#,
        )
        .bind(changes.role.map(|(_, to)| to))
        .bind(changes.is_premium.map(|(_, to)| to))
        .bind(changes.is_active.map(|(_, to)| to))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let entry = |action| {
            LogEntry::new(action)
                .user(admin_id)
                .target("user", user_id)
                .client(client)
        };

        if let Some((from, to)) = changes.role {
            ActivityLogService::record(
                db,
                entry(LogAction::UserRoleChanged).details(json!({ "from": from, "to": to })),
            )
            .await;
        }
        if let Some((_, to)) = changes.is_premium {
            let action = if to {
                LogAction::UserPremiumGranted
            } else {
                LogAction::UserPremiumRevoked
            };
            ActivityLogService::record(db, entry(action)).await;
        }
        if let Some((_, to)) = changes.is_active {
            let action = if to {
                LogAction::UserActivated
            } else {
                LogAction::UserDeactivated
            };
            ActivityLogService::record(db, entry(action)).await;
        }

        let diff = changes.to_json();
        ActivityLogService::record(db, entry(LogAction::UserUpdated).details(diff.clone())).await;

        Ok(UpdateUserResponse {
            message: "User updated".to_string(),
            changes: diff,
        })
    }

    #[instrument(skip(db, client))]
    pub async fn delete_user(
        db: &PgPool,
        admin_id: Uuid,
        user_id: Uuid,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        if user_id == admin_id {
            return Err(AppError::forbidden("You cannot delete your own account"));
        }

        let deleted = sqlx::query_as::<_, User>(
            r#"DELETE FROM users WHERE id = $1
               RETURNING id, email, role, is_premium, is_active, created_at"#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        info!(user_id = %deleted.id, "User deleted");

        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::UserDeleted)
                .user(admin_id)
                .target("user", deleted.id)
                .details(json!({ "email": deleted.email, "role": deleted.role }))
                .client(client),
        )
        .await;

        Ok(())
    }

    #[instrument(skip(db, client))]
    pub async fn logs(
        db: &PgPool,
        admin_id: Uuid,
        filters: &LogFilters,
        client: &ClientInfo,
    ) -> Result<PaginatedLogs, AppError> {
        ActivityLogService::record(
            db,
            LogEntry::new(LogAction::AdminViewLogs)
                .user(admin_id)
                .details(json!({ "filters": {
                    "action": filters.action,
                    "user_id": filters.user_id,
                    "target_type": filters.target_type,
                    "start_date": filters.start_date,
                    "end_date": filters.end_date
                }}))
                .client(client),
        )
        .await;

        ActivityLogService::list(db, filters).await
    }

    pub async fn log_stats(db: &PgPool) -> Result<LogStats, AppError> {
        ActivityLogService::stats(db).await
    }
}
