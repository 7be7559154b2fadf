use sqlx::PgPool;
use tracing::{instrument, warn};

use quizmaster_core::{AppError, PaginationMeta};

use super::model::{
    ActionCount, ActivityLog, DEFAULT_LOG_LIMIT, DailyCount, LogEntry, LogFilters, LogStats,
    PaginatedLogs, TopUser,
};

pub struct ActivityLogService;

impl ActivityLogService {
    /// Appends an entry to the audit log.
    ///
    /// Logging never fails the request that triggered it: database errors
    /// are reported with `warn!` and dropped.
    #[instrument(skip(db, entry), fields(action = %entry.action))]
    pub async fn record(db: &PgPool, entry: LogEntry) {
        let result = sqlx::query(
            r#"INSERT INTO logs (user_id, action, target_type, target_id, details, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(db)
        .await;

        if let Err(e) = result {
            warn!(error = %e, action = %entry.action, "Failed to write activity log");
        }
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, filters: &LogFilters) -> Result<PaginatedLogs, AppError> {
        let pagination = filters.pagination();
        let limit = pagination.limit_or(DEFAULT_LOG_LIMIT);
        let page = pagination.page();
        let offset = pagination.offset_for(limit);

        // end_date covers the whole day
        const FILTERS: &str = r#"($1::text IS NULL OR l.action = $1)
              AND ($2::uuid IS NULL OR l.user_id = $2)
              AND ($3::text IS NULL OR l.target_type = $3)
              AND ($4::date IS NULL OR l.created_at >= $4::date)
              AND ($5::date IS NULL OR l.created_at < $5::date + INTERVAL '1 day')"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM logs l WHERE {}",
            FILTERS
        ))
        .bind(&filters.action)
        .bind(filters.user_id)
        .bind(&filters.target_type)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .fetch_one(db)
        .await?;

        let logs = sqlx::query_as::<_, ActivityLog>(&format!(
            r#"SELECT l.id, l.user_id, u.email AS user_email, l.action, l.target_type,
                      l.target_id, l.details, l.ip_address, l.user_agent, l.created_at
               FROM logs l
               LEFT JOIN users u ON u.id = l.user_id
               WHERE {}
               ORDER BY l.created_at DESC
               LIMIT $6 OFFSET $7"#,
            FILTERS
        ))
        .bind(&filters.action)
        .bind(filters.user_id)
        .bind(&filters.target_type)
        .bind(filters.start_date)
        .bind(filters.end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedLogs {
            logs,
            pagination: PaginationMeta::new(total, page, limit),
        })
    }

    /// Latest entries, used by the admin dashboard.
    #[instrument(skip(db))]
    pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"SELECT l.id, l.user_id, u.email AS user_email, l.action, l.target_type,
                      l.target_id, l.details, l.ip_address, l.user_agent, l.created_at
               FROM logs l
               LEFT JOIN users u ON u.id = l.user_id
               ORDER BY l.created_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(logs)
    }

    #[instrument(skip(db))]
    pub async fn for_user(
        db: &PgPool,
        user_id: uuid::Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"SELECT l.id, l.user_id, u.email AS user_email, l.action, l.target_type,
                      l.target_id, l.details, l.ip_address, l.user_agent, l.created_at
               FROM logs l
               LEFT JOIN users u ON u.id = l.user_id
               WHERE l.user_id = $1
               ORDER BY l.created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(logs)
    }

    #[instrument(skip(db))]
    pub async fn stats(db: &PgPool) -> Result<LogStats, AppError> {
        let last_24h = sqlx::query_as::<_, ActionCount>(
            r#"SELECT action, COUNT(*) AS count
               FROM logs
               WHERE created_at >= NOW() - INTERVAL '24 hours'
               GROUP BY action
               ORDER BY count DESC, action"#,
        )
        .fetch_all(db)
        .await?;

        let last_7_days = sqlx::query_as::<_, DailyCount>(
            r#"SELECT created_at::date AS date, COUNT(*) AS count
               FROM logs
               WHERE created_at >= NOW() - INTERVAL '7 days'
               GROUP BY created_at::date
               ORDER BY date DESC"#,
        )
        .fetch_all(db)
        .await?;

        let top_users = sqlx::query_as::<_, TopUser>(
            r#"SELECT l.user_id AS user_id, u.email, COUNT(*) AS action_count
               FROM logs l
               LEFT JOIN users u ON u.id = l.user_id
               WHERE l.user_id IS NOT NULL
                 AND l.created_at >= NOW() - INTERVAL '7 days'
               GROUP BY l.user_id, u.email
               ORDER BY action_count DESC
               LIMIT 10"#,
        )
        .fetch_all(db)
        .await?;

        let total_logs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM logs")
            .fetch_one(db)
            .await?;

        Ok(LogStats {
            last_24h,
            last_7_days,
            top_users,
            total_logs,
        })
    }
}
