use std::time::Duration;

use sqlx::PgPool;

use quizmaster_config::{CorsConfig, JwtConfig, RateLimitConfig, ServerConfig, StripeConfig};
use quizmaster_db::{DatabaseConfig, init_db_pool};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub stripe_config: StripeConfig,
    pub rate_limit_config: RateLimitConfig,
    pub server_config: ServerConfig,
    /// Outbound client for the Stripe API.
    pub http_client: reqwest::Client,
}

impl AppState {
    /// State with every config read from the environment around an existing pool.
    pub fn from_env(db: PgPool) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            stripe_config: StripeConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            server_config: ServerConfig::from_env(),
            http_client: build_http_client()?,
        })
    }
}

pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("quizmaster/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db_config = DatabaseConfig::from_env()
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let db = init_db_pool(&db_config).await?;
    AppState::from_env(db)
}
