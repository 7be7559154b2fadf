use std::env;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "quizmaster-dev-secret-change-in-production".to_string()),
            expires_in: env_or("JWT_EXPIRES_IN", 86400), // 24 hours
        }
    }
}
