//! # QuizMaster Config
//!
//! Configuration types for the QuizMaster API, loaded from environment
//! variables (a `.env` file is read by the binaries via `dotenvy`):
//!
//! - [`server`]: bind address and frontend URL
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`cors`]: allowed CORS origins
//! - [`stripe`]: Stripe Checkout credentials and webhook settings
//! - [`rate_limit`]: API rate limiting
//!
//! # Example
//!
//! ```ignore
//! use quizmaster_config::{JwtConfig, CorsConfig, StripeConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let stripe_config = StripeConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;
pub mod stripe;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::{IpGovernorConfig, RateLimitConfig};
pub use server::ServerConfig;
pub use stripe::StripeConfig;

/// Reads an environment variable and parses it, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
