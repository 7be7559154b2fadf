//! Rate limiting configuration for API endpoints.
//!
//! Limits are enforced with a token bucket per client IP:
//!
//! - One token is added every `*_PER_SECOND` seconds
//! - Each request consumes one token
//! - Burst size defines the maximum tokens that can accumulate
//! - Requests are rejected with `429` when no tokens are available
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: set to `false` or `0` to disable limiting (default: enabled)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: default 2
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: default 30
//! - `RATE_LIMIT_AUTH_PER_SECOND`: default 10
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: default 5
//!
//! The client IP is taken from `X-Forwarded-For`, `X-Real-IP` or `Forwarded`
//! before falling back to the peer address, so the server has to be started
//! with `into_make_service_with_connect_info::<SocketAddr>()`.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds between token replenishments for general endpoints.
    pub general_per_second: u64,
    pub general_burst_size: u32,
    /// Authentication endpoints get a smaller bucket to slow down brute-force attempts.
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "off"))
            .unwrap_or(defaults.enabled);

        Self {
            enabled,
            general_per_second: env_or("RATE_LIMIT_GENERAL_PER_SECOND", defaults.general_per_second),
            general_burst_size: env_or("RATE_LIMIT_GENERAL_BURST_SIZE", defaults.general_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Same limits with limiting switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Governor config for general API endpoints.
    ///
    /// Returns `None` when the values are rejected by the builder
    /// (a zero rate or a zero burst size).
    #[must_use]
    pub fn general_governor_config(&self) -> Option<IpGovernorConfig> {
        build(self.general_per_second, self.general_burst_size)
    }

    /// Governor config for `/api/auth/*`.
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<IpGovernorConfig> {
        build(self.auth_per_second, self.auth_burst_size)
    }
}

fn build(per_second: u64, burst_size: u32) -> Option<IpGovernorConfig> {
    GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_per_second, 2);
        assert_eq!(config.general_burst_size, 30);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_governor_configs_build() {
        let config = RateLimitConfig::default();
        assert!(config.general_governor_config().is_some());
        assert!(config.auth_governor_config().is_some());
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert!(config.auth_governor_config().is_none());
    }
}
