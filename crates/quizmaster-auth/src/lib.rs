//! # QuizMaster Auth
//!
//! Authentication types and JWT utilities for the QuizMaster API.
//!
//! - [`roles`]: the [`UserRole`] enum shared by tokens and the `users` table
//! - [`claims`]: access token claims
//! - [`jwt`]: token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use quizmaster_auth::{UserRole, create_access_token, verify_token};
//! use quizmaster_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "prof@example.com", UserRole::Prof, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, UserRole::Prof);
//! ```

pub mod claims;
pub mod jwt;
pub mod roles;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use roles::UserRole;
