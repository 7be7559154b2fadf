//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: `AuthUser`, the bearer-token extractor
//! - [`role`]: role gates as extractors (`RequireProf`, ...) and as
//!   `from_fn_with_state` middleware (`require_prof`, ...)
//! - [`client`]: `ClientInfo`, the caller's IP address and user agent
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the JWT and exposes the claims
//! 3. Role gates compare the role claim against the route's requirement
//!
//! ```ignore
//! use crate::middleware::role::RequireProf;
//!
//! async fn list_quizzes(RequireProf(auth_user): RequireProf) -> ... {
//!     let user_id = auth_user.user_id()?;
//! }
//! ```

pub mod auth;
pub mod client;
pub mod role;
