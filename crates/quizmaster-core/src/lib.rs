//! # QuizMaster Core
//!
//! Core types, errors, and utilities for the QuizMaster API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: The `{ "success": true, "data": ... }` envelope
//! - [`pagination`]: Page-based pagination parameters and metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Query-string friendly deserializers
//!
//! # Example
//!
//! ```ignore
//! use quizmaster_core::{AppError, ApiResponse};
//!
//! async fn handler() -> Result<Json<ApiResponse<Quiz>>, AppError> {
//!     let quiz = load_quiz().await.ok_or_else(|| AppError::not_found(anyhow!("Quiz not found")))?;
//!     Ok(ApiResponse::ok(quiz))
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, MessageResponse};
