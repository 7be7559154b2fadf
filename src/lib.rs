//! # QuizMaster API
//!
//! Backend of a quiz platform built with Axum and PostgreSQL. Teachers
//! (`prof`) write multiple-choice and true/false quizzes, students
//! (`eleve`) join them with a 5-character access code and submit their
//! scores, and administrators supervise accounts through an audit log.
//! Free teachers may own one quiz; a Stripe Checkout payment unlocks the
//! premium quota of 20.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── cli/              # create-admin, seed, clear-seed
//! ├── middleware/       # JWT extractor, role gates, client info
//! ├── modules/          # Feature modules
//! │   ├── auth/            # register, login, me, logout
//! │   ├── quizzes/         # quiz CRUD, access codes, join
//! │   ├── questions/       # question CRUD, play
//! │   ├── results/         # score submission and reporting
//! │   ├── payments/        # Stripe Checkout and webhook
//! │   ├── activity_logs/   # audit log pipeline
//! │   ├── admin/           # dashboard, user management, logs
//! │   └── health/
//! ├── docs.rs           # OpenAPI document
//! ├── router.rs         # Application router and layers
//! ├── state.rs          # Shared application state
//! └── validator.rs      # ValidatedJson extractor
//! ```
//!
//! Each feature module follows the same layout: `controller.rs` (HTTP
//! handlers), `service.rs` (SQL and business rules), `model.rs` (rows and
//! DTOs) and `router.rs`.
//!
//! ## Responses
//!
//! Every JSON response uses the envelope `{ "success": true, "data": ... }`
//! or `{ "success": false, "error": { "code", "message", "field"? } }`.
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod cli;
pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use quizmaster_auth;
pub use quizmaster_config;
pub use quizmaster_core;
pub use quizmaster_db;
