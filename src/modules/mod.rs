pub mod activity_logs;
pub mod admin;
pub mod auth;
pub mod health;
pub mod payments;
pub mod questions;
pub mod quizzes;
pub mod results;
