//! Audit log pipeline: privileged and notable actions are appended to the
//! `logs` table and aggregated for the admin dashboard.

pub mod model;
pub mod service;

pub use model::{LogAction, LogEntry};
pub use service::ActivityLogService;
