//! Administration: dashboard, account management and audit log browsing.
//! Every route sits behind the `require_admin` layer.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_admin_router;
