pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod stripe;

pub use model::{Payment, PaymentStatus};
pub use router::init_payments_router;
