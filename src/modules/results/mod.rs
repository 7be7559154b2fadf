pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::QuizResult;
pub use router::init_results_router;
