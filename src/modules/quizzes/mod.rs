pub mod access_code;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::Quiz;
pub use router::init_quizzes_router;
