pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Question, QuestionType};
pub use router::init_questions_router;
