//! Seed rows and seeding configuration.

use uuid::Uuid;

use quizmaster_auth::UserRole;

use crate::modules::questions::QuestionType;

/// Every seeded account uses this domain so that `clear-seed` can find them.
pub const SEED_EMAIL_DOMAIN: &str = "seed.quizmaster.local";

/// Shared password of every seeded account.
pub const SEED_PASSWORD: &str = "Password123";

pub struct UserSeed {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_premium: bool,
}

pub struct QuizSeed {
    pub user_id: Uuid,
    pub title: String,
    pub access_code: String,
}

pub struct QuestionSeed {
    pub quiz_id: Uuid,
    pub kind: QuestionType,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

pub struct ResultSeed {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub profs: usize,
    pub eleves: usize,
    /// Teachers with more than one quiz are seeded as premium.
    pub quizzes_per_prof: usize,
    pub questions_per_quiz: usize,
    pub results_per_eleve: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            profs: 5,
            eleves: 30,
            quizzes_per_prof: 3,
            questions_per_quiz: 5,
            results_per_eleve: 3,
        }
    }
}

impl SeedConfig {
    pub fn profs_are_premium(&self) -> bool {
        self.quizzes_per_prof > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_follows_quota() {
        let config = SeedConfig {
            quizzes_per_prof: 1,
            ..SeedConfig::default()
        };
        assert!(!config.profs_are_premium());
        assert!(SeedConfig::default().profs_are_premium());
    }
}
