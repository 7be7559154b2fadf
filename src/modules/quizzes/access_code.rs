//! Quiz access codes: 5 characters drawn uniformly from `A-Z0-9`.
//!
//! Uniqueness is checked against the database before use; the `UNIQUE`
//! constraint on `quizzes.access_code` remains the final arbiter and the
//! insert retries on conflict.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgConnection;
use tracing::debug;

use quizmaster_core::AppError;

pub const ACCESS_CODE_LEN: usize = 5;
pub const ACCESS_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws per call to [`generate_unique_code`].
pub const MAX_ATTEMPTS: usize = 32;

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ACCESS_CODE_LEN)
        .map(|_| ACCESS_CODE_CHARSET[rng.gen_range(0..ACCESS_CODE_CHARSET.len())] as char)
        .collect()
}

/// Codes are matched case-insensitively.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_well_formed(code: &str) -> bool {
    code.len() == ACCESS_CODE_LEN
        && code
            .bytes()
            .all(|b| ACCESS_CODE_CHARSET.contains(&b))
}

/// Draws codes until one is not used by any quiz.
pub async fn generate_unique_code(conn: &mut PgConnection) -> Result<String, AppError> {
    let mut rng = StdRng::from_entropy();
    generate_unique_code_with(conn, &mut rng).await
}

/// [`generate_unique_code`] drawing from `rng`.
pub async fn generate_unique_code_with<R: Rng + ?Sized>(
    conn: &mut PgConnection,
    rng: &mut R,
) -> Result<String, AppError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let code = generate_code(&mut *rng);

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM quizzes WHERE access_code = $1)",
        )
        .bind(&code)
        .fetch_one(&mut *conn)
        .await?;

        if !taken {
            return Ok(code);
        }
        debug!(attempt, "Access code collision");
    }

    Err(AppError::internal_error(
        "Could not generate a unique access code",
    ))
}
