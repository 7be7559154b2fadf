//! Fake teacher and student accounts.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

use quizmaster_auth::UserRole;

use super::models::{SEED_EMAIL_DOMAIN, UserSeed};

/// Builds `count` accounts of `role` in parallel.
///
/// The index is part of the local part so generated emails never collide
/// within a run, whatever names the faker picks.
pub fn generate_users(
    role: UserRole,
    count: usize,
    is_premium: bool,
    password_hash: &str,
) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| UserSeed {
            email: seed_email(role, idx),
            password_hash: password_hash.to_string(),
            role,
            is_premium,
        })
        .collect()
}

fn seed_email(role: UserRole, idx: usize) -> String {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    format!(
        "{}.{}+{}{}@{}",
        email_safe(&first_name),
        email_safe(&last_name),
        role.as_str(),
        idx,
        SEED_EMAIL_DOMAIN
    )
}

fn email_safe(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Inserts the accounts in one statement; emails already present are skipped.
pub async fn insert_users(db: &PgPool, users: &[UserSeed]) -> anyhow::Result<Vec<Uuid>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let start_time = Instant::now();

    let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
    let hashes: Vec<&str> = users.iter().map(|u| u.password_hash.as_str()).collect();
    let roles: Vec<&str> = users.iter().map(|u| u.role.as_str()).collect();
    let premium: Vec<bool> = users.iter().map(|u| u.is_premium).collect();

    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"INSERT INTO users (email, password, role, is_premium)
           SELECT email, password, role::user_role, is_premium
           FROM UNNEST($1::text[], $2::text[], $3::text[], $4::bool[])
                AS t(email, password, role, is_premium)
           ON CONFLICT (email) DO NOTHING
           RETURNING id"#,
    )
    .bind(&emails)
    .bind(&hashes)
    .bind(&roles)
    .bind(&premium)
    .fetch_all(db)
    .await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Deletes every account on the seed domain; their quizzes, questions,
/// results and payments go with them.
pub async fn clear_users(db: &PgPool) -> anyhow::Result<u64> {
    let deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted)
}
