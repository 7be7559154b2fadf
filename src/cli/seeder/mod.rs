//! Development data seeding.
//!
//! Accounts are generated in parallel with `rayon` and `fake`, then
//! inserted with one `UNNEST` statement per table. All seeded accounts
//! live on [`SEED_EMAIL_DOMAIN`](models::SEED_EMAIL_DOMAIN) and share
//! [`SEED_PASSWORD`](models::SEED_PASSWORD).

pub mod models;
pub mod quizzes;
pub mod users;

use std::time::Instant;

use sqlx::PgPool;

use quizmaster_auth::UserRole;
use quizmaster_core::hash_password;

use crate::modules::quizzes::model::PREMIUM_QUIZ_LIMIT;

pub use models::SeedConfig;

pub async fn seed_database(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let quizzes_per_prof = config
        .quizzes_per_prof
        .min(usize::try_from(PREMIUM_QUIZ_LIMIT).unwrap_or(usize::MAX));

    println!("🌱 Starting database seeding...");
    println!("   - Teachers: {}", config.profs);
    println!("   - Students: {}", config.eleves);
    println!(
        "   - Quizzes per teacher: {}, questions per quiz: {}",
        quizzes_per_prof, config.questions_per_quiz
    );

    println!("\n🔐 Hashing password...");
    let password_hash = hash_password(models::SEED_PASSWORD).map_err(|e| e.error)?;

    println!("\n👥 Seeding teachers...");
    let profs = users::generate_users(
        UserRole::Prof,
        config.profs,
        config.profs_are_premium(),
        &password_hash,
    );
    let prof_ids = users::insert_users(db, &profs).await?;

    println!("\n🎓 Seeding students...");
    let eleves = users::generate_users(UserRole::Eleve, config.eleves, false, &password_hash);
    let eleve_ids = users::insert_users(db, &eleves).await?;

    println!("\n📝 Seeding quizzes...");
    let quiz_seeds = quizzes::generate_quizzes(&prof_ids, quizzes_per_prof);
    let quiz_ids = if quiz_seeds.is_empty() {
        Vec::new()
    } else {
        quizzes::insert_quizzes(db, &quiz_seeds).await?
    };

    if !quiz_ids.is_empty() && config.questions_per_quiz > 0 {
        println!("\n❓ Seeding questions...");
        let questions = quizzes::generate_questions(&quiz_ids, config.questions_per_quiz);
        quizzes::insert_questions(db, &questions).await?;
    }

    if !quiz_ids.is_empty() && !eleve_ids.is_empty() && config.results_per_eleve > 0 {
        println!("\n🏆 Seeding results...");
        let results = quizzes::generate_results(
            &eleve_ids,
            &quiz_ids,
            config.results_per_eleve,
            config.questions_per_quiz,
        );
        quizzes::insert_results(db, &results).await?;
    }

    println!(
        "\n✅ Database seeded successfully in {:?}",
        start_time.elapsed()
    );
    println!("\n📝 Default password for all users: {}", models::SEED_PASSWORD);

    Ok(())
}

pub async fn clear_seeded_data(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let deleted = users::clear_users(db).await?;

    println!(
        "   ✓ Deleted {} users and their quizzes in {:?}",
        deleted,
        start_time.elapsed()
    );
    println!("✅ Seeded data cleared successfully!");

    Ok(())
}
