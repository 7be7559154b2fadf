//! Fake quizzes with their questions, and results of students playing them.

use std::collections::HashSet;
use std::time::Instant;

use fake::Fake;
use fake::faker::lorem::en::{Sentence, Word, Words};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::questions::QuestionType;
use crate::modules::quizzes::access_code::generate_code;

use super::models::{QuestionSeed, QuizSeed, ResultSeed};

const TRUE_FALSE_OPTIONS: [&str; 2] = ["Vrai", "Faux"];

pub fn generate_quizzes(prof_ids: &[Uuid], per_prof: usize) -> Vec<QuizSeed> {
    let mut quizzes: Vec<QuizSeed> = prof_ids
        .par_iter()
        .flat_map_iter(|&user_id| {
            (0..per_prof).map(move |_| QuizSeed {
                user_id,
                title: quiz_title(),
                access_code: generate_code(&mut rand::thread_rng()),
            })
        })
        .collect();

    // Codes drawn on different threads may still collide with each other.
    let mut seen = HashSet::with_capacity(quizzes.len());
    let mut rng = rand::thread_rng();
    for quiz in &mut quizzes {
        while !seen.insert(quiz.access_code.clone()) {
            quiz.access_code = generate_code(&mut rng);
        }
    }

    quizzes
}

fn quiz_title() -> String {
    let words: Vec<String> = Words(2..5).fake();
    let title = words.join(" ");
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Quiz".to_string(),
    }
}

/// Inserts quizzes; rows whose access code is already taken in the
/// database are skipped.
pub async fn insert_quizzes(db: &PgPool, quizzes: &[QuizSeed]) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();

    let user_ids: Vec<Uuid> = quizzes.iter().map(|q| q.user_id).collect();
    let titles: Vec<&str> = quizzes.iter().map(|q| q.title.as_str()).collect();
    let codes: Vec<&str> = quizzes.iter().map(|q| q.access_code.as_str()).collect();

    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"INSERT INTO quizzes (user_id, title, access_code)
           SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[])
           ON CONFLICT (access_code) DO NOTHING
           RETURNING id"#,
    )
    .bind(&user_ids)
    .bind(&titles)
    .bind(&codes)
    .fetch_all(db)
    .await?;

    println!(
        "   ✓ Inserted {} quizzes in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Alternates multiple-choice and true/false questions.
pub fn generate_questions(quiz_ids: &[Uuid], per_quiz: usize) -> Vec<QuestionSeed> {
    quiz_ids
        .par_iter()
        .flat_map_iter(|&quiz_id| {
            (0..per_quiz).map(move |idx| {
                let kind = if idx % 2 == 0 {
                    QuestionType::Qcm
                } else {
                    QuestionType::Vf
                };
                generate_question(quiz_id, kind)
            })
        })
        .collect()
}

fn generate_question(quiz_id: Uuid, kind: QuestionType) -> QuestionSeed {
    let mut rng = rand::thread_rng();

    let options: Vec<String> = match kind {
        QuestionType::Vf => TRUE_FALSE_OPTIONS.iter().map(|s| s.to_string()).collect(),
        QuestionType::Qcm => {
            let mut options = Vec::with_capacity(kind.option_count());
            while options.len() < kind.option_count() {
                let word: String = Word().fake();
                if !options.contains(&word) {
                    options.push(word);
                }
            }
            options
        }
    };
    let correct_answer = options[rng.gen_range(0..options.len())].clone();

    let sentence: String = Sentence(6..12).fake();
    let question_text = format!("{}?", sentence.trim_end_matches('.'));

    QuestionSeed {
        quiz_id,
        kind,
        question_text,
        options,
        correct_answer,
    }
}

pub async fn insert_questions(db: &PgPool, questions: &[QuestionSeed]) -> anyhow::Result<u64> {
    let start_time = Instant::now();

    let quiz_ids: Vec<Uuid> = questions.iter().map(|q| q.quiz_id).collect();
    let kinds: Vec<&str> = questions.iter().map(|q| q.kind.as_str()).collect();
    let texts: Vec<&str> = questions.iter().map(|q| q.question_text.as_str()).collect();
    let options: Vec<Value> = questions.iter().map(|q| Value::from(q.options.clone())).collect();
    let answers: Vec<&str> = questions.iter().map(|q| q.correct_answer.as_str()).collect();

    let inserted = sqlx::query(
        r#"INSERT INTO questions (quiz_id, type, question_text, options, correct_answer)
           SELECT quiz_id, kind::question_type, question_text, options, correct_answer
           FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::jsonb[], $5::text[])
                AS t(quiz_id, kind, question_text, options, correct_answer)"#,
    )
    .bind(&quiz_ids)
    .bind(&kinds)
    .bind(&texts)
    .bind(&options)
    .bind(&answers)
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Inserted {} questions in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Each student plays up to `per_eleve` distinct quizzes.
pub fn generate_results(
    eleve_ids: &[Uuid],
    quiz_ids: &[Uuid],
    per_eleve: usize,
    max_score: usize,
) -> Vec<ResultSeed> {
    let max_score = i32::try_from(max_score).unwrap_or(i32::MAX);

    eleve_ids
        .par_iter()
        .flat_map_iter(|&user_id| {
            let mut rng = rand::thread_rng();
            quiz_ids
                .choose_multiple(&mut rng, per_eleve)
                .map(|&quiz_id| ResultSeed {
                    user_id,
                    quiz_id,
                    score: rng.gen_range(0..=max_score),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn insert_results(db: &PgPool, results: &[ResultSeed]) -> anyhow::Result<u64> {
    let start_time = Instant::now();

    let user_ids: Vec<Uuid> = results.iter().map(|r| r.user_id).collect();
    let quiz_ids: Vec<Uuid> = results.iter().map(|r| r.quiz_id).collect();
    let scores: Vec<i32> = results.iter().map(|r| r.score).collect();

    let inserted = sqlx::query(
        r#"INSERT INTO results (user_id, quiz_id, score)
           SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::int4[])"#,
    )
    .bind(&user_ids)
    .bind(&quiz_ids)
    .bind(&scores)
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Inserted {} results in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}
