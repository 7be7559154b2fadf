use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

use quizmaster::cli::create_admin;
use quizmaster::cli::seeder::{SeedConfig, clear_seeded_data, seed_database};
use quizmaster_db::{DatabaseConfig, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "quizmaster-cli")]
#[command(about = "QuizMaster CLI - Administrative tools for QuizMaster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake teachers, students, quizzes and results
    Seed {
        /// Number of teachers
        #[arg(long, default_value = "5")]
        profs: usize,

        /// Number of students
        #[arg(long, default_value = "30")]
        eleves: usize,

        /// Number of quizzes per teacher (capped at the premium quota)
        #[arg(long, default_value = "3")]
        quizzes_per_prof: usize,

        /// Number of questions per quiz
        #[arg(long, default_value = "5")]
        questions_per_quiz: usize,

        /// Number of quizzes played by each student
        #[arg(long, default_value = "3")]
        results_per_eleve: usize,
    },
    /// Delete every seeded account and everything it owns
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = connect().await;

    let outcome = match cli.command {
        Commands::CreateAdmin { email, password } => {
            handle_create_admin(&pool, email, password).await
        }
        Commands::Seed {
            profs,
            eleves,
            quizzes_per_prof,
            questions_per_quiz,
            results_per_eleve,
        } => {
            let config = SeedConfig {
                profs,
                eleves,
                quizzes_per_prof,
                questions_per_quiz,
                results_per_eleve,
            };
            seed_database(&pool, config)
                .await
                .map_err(|e| format!("Error seeding database: {:#}", e))
        }
        Commands::ClearSeed => clear_seeded_data(&pool)
            .await
            .map_err(|e| format!("Error clearing seeded data: {:#}", e)),
    };

    if let Err(message) = outcome {
        eprintln!("\n❌ {}", message);
        std::process::exit(1);
    }
}

async fn connect() -> PgPool {
    let Ok(config) = DatabaseConfig::from_env() else {
        eprintln!("❌ DATABASE_URL must be set");
        std::process::exit(1);
    };

    let pool = match init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("❌ Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    pool
}

async fn handle_create_admin(
    pool: &PgPool,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), String> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email address")
            .interact_text()
            .map_err(|e| format!("Failed to read email: {}", e))?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .map_err(|e| format!("Failed to read password: {}", e))?,
    };

    let admin = create_admin(pool, &email, &password)
        .await
        .map_err(|e| format!("Error creating admin: {:#}", e.error))?;

    println!("\n✅ Admin created successfully!");
    println!("   Id: {}", admin.id);
    println!("   Email: {}", admin.email);

    Ok(())
}
