use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use quizmaster_auth::UserRole;
use quizmaster_core::errors::{ErrorBody, ErrorResponse};
use quizmaster_core::{MessageResponse, PaginationMeta};

use crate::modules::activity_logs::model::{
    ActionCount, ActivityLog, DailyCount, LogAction, LogStats, PaginatedLogs, TopUser,
};
use crate::modules::admin::model::{
    AdminUser, CreateUserDto, CreatedUser, Dashboard, PaginatedUsers, PaymentStats, QuestionStats,
    QuizStats, ResultStats, UpdateUserDto, UpdateUserResponse, UserDetail, UserStats,
};
use crate::modules::auth::model::{AuthResponse, LoginDto, RegisterDto, User};
use crate::modules::health::controller::HealthResponse;
use crate::modules::payments::model::{
    CheckoutResponse, Payment, PaymentStatus, PaymentStatusResponse, WebhookAck,
};
use crate::modules::questions::model::{
    CreateQuestionDto, PublicQuestion, Question, QuestionType, UpdateQuestionDto,
};
use crate::modules::quizzes::model::{JoinedQuiz, Quiz, QuizDto, QuizWithStats};
use crate::modules::results::model::{
    AnswerDetail, AnswerDto, CreateResultDto, MyResult, QuizResult, QuizResultEntry,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::logout,
        crate::modules::quizzes::controller::list_quizzes,
        crate::modules::quizzes::controller::get_quiz,
        crate::modules::quizzes::controller::create_quiz,
        crate::modules::quizzes::controller::update_quiz,
        crate::modules::quizzes::controller::delete_quiz,
        crate::modules::quizzes::controller::join_quiz,
        crate::modules::questions::controller::play_questions,
        crate::modules::questions::controller::quiz_questions,
        crate::modules::questions::controller::create_question,
        crate::modules::questions::controller::update_question,
        crate::modules::questions::controller::delete_question,
        crate::modules::results::controller::create_result,
        crate::modules::results::controller::my_results,
        crate::modules::results::controller::quiz_results,
        crate::modules::results::controller::result_answers,
        crate::modules::payments::controller::create_checkout,
        crate::modules::payments::controller::webhook,
        crate::modules::payments::controller::payment_success,
        crate::modules::admin::controller::dashboard,
        crate::modules::admin::controller::list_users,
        crate::modules::admin::controller::create_user,
        crate::modules::admin::controller::get_user,
        crate::modules::admin::controller::update_user,
        crate::modules::admin::controller::delete_user,
        crate::modules::admin::controller::list_logs,
        crate::modules::admin::controller::log_stats,
        crate::modules::health::controller::health,
    ),
    components(
        schemas(
            User,
            UserRole,
            RegisterDto,
            LoginDto,
            AuthResponse,
            MessageResponse,
            ErrorResponse,
            ErrorBody,
            PaginationMeta,
            Quiz,
            QuizWithStats,
            QuizDto,
            JoinedQuiz,
            Question,
            QuestionType,
            PublicQuestion,
            CreateQuestionDto,
            UpdateQuestionDto,
            QuizResult,
            AnswerDto,
            CreateResultDto,
            MyResult,
            QuizResultEntry,
            AnswerDetail,
            Payment,
            PaymentStatus,
            CheckoutResponse,
            PaymentStatusResponse,
            WebhookAck,
            LogAction,
            ActivityLog,
            PaginatedLogs,
            ActionCount,
            DailyCount,
            TopUser,
            LogStats,
            UserStats,
            QuizStats,
            QuestionStats,
            ResultStats,
            PaymentStats,
            Dashboard,
            AdminUser,
            PaginatedUsers,
            CreateUserDto,
            CreatedUser,
            UserDetail,
            UpdateUserDto,
            UpdateUserResponse,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session endpoints"),
        (name = "Quizzes", description = "Quiz management for teachers and joining by access code"),
        (name = "Questions", description = "Multiple-choice and true/false questions"),
        (name = "Results", description = "Score submission and reporting"),
        (name = "Payments", description = "Stripe Checkout for the premium plan"),
        (name = "Admin", description = "Administration dashboard, users and activity logs"),
        (name = "Health", description = "Service health")
    ),
    info(
        title = "QuizMaster API",
        version = "0.1.0",
        description = "Quiz platform backend built with Rust, Axum and PostgreSQL. Teachers build quizzes, students join them with an access code.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/register",
            "/api/quizzes/join/{code}",
            "/api/questions/play/{quiz_id}",
            "/api/results/{result_id}/answers",
            "/api/payments/webhook",
            "/api/admin/logs/stats",
            "/api/health",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
