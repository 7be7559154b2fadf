use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quizmaster_core::errors::ErrorResponse;
use quizmaster_core::{ApiResponse, AppError};

use crate::middleware::client::ClientInfo;
use crate::middleware::role::{RequireEleve, RequireProf};
use crate::state::AppState;
use crate::validator::{Path, ValidatedJson};

use super::model::{JoinedQuiz, Quiz, QuizDto, QuizWithStats};
use super::service::QuizService;

/// Quizzes owned by the caller, newest first
#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses(
        (status = 200, description = "Owned quizzes", body = ApiResponse<Vec<QuizWithStats>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn list_quizzes(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
) -> Result<Json<ApiResponse<Vec<QuizWithStats>>>, AppError> {
    let quizzes = QuizService::list_for_owner(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(quizzes))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz", body = ApiResponse<Quiz>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not owned", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_quiz(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Quiz>>, AppError> {
    let quiz = QuizService::get_owned(&state.db, id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(quiz))
}

/// Create a quiz with a fresh access code
#[utoipa::path(
    post,
    path = "/api/quizzes",
    request_body = QuizDto,
    responses(
        (status = 201, description = "Quiz created", body = ApiResponse<Quiz>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only, or quiz limit reached", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto), fields(user_id = %auth_user.0.sub))]
pub async fn create_quiz(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<QuizDto>,
) -> Result<(StatusCode, Json<ApiResponse<Quiz>>), AppError> {
    let quiz = QuizService::create(&state.db, auth_user.user_id()?, dto, &client).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(quiz)))
}

#[utoipa::path(
    put,
    path = "/api/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = QuizDto,
    responses(
        (status = 200, description = "Quiz updated", body = ApiResponse<Quiz>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not owned", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto))]
pub async fn update_quiz(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<QuizDto>,
) -> Result<Json<ApiResponse<Quiz>>, AppError> {
    let quiz = QuizService::update(&state.db, id, auth_user.user_id()?, dto, &client).await?;
    Ok(ApiResponse::ok(quiz))
}

#[utoipa::path(
    delete,
    path = "/api/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not owned", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client))]
pub async fn delete_quiz(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    QuizService::delete(&state.db, id, auth_user.user_id()?, &client).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a quiz with its access code (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/quizzes/join/{code}",
    params(("code" = String, Path, description = "5-character access code")),
    responses(
        (status = 200, description = "Quiz with its questions, without answers", body = ApiResponse<JoinedQuiz>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "No quiz with this code", body = ErrorResponse)
    ),
    tag = "Quizzes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn join_quiz(
    State(state): State<AppState>,
    RequireEleve(_auth_user): RequireEleve,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<JoinedQuiz>>, AppError> {
    let quiz = QuizService::join(&state.db, &code).await?;
    Ok(ApiResponse::ok(quiz))
}
