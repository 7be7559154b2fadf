use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quizmaster_core::errors::ErrorResponse;
use quizmaster_core::{ApiResponse, AppError};

use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::role::RequireProf;
use crate::state::AppState;
use crate::validator::{Path, ValidatedJson};

use super::model::{CreateQuestionDto, Question, QuestionContent, UpdateQuestionDto};
use super::service::QuestionService;

/// Questions of a quiz being played, answers included
#[utoipa::path(
    get,
    path = "/api/questions/play/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Questions with their correct answers", body = ApiResponse<Vec<Question>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    ),
    tag = "Questions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn play_questions(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Question>>>, AppError> {
    let questions = QuestionService::for_play(&state.db, quiz_id).await?;
    Ok(ApiResponse::ok(questions))
}

/// Questions of an owned quiz
#[utoipa::path(
    get,
    path = "/api/questions/quiz/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Questions", body = ApiResponse<Vec<Question>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not owned", body = ErrorResponse)
    ),
    tag = "Questions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn quiz_questions(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Question>>>, AppError> {
    let questions = QuestionService::for_owner(&state.db, quiz_id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(questions))
}

#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = CreateQuestionDto,
    responses(
        (status = 201, description = "Question created", body = ApiResponse<Question>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only, or quiz owned by someone else", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    ),
    tag = "Questions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto), fields(quiz_id = %dto.quiz_id))]
pub async fn create_question(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<CreateQuestionDto>,
) -> Result<(StatusCode, Json<ApiResponse<Question>>), AppError> {
    let quiz_id = dto.quiz_id;
    let content = QuestionContent::try_from(dto)?;
    let question =
        QuestionService::create(&state.db, auth_user.user_id()?, quiz_id, content, &client).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(question)))
}

#[utoipa::path(
    put,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = UpdateQuestionDto,
    responses(
        (status = 200, description = "Question updated", body = ApiResponse<Question>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only, or question owned by someone else", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    ),
    tag = "Questions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto))]
pub async fn update_question(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateQuestionDto>,
) -> Result<Json<ApiResponse<Question>>, AppError> {
    let content = QuestionContent::try_from(dto)?;
    let question =
        QuestionService::update(&state.db, id, auth_user.user_id()?, content, &client).await?;
    Ok(ApiResponse::ok(question))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only, or question owned by someone else", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse)
    ),
    tag = "Questions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client))]
pub async fn delete_question(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    QuestionService::delete(&state.db, id, auth_user.user_id()?, &client).await?;
    Ok(StatusCode::NO_CONTENT)
}
