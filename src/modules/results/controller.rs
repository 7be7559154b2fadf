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

use super::model::{AnswerDetail, CreateResultDto, MyResult, QuizResult, QuizResultEntry};
use super::service::ResultService;

/// Submit the score of a played quiz
#[utoipa::path(
    post,
    path = "/api/results",
    request_body = CreateResultDto,
    responses(
        (status = 201, description = "Result recorded", body = ApiResponse<QuizResult>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse)
    ),
    tag = "Results",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto), fields(user_id = %auth_user.0.sub))]
pub async fn create_result(
    State(state): State<AppState>,
    RequireEleve(auth_user): RequireEleve,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<CreateResultDto>,
) -> Result<(StatusCode, Json<ApiResponse<QuizResult>>), AppError> {
    let result = ResultService::create(&state.db, auth_user.user_id()?, dto, &client).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(result)))
}

/// The caller's results, newest first
#[utoipa::path(
    get,
    path = "/api/results/me",
    responses(
        (status = 200, description = "Own results", body = ApiResponse<Vec<MyResult>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse)
    ),
    tag = "Results",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn my_results(
    State(state): State<AppState>,
    RequireEleve(auth_user): RequireEleve,
) -> Result<Json<ApiResponse<Vec<MyResult>>>, AppError> {
    let results = ResultService::for_student(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(results))
}

/// Results of an owned quiz
#[utoipa::path(
    get,
    path = "/api/results/quiz/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Results with student emails", body = ApiResponse<Vec<QuizResultEntry>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Quiz not found or not owned", body = ErrorResponse)
    ),
    tag = "Results",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn quiz_results(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<QuizResultEntry>>>, AppError> {
    let results = ResultService::for_quiz(&state.db, quiz_id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(results))
}

/// Answers given in a result of an owned quiz
#[utoipa::path(
    get,
    path = "/api/results/{result_id}/answers",
    params(("result_id" = Uuid, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Answers with the expected answer", body = ApiResponse<Vec<AnswerDetail>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Result not found or quiz not owned", body = ErrorResponse)
    ),
    tag = "Results",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn result_answers(
    State(state): State<AppState>,
    RequireProf(auth_user): RequireProf,
    Path(result_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AnswerDetail>>>, AppError> {
    let answers = ResultService::answers(&state.db, result_id, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(answers))
}
