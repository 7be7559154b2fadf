use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use quizmaster_core::errors::ErrorResponse;
use quizmaster_core::{ApiResponse, AppError, MessageResponse};

use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::modules::activity_logs::model::{LogFilters, LogStats, PaginatedLogs};
use crate::state::AppState;
use crate::validator::{Path, Query, ValidatedJson};

use super::model::{
    CreateUserDto, CreatedUser, Dashboard, PaginatedUsers, UpdateUserDto, UpdateUserResponse,
    UserDetail, UserFilters,
};
use super::service::AdminService;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Platform statistics", body = ApiResponse<Dashboard>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client), fields(admin_id = %auth_user.0.sub))]
pub async fn dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
) -> Result<Json<ApiResponse<Dashboard>>, AppError> {
    let dashboard = AdminService::dashboard(&state.db, auth_user.user_id()?, &client).await?;
    Ok(ApiResponse::ok(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserFilters),
    responses(
        (status = 200, description = "Paginated accounts", body = ApiResponse<PaginatedUsers>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client))]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<PaginatedUsers>>, AppError> {
    let users =
        AdminService::list_users(&state.db, auth_user.user_id()?, &filters, &client).await?;
    Ok(ApiResponse::ok(users))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<CreatedUser>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedUser>>), AppError> {
    let user = AdminService::create_user(&state.db, auth_user.user_id()?, dto, &client).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(user)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account with its quizzes, results, payments and logs", body = ApiResponse<UserDetail>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let detail = AdminService::user_detail(&state.db, id).await?;
    Ok(ApiResponse::ok(detail))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Applied changes", body = ApiResponse<UpdateUserResponse>),
        (status = 400, description = "Validation error or nothing to change", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only, or self demotion/deactivation", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UpdateUserResponse>>, AppError> {
    let response =
        AdminService::update_user(&state.db, auth_user.user_id()?, id, dto, &client).await?;
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deleted", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only, or own account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    AdminService::delete_user(&state.db, auth_user.user_id()?, id, &client).await?;
    Ok(ApiResponse::ok(MessageResponse::new("User deleted")))
}

#[utoipa::path(
    get,
    path = "/api/admin/logs",
    params(LogFilters),
    responses(
        (status = 200, description = "Paginated audit log", body = ApiResponse<PaginatedLogs>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client))]
pub async fn list_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Query(filters): Query<LogFilters>,
) -> Result<Json<ApiResponse<PaginatedLogs>>, AppError> {
    let logs = AdminService::logs(&state.db, auth_user.user_id()?, &filters, &client).await?;
    Ok(ApiResponse::ok(logs))
}

#[utoipa::path(
    get,
    path = "/api/admin/logs/stats",
    responses(
        (status = 200, description = "Audit log statistics", body = ApiResponse<LogStats>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrators only", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn log_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LogStats>>, AppError> {
    let stats = AdminService::log_stats(&state.db).await?;
    Ok(ApiResponse::ok(stats))
}
