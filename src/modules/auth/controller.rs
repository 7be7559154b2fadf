use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use quizmaster_core::errors::ErrorResponse;
use quizmaster_core::{ApiResponse, AppError, MessageResponse};

use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{AuthResponse, LoginDto, RegisterDto, User};
use super::service::AuthService;

/// Create a `prof` or `eleve` account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, client, dto))]
pub async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let response = AuthService::register(&state.db, dto, &state.jwt_config, &client).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

/// Exchange credentials for a JWT
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Account deactivated", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, client, dto))]
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config, &client).await?;
    Ok(ApiResponse::ok(response))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = AuthService::get_user(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(user))
}

/// Log out. Tokens are stateless, the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, client), fields(user_id = %auth_user.0.sub))]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    AuthService::logout(&state.db, auth_user.user_id()?, &client).await;
    Ok(ApiResponse::ok(MessageResponse::new("Logged out successfully")))
}
