//! Application error type.
//!
//! Every handler returns `Result<_, AppError>`. The error carries an HTTP
//! status, a stable machine-readable `code`, an optional offending `field`
//! and the underlying [`anyhow::Error`]. It renders as:
//!
//! ```json
//! { "success": false, "error": { "code": "NOT_FOUND", "message": "Quiz not found" } }
//! ```
//!
//! Server errors are logged and replaced with a generic message so that
//! database details never reach the client.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const AUTH_ERROR: &str = "AUTH_ERROR";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub field: Option<String>,
    pub error: Error,
}

/// Error payload as documented in the OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error envelope as documented in the OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

fn default_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => codes::VALIDATION_ERROR,
        StatusCode::UNAUTHORIZED => codes::AUTH_ERROR,
        StatusCode::FORBIDDEN => codes::FORBIDDEN,
        StatusCode::NOT_FOUND => codes::NOT_FOUND,
        StatusCode::CONFLICT => codes::CONFLICT,
        StatusCode::TOO_MANY_REQUESTS => codes::RATE_LIMITED,
        _ => codes::INTERNAL_ERROR,
    }
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code: default_code(status),
            field: None,
            error: err.into(),
        }
    }

    /// Overrides the error code derived from the status.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    /// Attaches the name of the request field that caused the error.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            anyhow::anyhow!(message.into()),
        )
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// A 400 `VALIDATION_ERROR` pointing at a specific request field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, anyhow::anyhow!(message.into())).with_field(field)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    /// The message sent to the client.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = ?self.error, status = %self.status, "Request failed");
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.public_message(),
                field: self.field,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_default_codes_follow_status() {
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("x")).code,
            codes::NOT_FOUND
        );
        assert_eq!(AppError::forbidden("x").code, codes::FORBIDDEN);
        assert_eq!(AppError::unauthorized("x").code, codes::AUTH_ERROR);
        assert_eq!(
            AppError::conflict(anyhow::anyhow!("x")).code,
            codes::CONFLICT
        );
        assert_eq!(
            AppError::bad_request(anyhow::anyhow!("x")).code,
            codes::VALIDATION_ERROR
        );
        assert_eq!(AppError::internal_error("x").code, codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_with_code_overrides() {
        let err = AppError::bad_request(anyhow::anyhow!("bad json")).with_code(codes::INVALID_JSON);
        assert_eq!(err.code, codes::INVALID_JSON);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_error_body_includes_field() {
        let (status, body) = body_json(AppError::validation("email", "Email is required")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Email is required");
        assert_eq!(body["error"]["field"], "email");
    }

    #[tokio::test]
    async fn test_field_omitted_when_absent() {
        let (_, body) = body_json(AppError::forbidden("nope")).await;
        assert!(body["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            body_json(AppError::internal(anyhow::anyhow!("relation \"users\" does not exist"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
