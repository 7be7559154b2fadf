//! Request extractors that reject with the standard error envelope.
//!
//! - `ValidatedJson`: JSON body extraction followed by `validator` checks.
//!   Syntax errors use `INVALID_JSON`; missing or mistyped fields and rule
//!   violations use `VALIDATION_ERROR` with the offending `field`.
//! - `Path` and `Query`: drop-in replacements for the axum extractors whose
//!   parse failures become a `400 VALIDATION_ERROR` naming the parameter.

use std::borrow::Cow;

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Request,
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use quizmaster_core::AppError;
use quizmaster_core::errors::codes;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";
const QUERY_ERROR_PREFIX: &str = "Failed to deserialize query string: ";

/// First failing field (alphabetical, so the answer is stable) and its message.
fn first_error(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errors)| {
            errors.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ("body".to_string(), "Invalid request body".to_string()))
}

/// Maps a JSON rejection to the error envelope.
pub fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => {
            AppError::bad_request(anyhow!("Invalid JSON format")).with_code(codes::INVALID_JSON)
        }
        JsonRejection::MissingJsonContentType(_) => AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ))
        .with_code(codes::INVALID_JSON),
        JsonRejection::JsonDataError(err) => data_error(&err.body_text()),
        other => AppError::bad_request(anyhow!("Invalid request body: {}", other.body_text())),
    }
}

fn data_error(text: &str) -> AppError {
    field_error(text, DATA_ERROR_PREFIX)
        .unwrap_or_else(|| AppError::bad_request(anyhow!("Invalid field type in request")))
}

/// Maps a serde error message to the field it names, if any.
fn field_error(text: &str, prefix: &str) -> Option<AppError> {
    if let Some(field) = text
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return Some(AppError::validation(field, format!("{} is required", field)));
    }

    // "<path>: invalid type: ..." when the error is tied to a field
    let detail = text.strip_prefix(prefix).unwrap_or(text);
    match detail.split_once(": ") {
        Some((path, _)) if !path.is_empty() && !path.contains(' ') => Some(
            AppError::validation(path, format!("Invalid value for {}", path)),
        ),
        _ => None,
    }
}

/// Maps a path rejection to the error envelope.
pub fn path_rejection_to_error(rejection: PathRejection) -> AppError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => match err.into_kind() {
            ErrorKind::ParseErrorAtKey { key, .. }
            | ErrorKind::DeserializeError { key, .. }
            | ErrorKind::InvalidUtf8InPathParam { key } => {
                AppError::validation(&key, format!("Invalid value for {}", key))
            }
            ErrorKind::UnsupportedType { name } => {
                AppError::internal_error(format!("Unsupported path parameter type: {}", name))
            }
            _ => AppError::bad_request(anyhow!("Invalid URL parameter")),
        },
        other => AppError::internal_error(other.body_text()),
    }
}

/// Maps a query-string rejection to the error envelope.
pub fn query_rejection_to_error(rejection: QueryRejection) -> AppError {
    let text = rejection.body_text();
    field_error(&text, QUERY_ERROR_PREFIX)
        .unwrap_or_else(|| AppError::bad_request(anyhow!("Invalid query string")))
}

/// `axum::extract::Path` rejecting with the error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection_to_error)?;
        Ok(Path(value))
    }
}

/// `axum::extract::Query` rejecting with the error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(query_rejection_to_error)?;
        Ok(Query(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection_to_error)?;

        validate_dto(&value)?;

        Ok(ValidatedJson(value))
    }
}

/// Runs the `validator` rules of `value`, reporting the first failure.
pub fn validate_dto<T: Validate>(value: &T) -> Result<(), AppError> {
    value.validate().map_err(|errors| {
        let (field, message) = first_error(&errors);
        AppError::validation(&field, message)
    })
}

/// Builds a `ValidationError` with a human-readable message.
pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(validation_error(
            "password_length",
            "Password must be at least 8 characters long",
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(validation_error(
            "password_strength",
            "Password must contain an uppercase letter, a lowercase letter and a digit",
        ));
    }
    Ok(())
}
