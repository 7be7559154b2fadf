use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use quizmaster_auth::{Claims, UserRole, verify_token};
use quizmaster_core::AppError;

use crate::state::AppState;

/// The verified claims of the caller's access token.
///
/// Role middleware stores the extracted user in the request extensions, so
/// handlers behind a gate reuse it instead of decoding the token twice.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::unauthorized("Missing authentication token")
                    } else {
                        AppError::unauthorized("Invalid authorization header format")
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;
        let user = AuthUser(claims);
        parts.extensions.insert(user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: String, role: UserRole) -> Claims {
        Claims {
            sub,
            email: "test@example.com".to_string(),
            role,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let auth_user = AuthUser(claims(user_id.to_string(), UserRole::Prof));

        assert_eq!(auth_user.user_id().unwrap(), user_id);
        assert_eq!(auth_user.role(), UserRole::Prof);
        assert_eq!(auth_user.email(), "test@example.com");
    }

    #[test]
    fn test_invalid_user_id_is_unauthorized() {
        let auth_user = AuthUser(claims("42".to_string(), UserRole::Eleve));
        let err = auth_user.user_id().unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }
}
