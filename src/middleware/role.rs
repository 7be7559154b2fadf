//! Role-based authorization.
//!
//! Two ways to guard a route:
//! 1. Middleware with `axum::middleware::from_fn_with_state` (`require_admin`, ...),
//!    used for whole routers
//! 2. Extractors (`RequireProf`, `RequireEleve`, `RequireAdmin`) for single handlers

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use quizmaster_auth::UserRole;
use quizmaster_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Role requirement of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    /// Teachers, and admins who pass every teacher gate.
    Prof,
    /// Students only.
    Eleve,
    Admin,
}

impl RoleGate {
    pub fn allows(self, role: UserRole) -> bool {
        match self {
            RoleGate::Prof => role.can_teach(),
            RoleGate::Eleve => role == UserRole::Eleve,
            RoleGate::Admin => role == UserRole::Admin,
        }
    }

    fn denial_message(self) -> &'static str {
        match self {
            RoleGate::Prof => "Access restricted to teachers",
            RoleGate::Eleve => "Access restricted to students",
            RoleGate::Admin => "Access restricted to administrators",
        }
    }
}

pub fn check_gate(auth_user: &AuthUser, gate: RoleGate) -> Result<(), AppError> {
    if gate.allows(auth_user.role()) {
        Ok(())
    } else {
        Err(AppError::forbidden(gate.denial_message()))
    }
}

/// Authenticates the request and checks the gate before running `next`.
/// The authenticated user is left in the request extensions.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    gate: RoleGate,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_gate(&auth_user, gate)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_prof(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, RoleGate::Prof)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_eleve(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, RoleGate::Eleve)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, RoleGate::Admin)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// Declares an extractor that yields the `AuthUser` when the gate passes.
macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $gate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                check_gate(&auth_user, $gate)?;
                Ok($name(auth_user))
            }
        }
    };
}

role_extractor!(
    /// `prof` or `admin`.
    RequireProf,
    RoleGate::Prof
);
role_extractor!(
    /// `eleve` only.
    RequireEleve,
    RoleGate::Eleve
);
role_extractor!(RequireAdmin, RoleGate::Admin);
