//! User roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role, stored in the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Teacher: owns quizzes and questions.
    Prof,
    /// Student: joins quizzes and submits results.
    Eleve,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Prof => "prof",
            UserRole::Eleve => "eleve",
            UserRole::Admin => "admin",
        }
    }

    /// Admins pass every teacher gate.
    pub fn can_teach(&self) -> bool {
        matches!(self, UserRole::Prof | UserRole::Admin)
    }

    /// Roles a visitor may pick when registering.
    pub fn is_self_registrable(&self) -> bool {
        matches!(self, UserRole::Prof | UserRole::Eleve)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prof" => Ok(UserRole::Prof),
            "eleve" => Ok(UserRole::Eleve),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
