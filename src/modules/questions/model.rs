use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use quizmaster_core::AppError;

use crate::validator::validation_error;

/// Longest option accepted; the correct answer is stored in a `VARCHAR(255)`.
pub const MAX_OPTION_LENGTH: usize = 255;

/// Stored in the `question_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Multiple choice, four options.
    Qcm,
    /// True or false, two options.
    Vf,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Qcm => "qcm",
            QuestionType::Vf => "vf",
        }
    }

    pub fn option_count(&self) -> usize {
        match self {
            QuestionType::Qcm => 4,
            QuestionType::Vf => 2,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qcm" => Ok(QuestionType::Qcm),
            "vf" => Ok(QuestionType::Vf),
            other => Err(format!("unknown question type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: QuestionType,
    pub question_text: String,
    #[schema(value_type = Vec<String>)]
    pub options: Json<Vec<String>>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
}

/// A question without its answer, as served to students joining a quiz.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PublicQuestion {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: QuestionType,
    pub question_text: String,
    #[schema(value_type = Vec<String>)]
    pub options: Json<Vec<String>>,
}

/// Ownership probe used before mutating a question.
#[derive(Debug, FromRow)]
pub(crate) struct QuestionOwner {
    pub quiz_id: Uuid,
    pub owner_id: Uuid,
}

fn validate_question_type(kind: &str) -> Result<(), ValidationError> {
    QuestionType::from_str(kind)
        .map(|_| ())
        .map_err(|_| validation_error("type", "Type must be \"qcm\" or \"vf\""))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionDto {
    pub quiz_id: Uuid,
    /// `qcm` or `vf`
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_question_type"))]
    #[schema(example = "qcm")]
    pub kind: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Question text must be between 10 and 500 characters"
    ))]
    #[schema(example = "What is the capital of France?")]
    pub question_text: String,
    /// Exactly 4 entries for `qcm`, 2 for `vf`
    #[schema(example = json!(["Paris", "Lyon", "Marseille", "Lille"]))]
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    #[schema(example = "Paris")]
    pub correct_answer: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionDto {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_question_type"))]
    #[schema(example = "vf")]
    pub kind: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Question text must be between 10 and 500 characters"
    ))]
    pub question_text: String,
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    pub correct_answer: String,
}

/// Question content after the checks that span several fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContent {
    pub kind: QuestionType,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionContent {
    /// The option count must match the type and the correct answer must be
    /// one of the options.
    pub fn parse(
        kind: &str,
        question_text: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Result<Self, AppError> {
        let kind = QuestionType::from_str(kind)
            .map_err(|_| AppError::validation("type", "Type must be \"qcm\" or \"vf\""))?;

        if options.len() != kind.option_count() {
            let message = match kind {
                QuestionType::Qcm => "A multiple-choice question must have exactly 4 options",
                QuestionType::Vf => "A true/false question must have exactly 2 options",
            };
            return Err(AppError::validation("options", message));
        }

        if options.iter().any(|option| option.trim().is_empty()) {
            return Err(AppError::validation("options", "Options must not be empty"));
        }

        if options
            .iter()
            .any(|option| option.chars().count() > MAX_OPTION_LENGTH)
        {
            return Err(AppError::validation(
                "options",
                "Options must be at most 255 characters",
            ));
        }

        if !options.contains(&correct_answer) {
            return Err(AppError::validation(
                "correct_answer",
                "Correct answer must be one of the options",
            ));
        }

        Ok(Self {
            kind,
            question_text,
            options,
            correct_answer,
        })
    }
}

impl TryFrom<CreateQuestionDto> for QuestionContent {
    type Error = AppError;

    fn try_from(dto: CreateQuestionDto) -> Result<Self, Self::Error> {
        Self::parse(&dto.kind, dto.question_text, dto.options, dto.correct_answer)
    }
}

impl TryFrom<UpdateQuestionDto> for QuestionContent {
    type Error = AppError;

    fn try_from(dto: UpdateQuestionDto) -> Result<Self, Self::Error> {
        Self::parse(&dto.kind, dto.question_text, dto.options, dto.correct_answer)
    }
}
