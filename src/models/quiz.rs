// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::ids::{QuizId, UserId};

/// A single question inside a quiz.
///
/// Question authoring happens elsewhere, so fields beyond the ones scoring
/// needs (e.g. `options`) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,

    /// The expected answer, kept as authored. Only a string can ever match
    /// a submitted answer, and only verbatim.
    pub answer: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Question {
    pub fn new(question: impl Into<String>, answer: impl Into<Value>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            explanation: None,
            extra: Map::new(),
        }
    }
}

/// Represents a document in the `quizzes` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,

    /// Owner. Every lookup filters on it together with `id`.
    pub user_id: UserId,

    pub title: String,
    pub description: String,
    pub level: String,
    pub questions: Vec<Question>,

    /// Flips to `true` on the first answer submission and stays there.
    #[serde(default)]
    pub is_completed: bool,

    pub created_at: DateTime<Utc>,
}

/// Document written on quiz creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz<'a> {
    pub user_id: &'a UserId,
    pub title: &'a str,
    pub description: &'a str,
    pub level: &'a str,
    pub questions: &'a [Question],
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Caller-provided quiz content, already validated.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    pub title: String,
    pub description: String,
    pub level: String,
    pub questions: Vec<Question>,
}

/// DTO for `POST /quizzes`.
///
/// `questions` stays a raw JSON value so that a non-array can be reported
/// as a bad request instead of a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub user_id: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 2000, message = "description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "level is required"))]
    pub level: String,

    pub questions: Option<Value>,
}
