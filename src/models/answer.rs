// src/models/answer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{AnswerId, QuizId, UserId};

/// Represents a document in the `answers` collection.
/// One per (user, quiz); resubmitting replaces `answers` in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub user_id: UserId,
    pub quiz_id: QuizId,

    /// One entry per question, matched by position.
    pub answers: Vec<String>,

    pub created_at: DateTime<Utc>,
}

/// Quiz reference as sent by clients: a number or its string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuizRef {
    Id(i64),
    Text(String),
}

impl QuizRef {
    /// `None` when the reference cannot name any quiz.
    pub fn resolve(&self) -> Option<QuizId> {
        match self {
            QuizRef::Id(id) => Some(QuizId::new(*id)),
            QuizRef::Text(text) => text.parse().ok(),
        }
    }
}

/// DTO for `POST /answers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    pub user_id: Option<String>,
    pub quiz_id: Option<QuizRef>,
    pub answers: Option<Value>,
}
