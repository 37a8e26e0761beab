// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Outcome for one question of a reviewed quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,

    /// Absent when fewer answers than questions were submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,

    pub correct_answer: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    pub is_correct: bool,
}

/// Scored review of a submitted quiz.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub title: String,
    pub description: String,
    pub level: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionResult>,
    pub total_score: u32,
}
