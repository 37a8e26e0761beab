// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        ids::{QuizId, UserId},
        quiz::{CreateQuizRequest, Question, QuizDraft},
        user::UserQuery,
    },
    services::{quizzes, scoring},
    store::SharedStore,
};

/// Parses a quiz id path segment. Anything unparsable cannot name a quiz.
pub(crate) fn parse_quiz_id(raw: &str) -> Result<QuizId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(quizzes::QUIZ_NOT_FOUND.to_string()))
}

/// Creates a quiz for an existing user.
///
/// * `userId` and an array of `questions` are required.
/// * `title`, `description` and `level` must be non-empty.
/// * Returns 403 once the user's plan quota is used up.
pub async fn create_quiz(
    State(store): State<SharedStore>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: CreateQuizRequest = serde_json::from_value(body)?;

    let user_id = payload.user_id.as_deref().filter(|id| !id.trim().is_empty());
    let (Some(user_id), Some(questions @ Value::Array(_))) = (user_id, &payload.questions) else {
        return Err(AppError::InvalidRequest("Invalid data".to_string()));
    };
    let user_id = UserId::parse(Some(user_id))?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::InvalidRequest(validation_errors.to_string()));
    }

    let questions: Vec<Question> = serde_json::from_value(questions.clone())?;

    let draft = QuizDraft {
        title: payload.title,
        description: payload.description,
        level: payload.level,
        questions,
    };
    let quiz = quizzes::create(store.as_ref(), &user_id, draft).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Lists every quiz owned by `?userId=`.
pub async fn list_quizzes(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;

    let quizzes = quizzes::list_by_user(store.as_ref(), &user_id).await?;

    Ok(Json(quizzes))
}

/// Fetches a single quiz, only for its owner.
pub async fn get_quiz(
    State(store): State<SharedStore>,
    Path((user_id, quiz_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(Some(&user_id))?;
    let quiz_id = parse_quiz_id(&quiz_id)?;

    let quiz = quizzes::get_owned(store.as_ref(), &user_id, quiz_id).await?;

    Ok(Json(quiz))
}

/// Scores the user's submitted answers against the quiz.
///
/// Returns per-question results plus `totalScore`, the number answered correctly.
pub async fn review_quiz(
    State(store): State<SharedStore>,
    Path((user_id, quiz_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(Some(&user_id))?;
    let quiz_id = parse_quiz_id(&quiz_id)?;

    let report = scoring::review(store.as_ref(), &user_id, quiz_id).await?;

    Ok(Json(report))
}
