// src/handlers/answer.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;

use crate::{
    error::AppError,
    models::{answer::SubmitAnswersRequest, ids::UserId},
    services::{answers, quizzes},
    store::SharedStore,
};

/// Records the user's answers for a quiz and marks it completed.
///
/// Resubmitting overwrites the previous answers. Returns 201 with the stored answer sheet.
pub async fn submit_answers(
    State(store): State<SharedStore>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: SubmitAnswersRequest = serde_json::from_value(body)?;

    let user_id = payload.user_id.as_deref().filter(|id| !id.trim().is_empty());
    let (Some(user_id), Some(quiz_ref), Some(answers @ Value::Array(_))) =
        (user_id, payload.quiz_id.as_ref(), payload.answers)
    else {
        return Err(AppError::InvalidRequest("Invalid data".to_string()));
    };
    let user_id = UserId::parse(Some(user_id))?;
    let quiz_id = quiz_ref
        .resolve()
        .ok_or(AppError::NotFound(quizzes::QUIZ_NOT_FOUND.to_string()))?;

    let answers: Vec<String> = serde_json::from_value(answers)?;

    let answer = answers::submit(store.as_ref(), &user_id, quiz_id, answers).await?;

    Ok((StatusCode::CREATED, Json(answer)))
}
