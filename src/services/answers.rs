// src/services/answers.rs

use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    models::{
        answer::Answer,
        ids::{QuizId, UserId},
    },
    services::quizzes,
    store::{Collection, DocumentStore, Filter},
};

pub const ANSWERS_NOT_FOUND: &str = "Answers not found for this quiz";

pub(crate) fn answer_sheet(user_id: &UserId, quiz_id: QuizId) -> Filter {
    Filter::new()
        .eq("userId", user_id.as_str())
        .eq("quizId", quiz_id.get())
}

/// Records `answers` for a quiz the user owns and marks the quiz completed.
///
/// Resubmitting replaces the previous answers; there is never more than one
/// answer sheet per (user, quiz). The answer count is not checked against
/// the question count.
pub async fn submit(
    store: &dyn DocumentStore,
    user_id: &UserId,
    quiz_id: QuizId,
    answers: Vec<String>,
) -> Result<Answer, AppError> {
    quizzes::get_owned(store, user_id, quiz_id).await?;

    let mut set = Map::new();
    set.insert(
        "answers".to_string(),
        Value::Array(answers.into_iter().map(Value::String).collect()),
    );
    let mut set_on_insert = Map::new();
    set_on_insert.insert(
        "createdAt".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );

    let doc = store
        .upsert(
            Collection::Answers,
            &answer_sheet(user_id, quiz_id),
            set,
            set_on_insert,
        )
        .await?;
    let answer: Answer = doc.decode()?;

    tracing::info!(
        "Recorded {} answers from {} for quiz {}",
        answer.answers.len(),
        user_id,
        quiz_id
    );

    // Not atomic with the upsert above. If this fails, resubmitting the same
    // answers finishes the job.
    quizzes::mark_completed(store, user_id, quiz_id).await?;

    Ok(answer)
}

/// The stored answer sheet for (user, quiz), if any.
pub async fn find(
    store: &dyn DocumentStore,
    user_id: &UserId,
    quiz_id: QuizId,
) -> Result<Option<Answer>, AppError> {
    let doc = store
        .find_one(Collection::Answers, &answer_sheet(user_id, quiz_id))
        .await?;
    Ok(doc.map(|doc| doc.decode::<Answer>()).transpose()?)
}
