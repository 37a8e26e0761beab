// src/services/scoring.rs

use crate::{
    error::AppError,
    models::{
        ids::{QuizId, UserId},
        quiz::Question,
        review::{QuestionResult, ReviewReport},
    },
    services::{answers, quizzes},
    store::DocumentStore,
};

/// Grades `answers` against `questions` by position.
///
/// The question list drives the walk: surplus answers are ignored and
/// missing ones count as wrong. Comparison is exact, with no trimming or
/// case folding. Returns the per-question results and the number correct.
pub fn grade(questions: &[Question], answers: &[String]) -> (Vec<QuestionResult>, u32) {
    let mut total_score = 0;

    let results = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = answers.get(index);
            let is_correct = user_answer
                .is_some_and(|given| question.answer.as_str() == Some(given.as_str()));
            if is_correct {
                total_score += 1;
            }
            QuestionResult {
                question: question.question.clone(),
                user_answer: user_answer.cloned(),
                correct_answer: question.answer.clone(),
                explanation: question.explanation.clone(),
                is_correct,
            }
        })
        .collect();

    (results, total_score)
}

/// Builds the scored review for a quiz the user owns and has answered.
pub async fn review(
    store: &dyn DocumentStore,
    user_id: &UserId,
    quiz_id: QuizId,
) -> Result<ReviewReport, AppError> {
    let quiz = quizzes::get_owned(store, user_id, quiz_id).await?;

    let sheet = answers::find(store, user_id, quiz_id)
        .await?
        .ok_or(AppError::NotFound(answers::ANSWERS_NOT_FOUND.to_string()))?;

    let (questions, total_score) = grade(&quiz.questions, &sheet.answers);

    tracing::debug!(
        "Reviewed quiz {} for {}: {}/{}",
        quiz_id,
        user_id,
        total_score,
        questions.len()
    );

    Ok(ReviewReport {
        title: quiz.title,
        description: quiz.description,
        level: quiz.level,
        created_at: quiz.created_at,
        questions,
        total_score,
    })
}
