// src/services/quizzes.rs

use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    models::{
        ids::{QuizId, UserId},
        quiz::{NewQuiz, Quiz, QuizDraft},
    },
    services::{identity, quota},
    store::{Collection, Document, DocumentStore, Filter, encode},
};

pub const QUIZ_NOT_FOUND: &str = "Quiz not found or user is not responsible for this quiz";

fn owned_by(user_id: &UserId) -> Filter {
    Filter::new().eq("userId", user_id.as_str())
}

fn owned(user_id: &UserId, quiz_id: QuizId) -> Filter {
    owned_by(user_id).id(quiz_id.get())
}

/// Creates a quiz for an existing user, subject to their plan's quota.
///
/// * Fails with `NotFound` if the user has never been resolved.
/// * Fails with `QuotaExceeded` once the user owns as many quizzes as the plan allows.
pub async fn create(
    store: &dyn DocumentStore,
    user_id: &UserId,
    draft: QuizDraft,
) -> Result<Quiz, AppError> {
    let user = identity::find(store, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Count and insert are separate writes; a concurrent create may slip
    // past the limit by one.
    let existing = store.count(Collection::Quizzes, &owned_by(user_id)).await?;
    if !quota::can_create(user.plan, existing) {
        let limit = quota::quiz_limit(user.plan);
        tracing::warn!(
            "User {} on {} plan hit the quiz limit ({})",
            user_id,
            user.plan,
            limit
        );
        return Err(AppError::QuotaExceeded {
            plan: user.plan,
            limit,
        });
    }

    let doc = encode(&NewQuiz {
        user_id,
        title: &draft.title,
        description: &draft.description,
        level: &draft.level,
        questions: &draft.questions,
        is_completed: false,
        created_at: Utc::now(),
    })?;
    let id = store.insert(Collection::Quizzes, doc.clone()).await?;

    tracing::info!("User {} created quiz {}", user_id, id);

    Ok(Document::new(id, doc).decode::<Quiz>()?)
}

/// Every quiz owned by `user_id`, in storage order.
pub async fn list_by_user(
    store: &dyn DocumentStore,
    user_id: &UserId,
) -> Result<Vec<Quiz>, AppError> {
    let docs = store.find(Collection::Quizzes, &owned_by(user_id)).await?;

    docs.into_iter()
        .map(|doc| doc.decode::<Quiz>().map_err(AppError::from))
        .collect()
}

/// Fetches a quiz only if `user_id` owns it.
///
/// A quiz owned by someone else is reported exactly like a missing one.
pub async fn get_owned(
    store: &dyn DocumentStore,
    user_id: &UserId,
    quiz_id: QuizId,
) -> Result<Quiz, AppError> {
    store
        .find_one(Collection::Quizzes, &owned(user_id, quiz_id))
        .await?
        .ok_or(AppError::NotFound(QUIZ_NOT_FOUND.to_string()))?
        .decode::<Quiz>()
        .map_err(AppError::from)
}

/// Sets `isCompleted`. Idempotent.
///
/// The owner is part of the write's filter, so the ownership check and the
/// flag update are one conditional write.
pub async fn mark_completed(
    store: &dyn DocumentStore,
    user_id: &UserId,
    quiz_id: QuizId,
) -> Result<(), AppError> {
    let mut patch = Map::new();
    patch.insert("isCompleted".to_string(), Value::Bool(true));

    let touched = store
        .update(Collection::Quizzes, &owned(user_id, quiz_id), patch)
        .await?;
    if touched == 0 {
        return Err(AppError::NotFound(QUIZ_NOT_FOUND.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::quiz::Question, store::MemoryStore};
    use serde_json::json;

    fn uid(raw: &str) -> UserId {
        UserId::parse(Some(raw)).unwrap()
    }

    fn draft(title: &str) -> QuizDraft {
        QuizDraft {
            title: title.to_string(),
            description: "arithmetic".to_string(),
            level: "easy".to_string(),
            questions: vec![Question::new("2+2?", "4")],
        }
    }

    async fn premium(store: &MemoryStore, raw: &str) {
        let (user, _) = identity::resolve(store, &uid(raw)).await.unwrap();
        let mut patch = Map::new();
        patch.insert("plan".to_string(), json!("premium"));
        store
            .update(Collection::Users, &Filter::by_id(user.id), patch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_requires_known_user() {
        let store = MemoryStore::new();
        let err = create(&store, &uid("nobody"), draft("q")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "User not found"));
    }

    #[tokio::test]
    async fn free_user_is_capped_at_five() {
        let store = MemoryStore::new();
        let u1 = uid("u1");
        identity::resolve(&store, &u1).await.unwrap();

        for n in 0..5 {
            let quiz = create(&store, &u1, draft(&format!("quiz {}", n))).await.unwrap();
            assert!(!quiz.is_completed);
            assert_eq!(quiz.user_id, u1);
        }

        let err = create(&store, &u1, draft("sixth")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::QuotaExceeded { plan: crate::models::user::Plan::Free, limit: 5 }
        ));
        assert_eq!(list_by_user(&store, &u1).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn premium_user_is_capped_at_ten() {
        let store = MemoryStore::new();
        premium(&store, "p1").await;
        let p1 = uid("p1");

        for n in 0..10 {
            create(&store, &p1, draft(&format!("quiz {}", n))).await.unwrap();
        }
        let err = create(&store, &p1, draft("eleventh")).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { limit: 10, .. }));
    }

    #[tokio::test]
    async fn quota_counts_only_own_quizzes() {
        let store = MemoryStore::new();
        let (a, b) = (uid("a"), uid("b"));
        identity::resolve(&store, &a).await.unwrap();
        identity::resolve(&store, &b).await.unwrap();

        for n in 0..5 {
            create(&store, &a, draft(&format!("a{}", n))).await.unwrap();
        }
        create(&store, &b, draft("b0")).await.unwrap();

        assert_eq!(list_by_user(&store, &b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_owned_hides_other_users_quizzes() {
        let store = MemoryStore::new();
        let (owner, other) = (uid("owner"), uid("other"));
        identity::resolve(&store, &owner).await.unwrap();
        let quiz = create(&store, &owner, draft("mine")).await.unwrap();

        let found = get_owned(&store, &owner, quiz.id).await.unwrap();
        assert_eq!(found.title, "mine");
        assert_eq!(found.questions, vec![Question::new("2+2?", "4")]);

        let err = get_owned(&store, &other, quiz.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == QUIZ_NOT_FOUND));

        let err = get_owned(&store, &owner, QuizId::new(9_999)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn mark_completed_is_idempotent() {
        let store = MemoryStore::new();
        let owner = uid("owner");
        identity::resolve(&store, &owner).await.unwrap();
        let quiz = create(&store, &owner, draft("q")).await.unwrap();

        mark_completed(&store, &owner, quiz.id).await.unwrap();
        mark_completed(&store, &owner, quiz.id).await.unwrap();

        assert!(get_owned(&store, &owner, quiz.id).await.unwrap().is_completed);
        assert!(
            mark_completed(&store, &uid("intruder"), quiz.id)
                .await
                .is_err()
        );
    }
}
