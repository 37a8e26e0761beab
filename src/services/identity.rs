// src/services/identity.rs

use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        ids::UserId,
        user::{NewUser, Plan, User},
    },
    store::{Collection, DocumentStore, Filter, encode},
};

fn by_user_id(user_id: &UserId) -> Filter {
    Filter::new().eq("userId", user_id.as_str())
}

/// Looks up a user without creating one.
pub async fn find(store: &dyn DocumentStore, user_id: &UserId) -> Result<Option<User>, AppError> {
    let doc = store.find_one(Collection::Users, &by_user_id(user_id)).await?;
    Ok(doc.map(|doc| doc.decode::<User>()).transpose()?)
}

/// Returns the user for `user_id`, creating a `free` one on first sight.
///
/// The boolean is `true` when the record was created by this call. Lookup
/// and creation are one store operation, so concurrent first requests for
/// the same id end up with a single record.
pub async fn resolve(
    store: &dyn DocumentStore,
    user_id: &UserId,
) -> Result<(User, bool), AppError> {
    let seed = encode(&NewUser {
        user_id,
        plan: Plan::default(),
        created_at: Utc::now(),
    })?;

    let (doc, created) = store
        .find_or_insert(Collection::Users, &by_user_id(user_id), seed)
        .await?;

    if created {
        tracing::info!("Created user {}", user_id);
    }

    Ok((doc.decode()?, created))
}
