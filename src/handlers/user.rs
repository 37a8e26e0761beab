// src/handlers/user.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{ids::UserId, user::UserQuery},
    services::identity,
    store::SharedStore,
};

/// Returns the user for `?userId=`, creating it on first sight.
///
/// Responds 201 Created when the record is new, 200 otherwise.
pub async fn resolve_user(
    State(store): State<SharedStore>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;

    let (user, created) = identity::resolve(store.as_ref(), &user_id).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}
