// src/routes.rs

use axum::{Router, routing::{get, post}};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer, quiz, user},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the user, quiz, answer and review routes.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (document store, config).
pub fn create_router(state: AppState) -> Router {
    // Any origin may call the API; there is no credentialed access to protect.
    let cors = CorsLayer::permissive();

    let quiz_routes = Router::new()
        .route("/quizzes", post(quiz::create_quiz).get(quiz::list_quizzes))
        .route("/quizzes/{user_id}/{quiz_id}", get(quiz::get_quiz))
        .route("/quizzes/review/{user_id}/{quiz_id}", get(quiz::review_quiz));

    Router::new()
        .route("/", get(home))
        .route("/user", get(user::resolve_user))
        .route("/answers", post(answer::submit_answers))
        .merge(quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn home() -> &'static str {
    "Home"
}
