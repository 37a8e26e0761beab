// tests/review_tests.rs

use quizbook::{config::Config, routes, state::AppState, store::MemoryStore};
use serde_json::{Value, json};
use std::sync::Arc;

async fn spawn_app() -> String {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config: Config::default(),
    };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a fresh user and gives them one two-question quiz.
/// Returns (user id, quiz id).
async fn seed_quiz(client: &reqwest::Client, address: &str) -> (String, i64) {
    let user_id = format!("r_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    client
        .get(&format!("{}/user", address))
        .query(&[("userId", user_id.as_str())])
        .send()
        .await
        .unwrap();

    let quiz: Value = client
        .post(&format!("{}/quizzes", address))
        .json(&json!({
            "userId": user_id,
            "title": "Warm-up",
            "description": "Two quick ones",
            "level": "beginner",
            "questions": [
                {"question": "2+2?", "answer": "4"},
                {"question": "Capital of France?", "answer": "Paris", "explanation": "Not Lyon."}
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    (user_id, quiz["id"].as_i64().expect("quiz id"))
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(&format!("{}/answers", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn test_review_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, quiz_id) = seed_quiz(&client, &address).await;
    let review_url = format!("{}/quizzes/review/{}/{}", address, user_id, quiz_id);

    // 1. Review before answering
    let early = client.get(&review_url).send().await.unwrap();
    assert_eq!(early.status().as_u16(), 404);
    let early: Value = early.json().await.unwrap();
    assert_eq!(early["error"], json!("Answers not found for this quiz"));

    // 2. Submit answers, one right and one wrong
    let submitted = submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": quiz_id, "answers": ["4", "Lyon"]}),
    )
    .await;
    assert_eq!(submitted.status().as_u16(), 201);
    let sheet: Value = submitted.json().await.unwrap();
    assert_eq!(sheet["answers"], json!(["4", "Lyon"]));
    assert_eq!(sheet["quizId"], json!(quiz_id));

    // 3. Quiz is now completed
    let quiz: Value = client
        .get(&format!("{}/quizzes/{}/{}", address, user_id, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["isCompleted"], json!(true));

    // 4. Review
    let review = client.get(&review_url).send().await.unwrap();
    assert_eq!(review.status().as_u16(), 200);
    let review: Value = review.json().await.unwrap();

    assert_eq!(review["title"], json!("Warm-up"));
    assert_eq!(review["level"], json!("beginner"));
    assert_eq!(review["createdAt"], quiz["createdAt"]);
    assert_eq!(review["totalScore"], json!(1));
    assert_eq!(
        review["questions"],
        json!([
            {"question": "2+2?", "userAnswer": "4", "correctAnswer": "4", "isCorrect": true},
            {
                "question": "Capital of France?",
                "userAnswer": "Lyon",
                "correctAnswer": "Paris",
                "explanation": "Not Lyon.",
                "isCorrect": false
            }
        ])
    );
}

#[tokio::test]
async fn test_resubmission_overwrites() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, quiz_id) = seed_quiz(&client, &address).await;

    let first: Value = submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": quiz_id, "answers": ["5", "Lyon"]}),
    )
    .await
    .json()
    .await
    .unwrap();

    // quizId may also arrive as a string
    let second: Value = submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": quiz_id.to_string(), "answers": ["4", "Paris"]}),
    )
    .await
    .json()
    .await
    .unwrap();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["answers"], json!(["4", "Paris"]));

    let review: Value = client
        .get(&format!("{}/quizzes/review/{}/{}", address, user_id, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(review["totalScore"], json!(2));
}

#[tokio::test]
async fn test_short_answer_list_scores_missing_as_wrong() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, quiz_id) = seed_quiz(&client, &address).await;

    let response = submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": quiz_id, "answers": ["4"]}),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    let review: Value = client
        .get(&format!("{}/quizzes/review/{}/{}", address, user_id, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(review["totalScore"], json!(1));
    assert!(review["questions"][1].get("userAnswer").is_none());
    assert_eq!(review["questions"][1]["isCorrect"], json!(false));
}

#[tokio::test]
async fn test_submit_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, quiz_id) = seed_quiz(&client, &address).await;

    let invalid = [
        json!({"quizId": quiz_id, "answers": []}),
        json!({"userId": user_id, "answers": []}),
        json!({"userId": user_id, "quizId": quiz_id}),
        json!({"userId": user_id, "quizId": quiz_id, "answers": "4"}),
        json!({"userId": user_id, "quizId": quiz_id, "answers": [4]}),
    ];
    for body in invalid {
        let response = submit(&client, &address, body.clone()).await;
        assert_eq!(response.status().as_u16(), 400, "body: {}", body);
    }

    // Someone else's quiz, or a quiz that cannot exist
    let stranger = submit(
        &client,
        &address,
        json!({"userId": "stranger", "quizId": quiz_id, "answers": ["4"]}),
    )
    .await;
    assert_eq!(stranger.status().as_u16(), 404);

    let bogus = submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": "zzz", "answers": ["4"]}),
    )
    .await;
    assert_eq!(bogus.status().as_u16(), 404);

    // Failed submissions leave the quiz untouched
    let quiz: Value = client
        .get(&format!("{}/quizzes/{}/{}", address, user_id, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["isCompleted"], json!(false));
}

#[tokio::test]
async fn test_review_hidden_from_other_users() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, quiz_id) = seed_quiz(&client, &address).await;

    submit(
        &client,
        &address,
        json!({"userId": user_id, "quizId": quiz_id, "answers": ["4", "Paris"]}),
    )
    .await;

    let response = client
        .get(&format!("{}/quizzes/review/someone_else/{}", address, quiz_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        json!("Quiz not found or user is not responsible for this quiz")
    );
}
