mod common;

use axum::http::StatusCode;
use chesstrainer_api::storage::{FileStore, KeyValueStore};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_solving_hard_puzzle_awards_three_points() {
    let app = common::create_test_app();

    let (status, json) = common::post_json(
        &app,
        "/api/v1/attempts",
        json!({
            "puzzle_id": "LxQ2p",
            "puzzle_rating": 2100,
            "themes": ["mateIn2", "sacrifice"],
            "success": true,
            "time_spent_secs": 95
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["previous_rating"], 1200);
    assert_eq!(json["delta"], 3);
    assert_eq!(json["progress"]["rating"], 1203);
    assert_eq!(json["today"]["count"], 1);
    assert_eq!(json["today"]["solved"], 1);
    assert_eq!(json["today"]["time"], 95);
    assert_eq!(json["current_streak"], 1);
    assert_eq!(json["history_entry"]["puzzle_id"], "LxQ2p");
    assert_eq!(json["history_entry"]["theme"], "mateIn2");
}

#[tokio::test]
async fn test_failed_attempt_keeps_rating() {
    let app = common::create_test_app();

    let (status, json) = common::post_json(
        &app,
        "/api/v1/attempts",
        json!({
            "puzzle_id": "OFF04",
            "puzzle_rating": 1000,
            "success": false,
            "time_spent_secs": 30
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["delta"], 0);
    assert_eq!(json["progress"]["rating"], 1200);
    assert_eq!(json["today"]["failed"], 1);

    let (_, progress) = common::get_json(&app, "/api/v1/progress").await;
    assert_eq!(progress["rating"], 1200);
    assert_eq!(progress["solved_count"], 0);
    assert_eq!(progress["current_streak"], 1);
}

#[tokio::test]
async fn test_progress_activity_history_and_themes_after_attempts() {
    let app = common::create_test_app();

    for (id, rating, success) in [("a1", 1500, true), ("a2", 1700, true), ("a3", 900, false)] {
        let (status, _) = common::post_json(
            &app,
            "/api/v1/attempts",
            json!({
                "puzzle_id": id,
                "puzzle_rating": rating,
                "themes": ["fork"],
                "success": success,
                "time_spent_secs": 20
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, progress) = common::get_json(&app, "/api/v1/progress").await;
    assert_eq!(progress["rating"], 1203);
    assert_eq!(progress["solved_count"], 2);
    assert_eq!(progress["solved_puzzle_ids"], json!(["a1", "a2"]));

    let (_, activity) = common::get_json(&app, "/api/v1/activity?days=7").await;
    assert_eq!(activity["days"].as_array().unwrap().len(), 7);
    assert_eq!(activity["total_attempts"], 3);
    assert_eq!(activity["total_solved"], 2);
    assert_eq!(activity["total_time_secs"], 60);
    assert_eq!(activity["current_streak"], 1);
    let today = &activity["days"][6];
    assert_eq!(today["count"], 3);
    assert_eq!(today["failed"], 1);

    let (_, history) = common::get_json(&app, "/api/v1/history").await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["puzzle_id"], "a3");

    let (_, themes) = common::get_json(&app, "/api/v1/themes").await;
    assert_eq!(themes["fork"], 2);
}

#[tokio::test]
async fn test_attempt_validation_errors() {
    let app = common::create_test_app();

    let (status, json) = common::post_json(
        &app,
        "/api/v1/attempts",
        json!({
            "puzzle_id": "",
            "puzzle_rating": 1500,
            "success": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], 422);

    let (status, _) = common::post_json(
        &app,
        "/api/v1/attempts",
        json!({
            "puzzle_id": "abc",
            "puzzle_rating": 9000,
            "success": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = common::post_json(
        &app,
        "/api/v1/attempts",
        json!({ "puzzle_id": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);

    let (_, progress) = common::get_json(&app, "/api/v1/progress").await;
    assert_eq!(progress["rating"], 1200);
}

#[tokio::test]
async fn test_attempts_emit_notifications() {
    let app = common::create_test_app();

    common::post_json(
        &app,
        "/api/v1/attempts",
        json!({
            "puzzle_id": "n1",
            "puzzle_rating": 1650,
            "success": true,
            "time_spent_secs": 12
        }),
    )
    .await;

    let (status, json) = common::get_json(&app, "/api/v1/notifications").await;
    assert_eq!(status, StatusCode::OK);
    let newest = &json.as_array().unwrap()[0];
    assert_eq!(newest["kind"], "success");
    assert!(newest["message"].as_str().unwrap().contains("+2"));
}

#[tokio::test]
async fn test_trace_id_is_echoed() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/progress")
                .header("x-trace-id", "trace-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-trace-id"], "trace-123");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_persist_to_file_store() {
    let path = std::env::temp_dir()
        .join(format!("chesstrainer-it-{}", uuid::Uuid::new_v4()))
        .join("progress.json");
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let app = common::create_test_app_with_store(store);

    let requests = (0..12).map(|i| {
        let app = app.clone();
        async move {
            common::post_json(
                &app,
                "/api/v1/attempts",
                json!({
                    "puzzle_id": format!("p{}", i),
                    "puzzle_rating": 1000,
                    "themes": ["fork"],
                    "success": true,
                    "time_spent_secs": 5
                }),
            )
            .await
        }
    });
    for (status, _) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, progress) = common::get_json(&app, "/api/v1/progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["rating"], 1212);
    assert_eq!(progress["solved_count"], 12);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("userRating").unwrap().as_deref(), Some("1212"));
    let solved: Vec<String> =
        serde_json::from_str(&reopened.get("solvedPuzzles").unwrap().unwrap()).unwrap();
    assert_eq!(solved.len(), 12);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
