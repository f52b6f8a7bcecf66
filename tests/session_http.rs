mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::app::spawn_test_server;
use common::http::{
    assert_json_error, assert_status_ok_json, request, request_raw, response_json,
};

async fn generate(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    let resp = request(app, Method::POST, "/api/session/generate", Some(body), &[]).await;
    let (status, _, json) = response_json(resp).await;
    (status, json)
}

#[tokio::test]
async fn it_generate_then_get_round_trip() {
    let app = spawn_test_server().await;

    let (status, body) = generate(
        &app.app,
        json!({
            "painAreas": ["knee"],
            "improvementAreas": [],
            "durationMinutes": 20
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_status_ok_json(status, &body);

    let session = &body["data"];
    let id = session["id"].as_str().expect("session id").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(session["totalDurationSec"], 1200);
    assert_eq!(session["painAreas"], json!(["knees"]));
    let poses = session["poses"].as_array().expect("poses");
    assert_eq!(poses.len() as u64, session["numPoses"].as_u64().unwrap());
    assert!(poses.iter().all(|p| p["isPainTarget"] == true));
    let total: u64 = poses.iter().map(|p| p["durationSec"].as_u64().unwrap()).sum();
    assert_eq!(total, 1200);

    let get = request(&app.app, Method::GET, &format!("/api/session/{id}"), None, &[]).await;
    let (get_status, _, got) = response_json(get).await;
    assert_eq!(get_status, StatusCode::OK);
    assert_eq!(&got["data"], session);
    assert_eq!(app.state.store().count_yoga_sessions().unwrap(), 1);
}

#[tokio::test]
async fn it_preview_matches_generate() {
    let app = spawn_test_server().await;
    let input = json!({
        "painAreas": ["lower_back"],
        "improvementAreas": ["balance"],
        "durationMinutes": 45
    });

    let preview = request(
        &app.app,
        Method::POST,
        "/api/session/preview",
        Some(input.clone()),
        &[],
    )
    .await;
    let (status, _, preview) = response_json(preview).await;
    assert_status_ok_json(status, &preview);
    assert_eq!(preview["data"]["targetsPain"], true);
    assert_eq!(preview["data"]["targetsImprovement"], true);

    let (_, generated) = generate(&app.app, input).await;
    assert_eq!(
        preview["data"]["estimatedPoses"],
        generated["data"]["numPoses"]
    );
    // Preview never persists anything.
    assert_eq!(app.state.store().count_yoga_sessions().unwrap(), 1);
}

#[tokio::test]
async fn it_rejects_bad_session_input() {
    let app = spawn_test_server().await;

    let (status, body) = generate(
        &app.app,
        json!({ "painAreas": ["elbow"], "durationMinutes": 30 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "UNKNOWN_BODY_PART");

    let (status, body) = generate(&app.app, json!({ "durationMinutes": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_DURATION");

    let (status, body) = generate(&app.app, json!({ "durationMinutes": 91.5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_DURATION");

    let (status, body) = generate(&app.app, json!({ "painAreas": ["neck"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");

    let raw = request_raw(
        &app.app,
        Method::POST,
        "/api/session/generate",
        b"{not json".to_vec(),
    )
    .await;
    let (status, _, body) = response_json(raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");

    assert_eq!(app.state.store().count_yoga_sessions().unwrap(), 0);
}

#[tokio::test]
async fn it_unknown_session_is_404() {
    let app = spawn_test_server().await;

    for path in [
        "/api/session/6f1c2a4e-3b7d-4c1e-9a2f-0d8e5b6c7a91",
        "/api/session/not-a-uuid",
    ] {
        let resp = request(&app.app, Method::GET, path, None, &[]).await;
        let (status, _, body) = response_json(resp).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_json_error(&body, "NOT_FOUND");
    }

    let complete = request(
        &app.app,
        Method::POST,
        "/api/session/6f1c2a4e-3b7d-4c1e-9a2f-0d8e5b6c7a91/complete",
        Some(json!({ "completedPoses": 1, "totalTime": 60 })),
        &[],
    )
    .await;
    let (status, _, _) = response_json(complete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_complete_once_then_conflict() {
    let app = spawn_test_server().await;
    let (_, body) = generate(
        &app.app,
        json!({ "improvementAreas": ["core"], "durationMinutes": 15 }),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let total_poses = body["data"]["numPoses"].as_u64().unwrap();
    let path = format!("/api/session/{id}/complete");

    let first = request(
        &app.app,
        Method::POST,
        &path,
        Some(json!({ "completedPoses": total_poses, "totalTime": 870 })),
        &[],
    )
    .await;
    let (status, _, done) = response_json(first).await;
    assert_status_ok_json(status, &done);
    assert_eq!(done["data"]["message"], "Session completed successfully");
    assert_eq!(done["data"]["sessionId"], id.as_str());
    assert_eq!(done["data"]["completedPoses"], total_poses);
    assert_eq!(done["data"]["totalPoses"], total_poses);
    assert_eq!(done["data"]["actualDurationSec"], 870);

    let second = request(
        &app.app,
        Method::POST,
        &path,
        Some(json!({ "completedPoses": 1, "totalTime": 10 })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_json_error(&body, "SESSION_ALREADY_COMPLETED");

    let get = request(&app.app, Method::GET, &format!("/api/session/{id}"), None, &[]).await;
    let (_, _, stored) = response_json(get).await;
    assert_eq!(stored["data"]["completion"]["actualDurationSec"], 870);
}

#[tokio::test]
async fn it_complete_rejects_more_poses_than_planned() {
    let app = spawn_test_server().await;
    let (_, body) = generate(
        &app.app,
        json!({ "painAreas": ["knees"], "durationMinutes": 10 }),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let too_many = body["data"]["numPoses"].as_u64().unwrap() + 1;

    let resp = request(
        &app.app,
        Method::POST,
        &format!("/api/session/{id}/complete"),
        Some(json!({ "completedPoses": too_many, "totalTime": 600 })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_COMPLETION");
}

#[tokio::test]
async fn it_lists_body_parts() {
    let app = spawn_test_server().await;
    let resp = request(&app.app, Method::GET, "/api/session/body-parts", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    let parts = body["data"]["bodyParts"].as_array().unwrap();
    assert_eq!(parts.len(), 12);
    assert!(parts.contains(&json!("lower_back")));
}
