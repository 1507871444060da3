//! Integration tests for the kanban board and stage changes.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, unique_subject, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

async fn board(app: &TestApp) -> Value {
    let (status, body) = app
        .send_json(get_request(&format!(
            "/api/v1/board?owner_id={}",
            app.owner_id
        )))
        .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn move_card(app: &TestApp, id: &str, stage: &str) -> (StatusCode, Value) {
    app.send_json(json_request(
        Method::PATCH,
        &format!("/api/v1/requests/{id}/stage"),
        json!({ "stage": stage }),
    ))
    .await
}

// ============================================================================
// Projection
// ============================================================================

#[tokio::test]
async fn test_empty_board_has_four_columns() {
    let app = create_test_app();
    let body = board(&app).await;

    let stages: Vec<&str> = body["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|column| column["stage"].as_str().unwrap())
        .collect();
    assert_eq!(stages, vec!["New", "In Progress", "Repaired", "Scrap"]);
    assert_eq!(body["counts"]["total"], 0);
    assert!(body["unclassified"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_board_groups_requests_by_stage() {
    let app = create_test_app();
    let first = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    app.create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    let (status, _) = move_card(&app, first["id"].as_str().unwrap(), "Repaired").await;
    assert_eq!(status, StatusCode::OK);

    let body = board(&app).await;
    assert_eq!(body["counts"]["total"], 2);
    assert_eq!(body["counts"]["new"], 1);
    assert_eq!(body["counts"]["repaired"], 1);
    assert_eq!(body["counts"]["in_progress"], 0);
    assert_eq!(body["columns"][2]["requests"][0]["id"], first["id"]);
}

#[tokio::test]
async fn test_board_requires_owner() {
    let app = create_test_app();
    let response = app.send(get_request("/api/v1/board")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Stage changes
// ============================================================================

#[tokio::test]
async fn test_change_stage() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = move_card(&app, id, "in_progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "In Progress");

    let stored = app.repository.snapshot().await;
    assert_eq!(stored[0].stage.as_str(), "In Progress");
}

#[tokio::test]
async fn test_change_stage_to_same_stage_is_accepted() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;

    let (status, body) = move_card(&app, created["id"].as_str().unwrap(), "New").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "New");
}

#[tokio::test]
async fn test_change_stage_of_unknown_request_is_404() {
    let app = create_test_app();
    let (status, _) = move_card(&app, &Uuid::new_v4().to_string(), "Scrap").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_stage_rejects_unknown_stage() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;

    let (status, _) = move_card(&app, created["id"].as_str().unwrap(), "Archived").await;
    assert!(status.is_client_error());

    let stored = app.repository.snapshot().await;
    assert_eq!(stored[0].stage.as_str(), "New");
}

#[tokio::test]
async fn test_change_stage_storage_failure_is_500() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    app.repository.set_fail_writes(true);

    let (status, body) = move_card(&app, created["id"].as_str().unwrap(), "Scrap").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");

    let stored = app.repository.snapshot().await;
    assert_eq!(stored[0].stage.as_str(), "New");
}

#[tokio::test]
async fn test_overdue_flag_uses_viewer_date() {
    let app = create_test_app();
    app.create_request(json!({
        "subject": unique_subject(),
        "type": "Preventive",
        "equipment_id": Uuid::new_v4(),
        "scheduled_date": "2024-02-14",
    }))
    .await;

    for (today, overdue) in [("2024-02-13", false), ("2024-02-14", false), ("2024-02-15", true)] {
        let (status, body) = app
            .send_json(get_request(&format!(
                "/api/v1/board?owner_id={}&today={today}",
                app.owner_id
            )))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columns"][0]["requests"][0]["is_overdue"], overdue, "{today}");
    }
}
