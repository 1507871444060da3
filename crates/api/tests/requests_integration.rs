//! Integration tests for request create/read/update/delete endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, delete_request, error_fields, get_request, json_request, unique_subject,
};
use domain::models::ReferenceKind;
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_request_inherits_equipment_team_and_category() {
    let app = create_test_app();
    let team = app.add_reference(ReferenceKind::Team, "Mechanics").await;
    let category = app.add_reference(ReferenceKind::Category, "Pumps").await;
    let pump = app
        .add_equipment("Pump-1", Some(team.id), Some(category.id))
        .await;

    let created = app
        .create_request(json!({
            "subject": "Pump leak",
            "equipment_id": pump.id,
        }))
        .await;

    assert_eq!(created["stage"], "New");
    assert_eq!(created["type"], "Corrective");
    assert_eq!(created["team_id"], team.id.to_string());
    assert_eq!(created["category_id"], category.id.to_string());
    assert_eq!(created["target"]["kind"], "equipment");
    assert_eq!(created["target_name"], "Pump-1");
    assert_eq!(created["team_name"], "Mechanics");
    assert_eq!(created["category_name"], "Pumps");
}

#[tokio::test]
async fn test_create_request_reports_all_missing_fields() {
    let app = create_test_app();

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/api/v1/requests",
            json!({ "owner_id": app.owner_id, "type": "Preventive" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        error_fields(&body),
        vec!["equipment_id", "scheduled_date", "subject"]
    );
    assert!(app.repository.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_create_request_requires_owner() {
    let app = create_test_app();
    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/api/v1/requests",
            json!({ "subject": "Pump leak", "equipment_id": Uuid::new_v4() }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["owner_id"]);
}

#[tokio::test]
async fn test_create_corrective_request_drops_scheduled_date() {
    let app = create_test_app();
    let created = app
        .create_request(json!({
            "subject": unique_subject(),
            "equipment_id": Uuid::new_v4(),
            "scheduled_date": "2024-06-01",
        }))
        .await;

    assert!(created["scheduled_date"].is_null());
}

#[tokio::test]
async fn test_create_preventive_request_normalizes_timestamp() {
    let app = create_test_app();
    let created = app
        .create_request(json!({
            "subject": unique_subject(),
            "type": "preventive",
            "equipment_id": Uuid::new_v4(),
            "scheduled_date": "2024-06-01T22:30:00Z",
        }))
        .await;

    assert_eq!(created["scheduled_date"], "2024-06-01");
}

#[tokio::test]
async fn test_create_request_ignores_stage_and_bad_duration() {
    let app = create_test_app();
    let created = app
        .create_request(json!({
            "subject": unique_subject(),
            "equipment_id": Uuid::new_v4(),
            "stage": "Scrap",
            "duration_hours": "about two",
        }))
        .await;

    assert_eq!(created["stage"], "New");
    assert!(created["duration_hours"].is_null());
}

#[tokio::test]
async fn test_unknown_equipment_reads_not_found() {
    let app = create_test_app();
    let created = app
        .create_request(json!({
            "subject": unique_subject(),
            "equipment_id": Uuid::new_v4(),
            "duration_hours": "3",
        }))
        .await;

    assert_eq!(created["target_name"], "Not found");
    assert_eq!(created["team_name"], "N/A");
    assert_eq!(created["duration_hours"], 3.0);
}

// ============================================================================
// Read / list
// ============================================================================

#[tokio::test]
async fn test_get_request() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": "Pump leak", "equipment_id": Uuid::new_v4() }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send_json(get_request(&format!("/api/v1/requests/{id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "Pump leak");
}

#[tokio::test]
async fn test_get_unknown_request_is_404() {
    let app = create_test_app();
    let (status, body) = app
        .send_json(get_request(&format!("/api/v1/requests/{}", Uuid::new_v4())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_list_requests_scoped_to_owner() {
    let app = create_test_app();
    app.create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    app.create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;

    let (status, body) = app
        .send_json(get_request(&format!(
            "/api/v1/requests?owner_id={}",
            app.owner_id
        )))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, other) = app
        .send_json(get_request(&format!(
            "/api/v1/requests?owner_id={}",
            Uuid::new_v4()
        )))
        .await;
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_requests_requires_owner() {
    let app = create_test_app();
    let response = app.send(get_request("/api/v1/requests")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_update_switches_target_to_work_center() {
    let app = create_test_app();
    let line = app.add_reference(ReferenceKind::WorkCenter, "Line A").await;
    let created = app
        .create_request(json!({ "subject": "Line stopped", "equipment_id": Uuid::new_v4() }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            &format!("/api/v1/requests/{id}"),
            json!({ "maintenance_for": "work_center", "work_center_id": line.id }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["target"]["kind"], "work_center");
    assert_eq!(body["target"]["id"], line.id.to_string());
    assert_eq!(body["maintenance_for"], "Work Center");
    assert_eq!(body["target_name"], "Line A");
    assert_eq!(body["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_update_changes_stage() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            &format!("/api/v1/requests/{id}"),
            json!({ "stage": "In Progress", "corrective_action": "Replace seal" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "In Progress");
    assert_eq!(body["corrective_action"], "Replace seal");
}

#[tokio::test]
async fn test_update_with_blank_subject_is_rejected() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": "Pump leak", "equipment_id": Uuid::new_v4() }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send_json(json_request(
            Method::PUT,
            &format!("/api/v1/requests/{id}"),
            json!({ "subject": "   " }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["subject"]);
    let stored = app.repository.snapshot().await;
    assert_eq!(stored[0].subject, "Pump leak");
}

#[tokio::test]
async fn test_delete_request() {
    let app = create_test_app();
    let created = app
        .create_request(json!({ "subject": unique_subject(), "equipment_id": Uuid::new_v4() }))
        .await;
    let uri = format!("/api/v1/requests/{}", created["id"].as_str().unwrap());

    let response = app.send(delete_request(&uri)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(get_request(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(delete_request(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
