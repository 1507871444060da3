//! Common test utilities for integration tests.
//!
//! Every test gets its own router over a fresh in-memory repository, so no
//! database is needed and tests can run in parallel.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use domain::memory::InMemoryRequestRepository;
use domain::models::{Equipment, ReferenceEntity, ReferenceKind};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use maintenance_tracker_api::{app::create_app, config::Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// A router plus direct access to its storage.
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryRequestRepository>,
    pub owner_id: Uuid,
}

impl TestApp {
    /// Send one request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send and decode the JSON body.
    pub async fn send_json(&self, request: Request<Body>) -> (axum::http::StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn add_equipment(
        &self,
        name: &str,
        team_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> Equipment {
        let equipment = Equipment {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            name: name.to_string(),
            serial_number: None,
            category_id,
            maintenance_team_id: team_id,
        };
        self.repository.add_equipment(equipment.clone()).await;
        equipment
    }

    pub async fn add_reference(&self, kind: ReferenceKind, name: &str) -> ReferenceEntity {
        self.repository
            .add_reference(kind, self.owner_id, name)
            .await
    }

    /// POST a request body, filling in the owner, and return the created JSON.
    pub async fn create_request(&self, mut body: Value) -> Value {
        body["owner_id"] = Value::String(self.owner_id.to_string());
        let (status, json) = self
            .send_json(json_request(Method::POST, "/api/v1/requests", body))
            .await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{json}");
        json
    }
}

/// Test configuration from embedded defaults.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

pub fn create_test_app() -> TestApp {
    let repository = Arc::new(InMemoryRequestRepository::new());
    let router = create_app(test_config(), repository.clone());
    TestApp {
        router,
        repository,
        owner_id: Uuid::new_v4(),
    }
}

/// Random but readable subject line.
pub fn unique_subject() -> String {
    Sentence(2..5).fake()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Field names listed in a validation error body.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
