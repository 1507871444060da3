//! Maintenance request endpoints.
//!
//! Create and update go through the request editor, so the HTTP surface obeys
//! the same field rules as the form: equipment auto-fills team and category,
//! the unused target is cleared and the scheduled date only survives on
//! preventive requests.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use domain::models::{
    MaintenanceFor, MaintenanceRequest, Priority, ReferenceDirectory, ReferenceKind, RequestFilter,
    RequestType, Stage,
};
use domain::repository::load_directory;
use domain::services::RequestEditor;
use serde::{Deserialize, Serialize};
use shared::dates::normalize_date;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_request_saved;

// ============================================================================
// Response types
// ============================================================================

/// A request with its references resolved to display names.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub maintenance_for: MaintenanceFor,
    pub target_name: String,
    pub team_name: String,
    pub category_name: String,
    pub is_overdue: bool,
}

impl RequestResponse {
    pub fn new(request: MaintenanceRequest, directory: &ReferenceDirectory, today: NaiveDate) -> Self {
        Self {
            maintenance_for: request.maintenance_for(),
            target_name: directory.target_name(&request.target).to_string(),
            team_name: directory
                .display_name(ReferenceKind::Team, request.team_id)
                .to_string(),
            category_name: directory
                .display_name(ReferenceKind::Category, request.category_id)
                .to_string(),
            is_overdue: request.is_overdue(today),
            request,
        }
    }

    pub fn from_list(
        requests: impl IntoIterator<Item = MaintenanceRequest>,
        directory: &ReferenceDirectory,
        today: NaiveDate,
    ) -> Vec<Self> {
        requests
            .into_iter()
            .map(|request| Self::new(request, directory, today))
            .collect()
    }
}

/// The viewer's calendar day when supplied, otherwise the UTC date.
pub(crate) fn today(client_today: Option<NaiveDate>) -> NaiveDate {
    client_today.unwrap_or_else(|| Utc::now().date_naive())
}

/// Resolve names for a single request against its owner's directory.
pub(crate) async fn respond(
    state: &AppState,
    request: MaintenanceRequest,
) -> Result<RequestResponse, ApiError> {
    let directory = load_directory(state.repository.as_ref(), request.owner_id).await?;
    Ok(RequestResponse::new(request, &directory, today(None)))
}

// ============================================================================
// Request types
// ============================================================================

/// Query scoping a listing to one owner.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
    /// Viewer's local date, used for overdue flags.
    pub today: Option<NaiveDate>,
}

/// Viewer's local date, read alongside another query struct.
#[derive(Debug, Default, Deserialize)]
pub struct ViewerDate {
    pub today: Option<NaiveDate>,
}

/// Duration as typed by the user. Text is parsed permissively.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Hours(f64),
    Text(String),
}

/// Create/update body. Absent fields keep the editor's current value.
#[derive(Debug, Default, Deserialize)]
pub struct RequestForm {
    pub owner_id: Option<Uuid>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
    pub maintenance_for: Option<MaintenanceFor>,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    /// Overrides the team inherited from equipment.
    pub team_id: Option<Uuid>,
    /// Overrides the category inherited from equipment.
    pub category_id: Option<Uuid>,
    /// Only honored on update.
    pub stage: Option<Stage>,
    /// Date or timestamp; blank clears it.
    pub scheduled_date: Option<String>,
    pub duration_hours: Option<DurationInput>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub preventive_action: Option<String>,
}

impl RequestForm {
    /// Replay the form onto the editor in the order a user would fill it.
    fn apply(self, editor: &mut RequestEditor) -> Result<(), ApiError> {
        if let Some(subject) = self.subject {
            editor.set_subject(subject);
        }
        if let Some(request_type) = self.request_type {
            editor.set_request_type(request_type);
        }
        if let Some(maintenance_for) = self.maintenance_for {
            editor.set_maintenance_for(maintenance_for);
        }
        if let Some(equipment_id) = self.equipment_id {
            editor.select_equipment(equipment_id);
        }
        if let Some(work_center_id) = self.work_center_id {
            editor.select_work_center(work_center_id);
        }
        if self.team_id.is_some() {
            editor.set_team(self.team_id);
        }
        if self.category_id.is_some() {
            editor.set_category(self.category_id);
        }
        if let Some(input) = self.scheduled_date {
            let date = if input.trim().is_empty() {
                None
            } else {
                Some(
                    normalize_date(&input)
                        .map_err(|e| ApiError::invalid_field("scheduled_date", e.to_string()))?,
                )
            };
            editor.set_scheduled_date(date);
        }
        match self.duration_hours {
            Some(DurationInput::Hours(hours)) => editor.set_duration_hours(Some(hours)),
            Some(DurationInput::Text(text)) => editor.set_duration_input(&text),
            None => {}
        }
        if self.priority.is_some() {
            editor.set_priority(self.priority);
        }
        if let Some(text) = self.description {
            editor.set_description(text);
        }
        if let Some(text) = self.corrective_action {
            editor.set_corrective_action(text);
        }
        if let Some(text) = self.preventive_action {
            editor.set_preventive_action(text);
        }
        if let Some(stage) = self.stage {
            editor.set_stage(stage)?;
        }
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List an owner's requests, newest first.
///
/// GET /api/v1/requests?owner_id=&type=&stage=&equipment_id=&today=
pub async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
    Query(viewer): Query<ViewerDate>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let owner_id = filter
        .owner_id
        .ok_or_else(|| ApiError::invalid_field("owner_id", "owner_id is required"))?;

    let requests = state.repository.list_requests(&filter).await?;
    let directory = load_directory(state.repository.as_ref(), owner_id).await?;

    Ok(Json(RequestResponse::from_list(
        requests,
        &directory,
        today(viewer.today),
    )))
}

/// Create a request. It always starts in `New`.
///
/// POST /api/v1/requests
pub async fn create_request(
    State(state): State<AppState>,
    Json(mut form): Json<RequestForm>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    let owner_id = form
        .owner_id
        .ok_or_else(|| ApiError::invalid_field("owner_id", "owner_id is required"))?;
    form.stage = None;

    let equipment = state.repository.list_equipment(owner_id).await?;
    let mut editor = RequestEditor::new(equipment).with_stage_machine(state.stage_machine);
    form.apply(&mut editor)?;

    let saved = editor.save(state.repository.as_ref(), owner_id).await?;
    record_request_saved(true);
    info!(request_id = %saved.id, owner_id = %owner_id, "Request created");

    let response = respond(&state, saved).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/requests/:request_id
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, ApiError> {
    let request = state
        .repository
        .get_request(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Maintenance request {}", request_id)))?;

    Ok(Json(respond(&state, request).await?))
}

/// Edit a stored request through the editor.
///
/// PUT /api/v1/requests/:request_id
pub async fn update_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(form): Json<RequestForm>,
) -> Result<Json<RequestResponse>, ApiError> {
    let existing = state
        .repository
        .get_request(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Maintenance request {}", request_id)))?;

    let equipment = state.repository.list_equipment(existing.owner_id).await?;
    let mut editor =
        RequestEditor::from_request(&existing, equipment).with_stage_machine(state.stage_machine);
    form.apply(&mut editor)?;

    let saved = editor
        .save(state.repository.as_ref(), existing.owner_id)
        .await?;
    record_request_saved(false);

    Ok(Json(respond(&state, saved).await?))
}

/// DELETE /api/v1/requests/:request_id
pub async fn delete_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.repository.delete_request(request_id).await?;
    info!(request_id = %request_id, "Request deleted");
    Ok(StatusCode::NO_CONTENT)
}
