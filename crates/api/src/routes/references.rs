//! Reference data endpoints: picker rows and equipment maintenance history.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{Equipment, ReferenceEntity, ReferenceKind, RequestFilter};
use domain::repository::load_directory;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::requests::{today, OwnerQuery, RequestResponse};

/// Picker rows for one reference kind. Equipment rows carry the serial number.
///
/// GET /api/v1/references/:kind?owner_id=
///
/// `kind` is one of `equipment`, `work-centers`, `teams`, `categories`.
pub async fn list_references(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ReferenceEntity>>, ApiError> {
    let kind: ReferenceKind = kind.parse().map_err(ApiError::BadRequest)?;
    let entities: Vec<ReferenceEntity> = match kind {
        ReferenceKind::Equipment => state
            .repository
            .list_equipment(query.owner_id)
            .await?
            .iter()
            .map(Equipment::picker_row)
            .collect(),
        _ => {
            state
                .repository
                .list_reference_entities(kind, query.owner_id)
                .await?
        }
    };
    Ok(Json(entities))
}

/// Every request raised against one piece of equipment, newest first.
///
/// GET /api/v1/equipment/:equipment_id/requests?owner_id=&today=
pub async fn equipment_history(
    State(state): State<AppState>,
    Path(equipment_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let filter = RequestFilter::for_owner(query.owner_id).with_equipment(equipment_id);
    let requests = state.repository.list_requests(&filter).await?;
    let directory = load_directory(state.repository.as_ref(), query.owner_id).await?;

    Ok(Json(RequestResponse::from_list(
        requests,
        &directory,
        today(query.today),
    )))
}
