//! Kanban board endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{RequestFilter, Stage};
use domain::repository::load_directory;
use domain::services::{project, StageCounts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_stage_transition;
use crate::routes::requests::{respond, today, OwnerQuery, RequestResponse};

#[derive(Debug, Serialize)]
pub struct BoardColumn {
    pub stage: Stage,
    pub requests: Vec<RequestResponse>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// One column per stage, in board order, always all four.
    pub columns: Vec<BoardColumn>,
    pub unclassified: Vec<RequestResponse>,
    pub counts: StageCounts,
}

#[derive(Debug, Deserialize)]
pub struct StageChangeRequest {
    pub stage: Stage,
}

/// GET /api/v1/board?owner_id=&today=
pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<BoardResponse>, ApiError> {
    let requests = state
        .repository
        .list_requests(&RequestFilter::for_owner(query.owner_id))
        .await?;
    let directory = load_directory(state.repository.as_ref(), query.owner_id).await?;
    let today = today(query.today);

    let projection = project(&requests);
    let columns = projection
        .columns()
        .map(|(stage, cards)| BoardColumn {
            stage,
            requests: RequestResponse::from_list(cards.iter().cloned(), &directory, today),
        })
        .collect();

    Ok(Json(BoardResponse {
        columns,
        unclassified: RequestResponse::from_list(
            projection.unclassified().iter().cloned(),
            &directory,
            today,
        ),
        counts: projection.counts(),
    }))
}

/// Move a card to another column.
///
/// PATCH /api/v1/requests/:request_id/stage
pub async fn change_stage(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<StageChangeRequest>,
) -> Result<Json<RequestResponse>, ApiError> {
    let transition = state
        .stage_machine
        .transition_stored(state.repository.as_ref(), request_id, body.stage)
        .await?;

    if !transition.is_noop() {
        record_stage_transition(transition.from, transition.to);
    }

    Ok(Json(respond(&state, transition.request).await?))
}
