//! Kanban board projection and optimistic stage updates.
//!
//! The board groups requests into one column per stage. Drags are applied to
//! the local collection before persistence resolves. Each drag keeps a full
//! snapshot of the collection as it was before the drag; a failed write
//! restores that snapshot, and any response belonging to an operation that a
//! rollback already erased is discarded.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DomainResult, RepositoryError};
use crate::models::{MaintenanceRequest, RequestFilter, RequestPatch, Stage};
use crate::repository::RequestRepository;
use crate::services::stage_machine::StageMachine;

/// Message shown after a failed drag.
pub const ROLLBACK_NOTICE: &str = "Could not update the request stage. Changes were reverted.";

// ============================================================================
// Projection
// ============================================================================

/// Anything that can be placed on the board.
pub trait BoardCard {
    fn card_id(&self) -> Uuid;

    /// `None` when the record carries a stage the board does not know.
    fn card_stage(&self) -> Option<Stage>;
}

impl BoardCard for MaintenanceRequest {
    fn card_id(&self) -> Uuid {
        self.id
    }

    fn card_stage(&self) -> Option<Stage> {
        Some(self.stage)
    }
}

/// Requests bucketed by stage, in input order within each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardProjection<T = MaintenanceRequest> {
    columns: [Vec<T>; 4],
    unclassified: Vec<T>,
}

impl<T> BoardProjection<T> {
    pub fn column(&self, stage: Stage) -> &[T] {
        &self.columns[stage.index()]
    }

    /// Columns in board order.
    pub fn columns(&self) -> impl Iterator<Item = (Stage, &[T])> {
        Stage::ALL
            .into_iter()
            .map(move |stage| (stage, self.column(stage)))
    }

    /// Records that fit no column. Never silently dropped.
    pub fn unclassified(&self) -> &[T] {
        &self.unclassified
    }

    pub fn counts(&self) -> StageCounts {
        let len = |stage: Stage| self.column(stage).len();
        StageCounts {
            total: self.columns.iter().map(Vec::len).sum::<usize>() + self.unclassified.len(),
            new: len(Stage::New),
            in_progress: len(Stage::InProgress),
            repaired: len(Stage::Repaired),
            scrap: len(Stage::Scrap),
        }
    }
}

/// Per-stage totals for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StageCounts {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub repaired: usize,
    pub scrap: usize,
}

/// Partition records into stage columns.
pub fn project<T: BoardCard + Clone>(requests: &[T]) -> BoardProjection<T> {
    let mut columns: [Vec<T>; 4] = Default::default();
    let mut unclassified = Vec::new();

    for request in requests {
        match request.card_stage() {
            Some(stage) => columns[stage.index()].push(request.clone()),
            None => {
                warn!(
                    request_id = %request.card_id(),
                    "Request has no recognized stage, kept out of board columns"
                );
                unclassified.push(request.clone());
            }
        }
    }

    BoardProjection {
        columns,
        unclassified,
    }
}

// ============================================================================
// Drag
// ============================================================================

/// Deferred write produced by a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOp {
    pub request_id: Uuid,
    pub from: Stage,
    pub to: Stage,
}

impl PersistOp {
    pub fn patch(&self) -> RequestPatch {
        RequestPatch::stage(self.to)
    }
}

/// Updated collection plus the write to issue, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub requests: Vec<MaintenanceRequest>,
    pub persist: Option<PersistOp>,
}

/// Move one request to `target` in a copy of the collection.
///
/// Dropping a card on its own column, dragging an unknown id, or a move the
/// policy refuses all return the collection unchanged with nothing to persist.
pub fn apply_drag(
    machine: &StageMachine,
    requests: &[MaintenanceRequest],
    request_id: Uuid,
    target: Stage,
) -> DragOutcome {
    let unchanged = || DragOutcome {
        requests: requests.to_vec(),
        persist: None,
    };

    let Some(position) = requests.iter().position(|r| r.id == request_id) else {
        debug!(request_id = %request_id, "Dragged request is not on the board");
        return unchanged();
    };

    let transition = match machine.transition(&requests[position], target) {
        Ok(transition) if !transition.is_noop() => transition,
        Ok(_) => return unchanged(),
        Err(err) => {
            debug!(request_id = %request_id, error = %err, "Drag refused by policy");
            return unchanged();
        }
    };

    let mut updated = requests.to_vec();
    updated[position] = transition.request;
    DragOutcome {
        requests: updated,
        persist: Some(PersistOp {
            request_id,
            from: transition.from,
            to: transition.to,
        }),
    }
}

// ============================================================================
// Session
// ============================================================================

/// A drag whose write has been issued but not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDrag {
    pub op: PersistOp,
    /// Tag identifying the snapshot the write was issued against.
    pub generation: u64,
}

/// How a drag ended from the board's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum DragResult {
    /// Nothing to do: same column, unknown card, or refused move.
    Unchanged,
    /// The write succeeded.
    Committed(MaintenanceRequest),
    /// The write failed and the board was restored.
    RolledBack { message: String },
    /// The response arrived for an operation a rollback already erased.
    Stale,
}

/// Owns the board's request collection for one viewer.
pub struct BoardSession {
    repository: Arc<dyn RequestRepository>,
    machine: StageMachine,
    filter: RequestFilter,
    requests: Vec<MaintenanceRequest>,
    next_generation: u64,
    /// Pre-drag snapshots of in-flight writes, keyed by generation.
    pending: BTreeMap<u64, (PersistOp, Vec<MaintenanceRequest>)>,
    notice: Option<String>,
}

impl BoardSession {
    pub fn new(
        repository: Arc<dyn RequestRepository>,
        machine: StageMachine,
        filter: RequestFilter,
        requests: Vec<MaintenanceRequest>,
    ) -> Self {
        Self {
            repository,
            machine,
            filter,
            requests,
            next_generation: 1,
            pending: BTreeMap::new(),
            notice: None,
        }
    }

    /// Build a session from the repository contents.
    pub async fn load(
        repository: Arc<dyn RequestRepository>,
        machine: StageMachine,
        filter: RequestFilter,
    ) -> DomainResult<Self> {
        let requests = repository.list_requests(&filter).await?;
        Ok(Self::new(repository, machine, filter, requests))
    }

    /// Replace the collection with fresh repository contents.
    ///
    /// In-flight writes issued before the reload become stale.
    pub async fn reload(&mut self) -> DomainResult<()> {
        self.requests = self.repository.list_requests(&self.filter).await?;
        self.pending.clear();
        Ok(())
    }

    pub fn requests(&self) -> &[MaintenanceRequest] {
        &self.requests
    }

    pub fn projection(&self) -> BoardProjection {
        project(&self.requests)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Transient message left by the last rollback, cleared on read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Apply a drag locally and return the write the caller must issue.
    pub fn begin_drag(&mut self, request_id: Uuid, target: Stage) -> Option<PendingDrag> {
        let outcome = apply_drag(&self.machine, &self.requests, request_id, target);
        let op = outcome.persist?;

        let generation = self.next_generation;
        self.next_generation += 1;

        let snapshot = std::mem::replace(&mut self.requests, outcome.requests);
        self.pending.insert(generation, (op, snapshot));
        debug!(
            request_id = %request_id,
            generation,
            to = %op.to,
            "Optimistic stage change applied"
        );

        Some(PendingDrag { op, generation })
    }

    /// Settle a write issued by [`begin_drag`](Self::begin_drag).
    pub fn resolve(
        &mut self,
        pending: PendingDrag,
        result: Result<MaintenanceRequest, RepositoryError>,
    ) -> DragResult {
        let Some((op, snapshot)) = self.pending.remove(&pending.generation) else {
            debug!(
                generation = pending.generation,
                "Discarding response for a rolled-back drag"
            );
            return DragResult::Stale;
        };

        match result {
            Ok(persisted) => {
                let superseded = self
                    .pending
                    .values()
                    .any(|(later, _)| later.request_id == op.request_id);
                if !superseded {
                    if let Some(local) = self.requests.iter_mut().find(|r| r.id == op.request_id) {
                        *local = persisted.clone();
                    }
                }
                info!(
                    request_id = %op.request_id,
                    generation = pending.generation,
                    to = %op.to,
                    "Stage change persisted"
                );
                DragResult::Committed(persisted)
            }
            Err(err) => {
                warn!(
                    request_id = %op.request_id,
                    generation = pending.generation,
                    error = %err,
                    "Stage change failed, restoring board"
                );
                self.requests = snapshot;
                // Later drags were applied on top of the state just discarded.
                self.pending.retain(|generation, _| *generation < pending.generation);
                let message = ROLLBACK_NOTICE.to_string();
                self.notice = Some(message.clone());
                DragResult::RolledBack { message }
            }
        }
    }

    /// Drag a card and persist the change through the repository.
    pub async fn drag(&mut self, request_id: Uuid, target: Stage) -> DragResult {
        let Some(pending) = self.begin_drag(request_id, target) else {
            return DragResult::Unchanged;
        };

        let result = self
            .repository
            .update_request(pending.op.request_id, pending.op.patch())
            .await;
        self.resolve(pending, result)
    }
}
