//! Stage state machine.
//!
//! Stage changes go through an explicit transition table. The default table is
//! total: any stage may move to any other, including `Scrap -> New`, so that
//! requests can be corrected by hand. Restricting a move is a matter of
//! clearing one cell with [`TransitionPolicy::forbid`].

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult, StageError};
use crate::models::{MaintenanceRequest, RequestPatch, Stage};
use crate::repository::RequestRepository;

/// Which stage changes are legal, indexed `[from][to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    allowed: [[bool; 4]; 4],
}

impl TransitionPolicy {
    /// Every stage reachable from every stage.
    pub const fn permissive() -> Self {
        Self {
            allowed: [[true; 4]; 4],
        }
    }

    /// Disallow a single move. Staying in place is always allowed.
    pub fn forbid(mut self, from: Stage, to: Stage) -> Self {
        if from != to {
            self.allowed[from.index()][to.index()] = false;
        }
        self
    }

    pub fn allows(&self, from: Stage, to: Stage) -> bool {
        self.allowed[from.index()][to.index()]
    }
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

/// Result of a local stage change.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub request: MaintenanceRequest,
    pub from: Stage,
    pub to: Stage,
}

impl Transition {
    /// The request already sat in the target stage.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Applies stage changes under a transition policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageMachine {
    policy: TransitionPolicy,
}

impl StageMachine {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    pub fn can_transition(&self, from: Stage, to: Stage) -> bool {
        self.policy.allows(from, to)
    }

    /// Moves a copy of the request to `target`. Only `stage` changes.
    pub fn transition(
        &self,
        request: &MaintenanceRequest,
        target: Stage,
    ) -> Result<Transition, StageError> {
        let from = request.stage;
        if !self.can_transition(from, target) {
            return Err(StageError { from, to: target });
        }

        let mut updated = request.clone();
        updated.stage = target;
        Ok(Transition {
            request: updated,
            from,
            to: target,
        })
    }

    /// Loads, transitions and persists a stored request.
    ///
    /// A move onto the current stage returns without touching the repository.
    pub async fn transition_stored(
        &self,
        repository: &dyn RequestRepository,
        request_id: Uuid,
        target: Stage,
    ) -> DomainResult<Transition> {
        let current = repository
            .get_request(request_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Maintenance request {}", request_id)))?;

        let transition = self.transition(&current, target)?;
        if transition.is_noop() {
            debug!(request_id = %request_id, stage = %target, "Stage unchanged");
            return Ok(transition);
        }

        let persisted = repository
            .update_request(request_id, RequestPatch::stage(target))
            .await?;
        info!(
            request_id = %request_id,
            from = %transition.from,
            to = %transition.to,
            "Request stage changed"
        );

        Ok(Transition {
            request: persisted,
            ..transition
        })
    }
}
