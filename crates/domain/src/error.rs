//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Stage;

/// Failure reported by a request repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn request_not_found(id: Uuid) -> Self {
        RepositoryError::NotFound {
            entity: "Maintenance request",
            id,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Stage change refused by the transition policy.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Transition from {from} to {to} is not allowed")]
pub struct StageError {
    pub from: Stage,
    pub to: Stage,
}

/// Errors surfaced by the core components.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Local and recoverable: re-prompt, nothing was persisted.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A request or referenced entity is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote call failed; optimistic state has to be rolled back.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error(transparent)]
    Stage(#[from] StageError),
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => DomainError::NotFound(err.to_string()),
            RepositoryError::Backend(msg) => DomainError::Persistence(msg),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
