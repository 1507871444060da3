//! Persistence boundary consumed by the core components.
//!
//! Implementations are injected explicitly (`Arc<dyn RequestRepository>`);
//! nothing in the domain holds a global client.

use uuid::Uuid;

use crate::error::RepositoryResult;
use crate::models::{
    Equipment, MaintenanceRequest, NewMaintenanceRequest, ReferenceDirectory, ReferenceEntity,
    ReferenceKind, RequestFilter, RequestPatch,
};

/// Storage for maintenance requests and their reference entities.
#[async_trait::async_trait]
pub trait RequestRepository: Send + Sync {
    /// List requests matching the filter, newest first.
    async fn list_requests(&self, filter: &RequestFilter)
        -> RepositoryResult<Vec<MaintenanceRequest>>;

    /// Fetch a single request.
    async fn get_request(&self, id: Uuid) -> RepositoryResult<Option<MaintenanceRequest>>;

    /// Insert a new request in stage `New`.
    async fn insert_request(
        &self,
        draft: NewMaintenanceRequest,
    ) -> RepositoryResult<MaintenanceRequest>;

    /// Apply a partial update. Unset patch fields are untouched.
    async fn update_request(
        &self,
        id: Uuid,
        patch: RequestPatch,
    ) -> RepositoryResult<MaintenanceRequest>;

    /// Hard-delete a request.
    async fn delete_request(&self, id: Uuid) -> RepositoryResult<()>;

    /// Picker rows for one kind of reference entity.
    async fn list_reference_entities(
        &self,
        kind: ReferenceKind,
        owner_id: Uuid,
    ) -> RepositoryResult<Vec<ReferenceEntity>>;

    /// Equipment with the team and category it hands down to requests.
    async fn list_equipment(&self, owner_id: Uuid) -> RepositoryResult<Vec<Equipment>>;

    /// Readiness probe.
    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

/// Load every picker list for an owner.
pub async fn load_directory(
    repository: &dyn RequestRepository,
    owner_id: Uuid,
) -> RepositoryResult<ReferenceDirectory> {
    let mut directory = ReferenceDirectory::default();
    for kind in [
        ReferenceKind::Equipment,
        ReferenceKind::WorkCenter,
        ReferenceKind::Team,
        ReferenceKind::Category,
    ] {
        let entities = repository.list_reference_entities(kind, owner_id).await?;
        directory.set_entities(kind, entities);
    }
    Ok(directory)
}
