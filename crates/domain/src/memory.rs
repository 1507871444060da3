//! In-memory request repository.
//!
//! Backs tests and database-less local runs. Write failures can be switched on
//! to exercise rollback paths.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    Equipment, MaintenanceRequest, NewMaintenanceRequest, ReferenceEntity, ReferenceKind,
    RequestFilter, RequestPatch,
};
use crate::repository::RequestRepository;

#[derive(Debug, Default)]
struct MemoryState {
    requests: Vec<MaintenanceRequest>,
    equipment: Vec<Equipment>,
    /// Work centers, teams and categories, keyed by kind, as (owner, row).
    references: HashMap<ReferenceKind, Vec<(Uuid, ReferenceEntity)>>,
}

/// Repository holding everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRequestRepository {
    state: RwLock<MemoryState>,
    fail_writes: AtomicBool,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert, update and delete fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store requests as-is, bypassing validation.
    pub async fn seed(&self, requests: impl IntoIterator<Item = MaintenanceRequest>) {
        self.state.write().await.requests.extend(requests);
    }

    pub async fn add_equipment(&self, equipment: Equipment) {
        self.state.write().await.equipment.push(equipment);
    }

    /// Add a work center, team or category row.
    pub async fn add_reference(
        &self,
        kind: ReferenceKind,
        owner_id: Uuid,
        name: &str,
    ) -> ReferenceEntity {
        let entity = ReferenceEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.state
            .write()
            .await
            .references
            .entry(kind)
            .or_default()
            .push((owner_id, entity.clone()));
        entity
    }

    /// Copy of every stored request in insertion order.
    pub async fn snapshot(&self) -> Vec<MaintenanceRequest> {
        self.state.read().await.requests.clone()
    }

    fn check_writable(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepositoryError::Backend("write rejected by storage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> RepositoryResult<Vec<MaintenanceRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<MaintenanceRequest> = state
            .requests
            .iter()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn get_request(&self, id: Uuid) -> RepositoryResult<Option<MaintenanceRequest>> {
        let state = self.state.read().await;
        Ok(state.requests.iter().find(|request| request.id == id).cloned())
    }

    async fn insert_request(
        &self,
        draft: NewMaintenanceRequest,
    ) -> RepositoryResult<MaintenanceRequest> {
        self.check_writable()?;
        let request = draft.into_request(Uuid::new_v4(), Utc::now());
        self.state.write().await.requests.push(request.clone());
        Ok(request)
    }

    async fn update_request(
        &self,
        id: Uuid,
        patch: RequestPatch,
    ) -> RepositoryResult<MaintenanceRequest> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let request = state
            .requests
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or_else(|| RepositoryError::request_not_found(id))?;
        patch.apply_to(request);
        Ok(request.clone())
    }

    async fn delete_request(&self, id: Uuid) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let before = state.requests.len();
        state.requests.retain(|request| request.id != id);
        if state.requests.len() == before {
            return Err(RepositoryError::request_not_found(id));
        }
        Ok(())
    }

    async fn list_reference_entities(
        &self,
        kind: ReferenceKind,
        owner_id: Uuid,
    ) -> RepositoryResult<Vec<ReferenceEntity>> {
        let state = self.state.read().await;
        let entities = match kind {
            ReferenceKind::Equipment => state
                .equipment
                .iter()
                .filter(|equipment| equipment.owner_id == owner_id)
                .map(ReferenceEntity::from)
                .collect(),
            _ => state
                .references
                .get(&kind)
                .map(|rows| {
                    rows.iter()
                        .filter(|(owner, _)| *owner == owner_id)
                        .map(|(_, entity)| entity.clone())
                        .collect()
                })
                .unwrap_or_default(),
        };
        Ok(entities)
    }

    async fn list_equipment(&self, owner_id: Uuid) -> RepositoryResult<Vec<Equipment>> {
        let state = self.state.read().await;
        Ok(state
            .equipment
            .iter()
            .filter(|equipment| equipment.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
