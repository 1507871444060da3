//! PostgreSQL request repository.

use async_trait::async_trait;
use domain::error::{RepositoryError, RepositoryResult};
use domain::models::{
    Equipment, MaintenanceRequest, NewMaintenanceRequest, ReferenceEntity, ReferenceKind,
    RequestFilter, RequestPatch,
};
use domain::repository::RequestRepository;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::entities::{
    EquipmentEntity, MaintenanceForDb, MaintenanceRequestEntity, PriorityDb, ReferenceNameEntity,
    RequestTypeDb, StageDb,
};
use crate::metrics::{record_pool_metrics, record_query_error, QueryTimer};

fn backend(err: sqlx::Error) -> RepositoryError {
    error!(error = %err, "Database query failed");
    record_query_error();
    RepositoryError::Backend(err.to_string())
}

/// Repository for maintenance requests and their reference tables.
#[derive(Clone)]
pub struct PgRequestRepository {
    pool: PgPool,
}

impl PgRequestRepository {
    /// Creates a new PgRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> RepositoryResult<Vec<MaintenanceRequest>> {
        let timer = QueryTimer::new("list_requests");

        let result = sqlx::query_as::<_, MaintenanceRequestEntity>(
            r#"
            SELECT id, owner_id, subject, request_type, maintenance_for, equipment_id,
                   work_center_id, team_id, category_id, stage, scheduled_date,
                   duration_hours, priority, description, corrective_action,
                   preventive_action, created_at
            FROM maintenance_requests
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::request_type IS NULL OR request_type = $2)
              AND ($3::request_stage IS NULL OR stage = $3)
              AND ($4::uuid IS NULL OR equipment_id = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.request_type.map(RequestTypeDb::from))
        .bind(filter.stage.map(StageDb::from))
        .bind(filter.equipment_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
            .map_err(backend)?
            .into_iter()
            .map(MaintenanceRequest::try_from)
            .collect()
    }

    async fn get_request(&self, id: Uuid) -> RepositoryResult<Option<MaintenanceRequest>> {
        let timer = QueryTimer::new("get_request");

        let result = sqlx::query_as::<_, MaintenanceRequestEntity>(
            r#"
            SELECT id, owner_id, subject, request_type, maintenance_for, equipment_id,
                   work_center_id, team_id, category_id, stage, scheduled_date,
                   duration_hours, priority, description, corrective_action,
                   preventive_action, created_at
            FROM maintenance_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
            .map_err(backend)?
            .map(MaintenanceRequest::try_from)
            .transpose()
    }

    async fn insert_request(
        &self,
        draft: NewMaintenanceRequest,
    ) -> RepositoryResult<MaintenanceRequest> {
        let timer = QueryTimer::new("insert_request");

        let result = sqlx::query_as::<_, MaintenanceRequestEntity>(
            r#"
            INSERT INTO maintenance_requests (
                owner_id, subject, request_type, maintenance_for, equipment_id,
                work_center_id, team_id, category_id, stage, scheduled_date,
                duration_hours, priority, description, corrective_action, preventive_action
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'new', $9, $10, $11, $12, $13, $14)
            RETURNING id, owner_id, subject, request_type, maintenance_for, equipment_id,
                      work_center_id, team_id, category_id, stage, scheduled_date,
                      duration_hours, priority, description, corrective_action,
                      preventive_action, created_at
            "#,
        )
        .bind(draft.owner_id)
        .bind(&draft.subject)
        .bind(RequestTypeDb::from(draft.request_type))
        .bind(MaintenanceForDb::from(draft.target.maintenance_for()))
        .bind(draft.target.equipment_id())
        .bind(draft.target.work_center_id())
        .bind(draft.team_id)
        .bind(draft.category_id)
        .bind(draft.scheduled_date)
        .bind(draft.duration_hours)
        .bind(draft.priority.map(PriorityDb::from))
        .bind(&draft.description)
        .bind(&draft.corrective_action)
        .bind(&draft.preventive_action)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        MaintenanceRequest::try_from(result.map_err(backend)?)
    }

    /// Read-modify-write under a row lock.
    async fn update_request(
        &self,
        id: Uuid,
        patch: RequestPatch,
    ) -> RepositoryResult<MaintenanceRequest> {
        let timer = QueryTimer::new("update_request");
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let current = sqlx::query_as::<_, MaintenanceRequestEntity>(
            r#"
            SELECT id, owner_id, subject, request_type, maintenance_for, equipment_id,
                   work_center_id, team_id, category_id, stage, scheduled_date,
                   duration_hours, priority, description, corrective_action,
                   preventive_action, created_at
            FROM maintenance_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or_else(|| RepositoryError::request_not_found(id))?;

        let mut request = MaintenanceRequest::try_from(current)?;
        patch.apply_to(&mut request);

        let updated = sqlx::query_as::<_, MaintenanceRequestEntity>(
            r#"
            UPDATE maintenance_requests
            SET subject = $2,
                request_type = $3,
                maintenance_for = $4,
                equipment_id = $5,
                work_center_id = $6,
                team_id = $7,
                category_id = $8,
                stage = $9,
                scheduled_date = $10,
                duration_hours = $11,
                priority = $12,
                description = $13,
                corrective_action = $14,
                preventive_action = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, subject, request_type, maintenance_for, equipment_id,
                      work_center_id, team_id, category_id, stage, scheduled_date,
                      duration_hours, priority, description, corrective_action,
                      preventive_action, created_at
            "#,
        )
        .bind(id)
        .bind(&request.subject)
        .bind(RequestTypeDb::from(request.request_type))
        .bind(MaintenanceForDb::from(request.target.maintenance_for()))
        .bind(request.target.equipment_id())
        .bind(request.target.work_center_id())
        .bind(request.team_id)
        .bind(request.category_id)
        .bind(StageDb::from(request.stage))
        .bind(request.scheduled_date)
        .bind(request.duration_hours)
        .bind(request.priority.map(PriorityDb::from))
        .bind(&request.description)
        .bind(&request.corrective_action)
        .bind(&request.preventive_action)
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        timer.record();
        MaintenanceRequest::try_from(updated)
    }

    async fn delete_request(&self, id: Uuid) -> RepositoryResult<()> {
        let timer = QueryTimer::new("delete_request");

        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        timer.record();
        if result.map_err(backend)?.rows_affected() == 0 {
            return Err(RepositoryError::request_not_found(id));
        }
        Ok(())
    }

    async fn list_reference_entities(
        &self,
        kind: ReferenceKind,
        owner_id: Uuid,
    ) -> RepositoryResult<Vec<ReferenceEntity>> {
        let timer = QueryTimer::new("list_reference_entities");

        // Table names come from a closed enum, never from input.
        let sql = format!(
            "SELECT id, name FROM {} WHERE owner_id = $1 ORDER BY name",
            kind.table()
        );
        let result = sqlx::query_as::<_, ReferenceNameEntity>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await;

        timer.record();
        Ok(result
            .map_err(backend)?
            .into_iter()
            .map(ReferenceEntity::from)
            .collect())
    }

    async fn list_equipment(&self, owner_id: Uuid) -> RepositoryResult<Vec<Equipment>> {
        let timer = QueryTimer::new("list_equipment");

        let result = sqlx::query_as::<_, EquipmentEntity>(
            r#"
            SELECT id, owner_id, name, serial_number, category_id, maintenance_team_id
            FROM equipment
            WHERE owner_id = $1
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        Ok(result
            .map_err(backend)?
            .into_iter()
            .map(Equipment::from)
            .collect())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        let timer = QueryTimer::new("ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        timer.record();

        record_pool_metrics(&self.pool);
        result.map(|_| ()).map_err(backend)
    }
}
