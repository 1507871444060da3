//! Maintenance request entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::error::RepositoryError;
use domain::models::{MaintenanceFor, MaintenanceRequest, Priority, RequestType, Stage, Target};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for request stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_stage", rename_all = "snake_case")]
pub enum StageDb {
    New,
    InProgress,
    Repaired,
    Scrap,
}

impl From<Stage> for StageDb {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::New => Self::New,
            Stage::InProgress => Self::InProgress,
            Stage::Repaired => Self::Repaired,
            Stage::Scrap => Self::Scrap,
        }
    }
}

impl From<StageDb> for Stage {
    fn from(stage: StageDb) -> Self {
        match stage {
            StageDb::New => Stage::New,
            StageDb::InProgress => Stage::InProgress,
            StageDb::Repaired => Stage::Repaired,
            StageDb::Scrap => Stage::Scrap,
        }
    }
}

/// Database enum for request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "snake_case")]
pub enum RequestTypeDb {
    Corrective,
    Preventive,
}

impl From<RequestType> for RequestTypeDb {
    fn from(request_type: RequestType) -> Self {
        match request_type {
            RequestType::Corrective => Self::Corrective,
            RequestType::Preventive => Self::Preventive,
        }
    }
}

impl From<RequestTypeDb> for RequestType {
    fn from(request_type: RequestTypeDb) -> Self {
        match request_type {
            RequestTypeDb::Corrective => RequestType::Corrective,
            RequestTypeDb::Preventive => RequestType::Preventive,
        }
    }
}

/// Database enum for the target discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "maintenance_for", rename_all = "snake_case")]
pub enum MaintenanceForDb {
    Equipment,
    WorkCenter,
}

impl From<MaintenanceFor> for MaintenanceForDb {
    fn from(maintenance_for: MaintenanceFor) -> Self {
        match maintenance_for {
            MaintenanceFor::Equipment => Self::Equipment,
            MaintenanceFor::WorkCenter => Self::WorkCenter,
        }
    }
}

/// Database enum for request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_priority", rename_all = "snake_case")]
pub enum PriorityDb {
    Low,
    Medium,
    High,
}

impl From<Priority> for PriorityDb {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
        }
    }
}

impl From<PriorityDb> for Priority {
    fn from(priority: PriorityDb) -> Self {
        match priority {
            PriorityDb::Low => Priority::Low,
            PriorityDb::Medium => Priority::Medium,
            PriorityDb::High => Priority::High,
        }
    }
}

/// Database row mapping for the maintenance_requests table.
///
/// The target is stored as a discriminator plus two nullable foreign keys; a
/// check constraint keeps exactly the matching one set.
#[derive(Debug, Clone, FromRow)]
pub struct MaintenanceRequestEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub request_type: RequestTypeDb,
    pub maintenance_for: MaintenanceForDb,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stage: StageDb,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub priority: Option<PriorityDb>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub preventive_action: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequestEntity {
    fn target(&self) -> Option<Target> {
        match self.maintenance_for {
            MaintenanceForDb::Equipment => self.equipment_id.map(Target::Equipment),
            MaintenanceForDb::WorkCenter => self.work_center_id.map(Target::WorkCenter),
        }
    }
}

impl TryFrom<MaintenanceRequestEntity> for MaintenanceRequest {
    type Error = RepositoryError;

    fn try_from(entity: MaintenanceRequestEntity) -> Result<Self, Self::Error> {
        let target = entity.target().ok_or_else(|| {
            RepositoryError::Backend(format!(
                "Maintenance request {} has no {:?} reference",
                entity.id, entity.maintenance_for
            ))
        })?;

        Ok(MaintenanceRequest {
            id: entity.id,
            owner_id: entity.owner_id,
            subject: entity.subject,
            request_type: entity.request_type.into(),
            target,
            team_id: entity.team_id,
            category_id: entity.category_id,
            stage: entity.stage.into(),
            scheduled_date: entity.scheduled_date,
            duration_hours: entity.duration_hours,
            priority: entity.priority.map(Priority::from),
            description: entity.description,
            corrective_action: entity.corrective_action,
            preventive_action: entity.preventive_action,
            created_at: entity.created_at,
        })
    }
}
