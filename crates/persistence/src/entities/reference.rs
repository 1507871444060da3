//! Reference entities (equipment, work centers, teams, categories).

use domain::models::{Equipment, ReferenceEntity};
use sqlx::FromRow;
use uuid::Uuid;

/// `id, name` projection shared by every reference table.
#[derive(Debug, Clone, FromRow)]
pub struct ReferenceNameEntity {
    pub id: Uuid,
    pub name: String,
}

impl From<ReferenceNameEntity> for ReferenceEntity {
    fn from(entity: ReferenceNameEntity) -> Self {
        ReferenceEntity {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// Database row mapping for the equipment table.
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
}

impl From<EquipmentEntity> for Equipment {
    fn from(entity: EquipmentEntity) -> Self {
        Equipment {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            serial_number: entity.serial_number,
            category_id: entity.category_id,
            maintenance_team_id: entity.maintenance_team_id,
        }
    }
}
