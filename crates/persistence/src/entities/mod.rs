//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod maintenance_request;
pub mod reference;

pub use maintenance_request::{
    MaintenanceForDb, MaintenanceRequestEntity, PriorityDb, RequestTypeDb, StageDb,
};
pub use reference::{EquipmentEntity, ReferenceNameEntity};
