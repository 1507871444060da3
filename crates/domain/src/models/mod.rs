//! Domain models for the Maintenance Tracker.

pub mod maintenance_request;
pub mod reference;
pub mod stage;

pub use maintenance_request::{
    MaintenanceFor, MaintenanceRequest, NewMaintenanceRequest, Priority, RequestFilter,
    RequestPatch, RequestType, Target,
};
pub use reference::{Equipment, ReferenceDirectory, ReferenceEntity, ReferenceKind};
pub use stage::Stage;
