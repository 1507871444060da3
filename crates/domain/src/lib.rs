//! Domain layer for the Maintenance Tracker.
//!
//! This crate contains:
//! - Domain models (MaintenanceRequest, Stage, reference entities)
//! - Lifecycle services (stage machine, board, calendar, editor)
//! - The repository boundary and an in-memory implementation
//! - Domain error types

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod services;
