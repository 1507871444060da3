//! Persistence layer for the Maintenance Tracker.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The PostgreSQL request repository

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
