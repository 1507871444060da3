//! Shared utilities and common types for the Maintenance Tracker backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Calendar date normalization
//! - Common validation logic for request fields

pub mod dates;
pub mod validation;
