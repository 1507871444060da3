//! HTTP route handlers.

pub mod board;
pub mod calendar;
pub mod health;
pub mod references;
pub mod requests;
