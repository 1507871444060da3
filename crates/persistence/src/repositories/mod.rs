//! Repository implementations for database operations.

pub mod maintenance_request;

pub use maintenance_request::PgRequestRepository;
