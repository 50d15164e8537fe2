//! Campaign use-case services.
//!
//! # Responsibility
//! - Funnel every UI mutation through one read-modify-write coordinator.
//! - Gate which aggregates a caller may list and open.
//!
//! # See also
//! - `store` for the persistence contract the coordinator writes through.

pub mod access_service;
pub mod coordinator;
