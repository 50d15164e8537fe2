//! Campaign aggregate domain model.
//!
//! # Responsibility
//! - Define the single root document shared by every campaign UI surface.
//! - Keep per-slice types (tracking, settings, permissions, content) close
//!   to the aggregate that owns them.
//!
//! # Invariants
//! - Every aggregate is identified by a stable `CampaignId`.
//! - The aggregate is always persisted as a whole document.

pub mod campaign;
pub mod content;
pub mod permission;
pub mod tracking;
pub mod weather;
