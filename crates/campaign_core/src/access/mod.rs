//! Player access resolution over categorized items.
//!
//! # Responsibility
//! - Decide the effective `PermissionLevel` of one item for one player.
//! - Filter item listings down to what a player may see.
//!
//! # Invariants
//! - Resolution is pure and total; it never fails.
//! - Campaign owners always resolve to `Full`.

pub mod resolver;

use crate::model::permission::CategoryId;

pub use resolver::{resolve_for_caller, resolve_permission, visible_items};

/// Items whose visibility is governed by their category set.
pub trait Categorized {
    fn category_ids(&self) -> &[CategoryId];
}
