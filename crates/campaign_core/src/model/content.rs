//! Free-form campaign content slices.
//!
//! Inventories, bestiary, notes and the recipe catalogue are edited by
//! unrelated UI surfaces; they only share the aggregate they live in.

use crate::access::Categorized;
use crate::model::permission::CategoryId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: u32,
}

/// One player's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInventory {
    /// Slot capacity configured by the DM.
    pub size: u32,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

impl Default for UserInventory {
    fn default() -> Self {
        Self {
            size: 20,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestiaryEntry {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub description: String,
}

impl BestiaryEntry {
    pub fn new(name: impl Into<String>, category_ids: Vec<CategoryId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_ids,
            description: String::new(),
        }
    }
}

impl Categorized for BestiaryEntry {
    fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: Uuid,
    pub title: String,
    pub body: String,
}

impl SessionNote {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Crafting recipe from the shared catalogue.
///
/// The catalogue lives outside the aggregate; only its visibility is
/// decided per campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category_ids: Vec<CategoryId>,
}

impl Categorized for Recipe {
    fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }
}
