//! Permission policy types.
//!
//! # Invariants
//! - `PermissionLevel` is a closed set; `Full` is the default variant.
//! - A category key missing from a `UserPolicy` reads as `Full`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier of an item category (recipe type, creature type...).
pub type CategoryId = String;

/// Access level a player has for items of a given category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Item is listed with full detail.
    #[default]
    Full,
    /// Item is listed; detail redaction is not applied yet.
    Partial,
    /// Item is removed from listings and search.
    None,
}

impl PermissionLevel {
    /// Stable lowercase name used in documents and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::None => "none",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "partial" => Some(Self::Partial),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Whether items at this level appear in listings.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Per-player category policy.
///
/// Ordered so that serialized documents are stable across writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserPolicy {
    levels: BTreeMap<CategoryId, PermissionLevel>,
}

impl UserPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Explicit level for one category, if configured.
    pub fn get(&self, category_id: &str) -> Option<PermissionLevel> {
        self.levels.get(category_id).copied()
    }

    /// Level for one category with the missing-key default applied.
    pub fn level_or_default(&self, category_id: &str) -> PermissionLevel {
        self.get(category_id).unwrap_or_default()
    }

    /// Sets one category level, returning the previous explicit value.
    pub fn set(
        &mut self,
        category_id: impl Into<CategoryId>,
        level: PermissionLevel,
    ) -> Option<PermissionLevel> {
        self.levels.insert(category_id.into(), level)
    }

    pub fn remove(&mut self, category_id: &str) -> Option<PermissionLevel> {
        self.levels.remove(category_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, PermissionLevel)> {
        self.levels.iter().map(|(id, level)| (id, *level))
    }

    /// Writes an explicit `Full` entry for every known category that has
    /// no entry yet, so later reads never rely on the missing-key default.
    ///
    /// Returns how many entries were added.
    pub fn materialize<'a, I>(&mut self, known_categories: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for category_id in known_categories {
            if !self.levels.contains_key(category_id) {
                self.levels
                    .insert(category_id.to_string(), PermissionLevel::Full);
                added += 1;
            }
        }
        added
    }
}

impl FromIterator<(CategoryId, PermissionLevel)> for UserPolicy {
    fn from_iter<T: IntoIterator<Item = (CategoryId, PermissionLevel)>>(iter: T) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

/// Mapping username -> category policy.
pub type UserPermissions = BTreeMap<String, UserPolicy>;

#[cfg(test)]
mod tests {
    use super::{PermissionLevel, UserPolicy};

    #[test]
    fn level_parse_is_case_insensitive() {
        assert_eq!(PermissionLevel::parse(" Partial "), Some(PermissionLevel::Partial));
        assert_eq!(PermissionLevel::parse("NONE"), Some(PermissionLevel::None));
        assert_eq!(PermissionLevel::parse("read"), None);
    }

    #[test]
    fn missing_key_defaults_to_full() {
        let mut policy = UserPolicy::new();
        policy.set("potions", PermissionLevel::None);
        assert_eq!(policy.level_or_default("potions"), PermissionLevel::None);
        assert_eq!(policy.level_or_default("scrolls"), PermissionLevel::Full);
    }

    #[test]
    fn materialize_only_fills_missing_entries() {
        let mut policy = UserPolicy::new();
        policy.set("potions", PermissionLevel::Partial);

        let added = policy.materialize(["potions", "scrolls", "weapons"]);

        assert_eq!(added, 2);
        assert_eq!(policy.get("potions"), Some(PermissionLevel::Partial));
        assert_eq!(policy.get("scrolls"), Some(PermissionLevel::Full));
        assert_eq!(policy.get("weapons"), Some(PermissionLevel::Full));
    }

    #[test]
    fn policy_serializes_as_plain_map() {
        let mut policy = UserPolicy::new();
        policy.set("potions", PermissionLevel::None);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"potions":"none"}"#);
    }
}
