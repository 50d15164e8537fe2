//! Category-based permission resolver.
//!
//! Precedence is `none > partial > full`. A `none` category is absorbing,
//! a missing key reads as `full`, and an empty policy grants `full`.

use crate::access::Categorized;
use crate::identity::Caller;
use crate::model::campaign::Campaign;
use crate::model::permission::{PermissionLevel, UserPolicy};

/// Resolves the effective level of an item for one user.
///
/// # Contract
/// - `is_owner` bypasses the policy entirely.
/// - Missing or empty policy yields `Full`.
/// - The first `None` category short-circuits; otherwise any `Partial`
///   wins over `Full`.
/// - An item with no categories resolves to `Full`.
pub fn resolve_permission<S>(
    category_ids: &[S],
    policy: Option<&UserPolicy>,
    is_owner: bool,
) -> PermissionLevel
where
    S: AsRef<str>,
{
    if is_owner {
        return PermissionLevel::Full;
    }
    let policy = match policy {
        Some(policy) if !policy.is_empty() => policy,
        _ => return PermissionLevel::Full,
    };

    let mut effective = PermissionLevel::Full;
    for category_id in category_ids {
        match policy.level_or_default(category_id.as_ref()) {
            PermissionLevel::None => return PermissionLevel::None,
            PermissionLevel::Partial => effective = PermissionLevel::Partial,
            PermissionLevel::Full => {}
        }
    }
    effective
}

/// Resolves an item for the given caller inside one campaign.
pub fn resolve_for_caller<S>(
    campaign: &Campaign,
    caller: &Caller,
    category_ids: &[S],
) -> PermissionLevel
where
    S: AsRef<str>,
{
    resolve_permission(
        category_ids,
        campaign.policy_for(caller.username()),
        caller.is_owner_of(campaign),
    )
}

/// Returns items visible under the policy together with their level.
///
/// Items resolving to `None` are dropped; input order is kept.
pub fn visible_items<'a, T>(
    items: &'a [T],
    policy: Option<&UserPolicy>,
    is_owner: bool,
) -> Vec<(&'a T, PermissionLevel)>
where
    T: Categorized,
{
    items
        .iter()
        .filter_map(|item| {
            let level = resolve_permission(item.category_ids(), policy, is_owner);
            level.is_visible().then_some((item, level))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{resolve_permission, visible_items};
    use crate::model::content::Recipe;
    use crate::model::permission::{PermissionLevel, UserPolicy};

    fn policy(entries: &[(&str, PermissionLevel)]) -> UserPolicy {
        entries
            .iter()
            .map(|(id, level)| (id.to_string(), *level))
            .collect()
    }

    fn recipe(id: &str, categories: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: id.to_string(),
            category_ids: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn owner_bypasses_restrictive_policy() {
        let p = policy(&[("potions", PermissionLevel::None)]);
        assert_eq!(
            resolve_permission(&["potions"], Some(&p), true),
            PermissionLevel::Full
        );
    }

    #[test]
    fn missing_or_empty_policy_is_default_open() {
        let empty = UserPolicy::new();
        assert_eq!(
            resolve_permission(&["potions"], None, false),
            PermissionLevel::Full
        );
        assert_eq!(
            resolve_permission(&["potions"], Some(&empty), false),
            PermissionLevel::Full
        );
    }

    #[test]
    fn none_is_absorbing_in_any_position() {
        let p = policy(&[
            ("potions", PermissionLevel::Partial),
            ("poisons", PermissionLevel::None),
        ]);
        assert_eq!(
            resolve_permission(&["poisons", "potions"], Some(&p), false),
            PermissionLevel::None
        );
        assert_eq!(
            resolve_permission(&["potions", "herbs", "poisons"], Some(&p), false),
            PermissionLevel::None
        );
    }

    #[test]
    fn partial_dominates_full_and_absent_keys() {
        let p = policy(&[
            ("potions", PermissionLevel::Partial),
            ("herbs", PermissionLevel::Full),
        ]);
        assert_eq!(
            resolve_permission(&["herbs", "potions", "unlisted"], Some(&p), false),
            PermissionLevel::Partial
        );
        assert_eq!(
            resolve_permission(&["potions", "herbs"], Some(&p), false),
            PermissionLevel::Partial
        );
    }

    #[test]
    fn all_full_or_absent_resolves_full() {
        let p = policy(&[("herbs", PermissionLevel::Full)]);
        assert_eq!(
            resolve_permission(&["herbs", "unlisted"], Some(&p), false),
            PermissionLevel::Full
        );
    }

    #[test]
    fn zero_categories_resolve_full() {
        let p = policy(&[("herbs", PermissionLevel::None)]);
        let none: [&str; 0] = [];
        assert_eq!(
            resolve_permission(&none, Some(&p), false),
            PermissionLevel::Full
        );
    }

    #[test]
    fn visible_items_drops_none_and_keeps_order() {
        let p = policy(&[
            ("poisons", PermissionLevel::None),
            ("potions", PermissionLevel::Partial),
        ]);
        let recipes = vec![
            recipe("antidote", &["potions"]),
            recipe("wyvern-venom", &["poisons", "potions"]),
            recipe("bread", &["food"]),
        ];

        let visible = visible_items(&recipes, Some(&p), false);
        let ids: Vec<_> = visible
            .iter()
            .map(|(item, level)| (item.id.as_str(), *level))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("antidote", PermissionLevel::Partial),
                ("bread", PermissionLevel::Full),
            ]
        );
    }
}
