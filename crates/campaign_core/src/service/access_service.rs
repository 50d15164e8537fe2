//! Caller-gated campaign access.
//!
//! # Invariants
//! - Only the owner and listed players may list or open a campaign.
//! - Item listings drop everything that resolves to `PermissionLevel::None`.

use crate::access::{visible_items, Categorized};
use crate::identity::Caller;
use crate::model::campaign::{Campaign, CampaignId};
use crate::model::content::{BestiaryEntry, Recipe};
use crate::model::permission::PermissionLevel;
use crate::service::coordinator::{CoordinatorError, CoordinatorResult, UpdateCoordinator};
use crate::store::CampaignStore;
use log::warn;

/// Campaigns the caller owns or plays in.
pub fn list_campaigns<S: CampaignStore>(
    store: &S,
    caller: &Caller,
) -> CoordinatorResult<Vec<Campaign>> {
    Ok(store.fetch_all_for_user(caller.username())?)
}

/// Opens a coordinator for `id` if the caller is a member.
///
/// Missing campaigns return `CoordinatorError::NotFound` before any
/// membership check so callers can redirect.
pub fn open_for_caller<S: CampaignStore>(
    store: S,
    caller: &Caller,
    id: CampaignId,
) -> CoordinatorResult<UpdateCoordinator<S>> {
    let coordinator = UpdateCoordinator::load(store, id)?;
    if !caller.can_open(coordinator.snapshot()) {
        warn!(
            "event=campaign_open module=service status=denied campaign_id={id} username={}",
            caller.username()
        );
        return Err(CoordinatorError::AccessDenied {
            username: caller.username().to_string(),
            id,
        });
    }
    Ok(coordinator)
}

/// Catalogue recipes the caller may see in this campaign.
pub fn visible_recipes<'a>(
    campaign: &Campaign,
    caller: &Caller,
    recipes: &'a [Recipe],
) -> Vec<(&'a Recipe, PermissionLevel)> {
    visible_for(campaign, caller, recipes)
}

/// Bestiary entries the caller may see in this campaign.
pub fn visible_bestiary<'a>(
    campaign: &'a Campaign,
    caller: &Caller,
) -> Vec<(&'a BestiaryEntry, PermissionLevel)> {
    visible_for(campaign, caller, &campaign.bestiary)
}

fn visible_for<'a, T: Categorized>(
    campaign: &Campaign,
    caller: &Caller,
    items: &'a [T],
) -> Vec<(&'a T, PermissionLevel)> {
    visible_items(
        items,
        campaign.policy_for(caller.username()),
        caller.is_owner_of(campaign),
    )
}
