//! Update coordinator for one UI surface.
//!
//! # Responsibility
//! - Hold the last campaign snapshot this surface has seen.
//! - Apply one mutation to a copy, submit the whole document, and adopt
//!   the store's echo as the new snapshot.
//!
//! # Invariants
//! - Every write is a whole-document replacement.
//! - A failed write leaves the local snapshot untouched.
//! - Sibling coordinators are never notified of each other's writes.
//! - With `WritePolicy::LastWriteWins` a stale snapshot silently
//!   overwrites newer stored fields (lost update). `RejectStale` turns
//!   that into `CoordinatorError::Conflict`.

use crate::model::campaign::{Campaign, CampaignId, CampaignValidationError};
use crate::model::content::{BestiaryEntry, SessionNote, UserInventory};
use crate::model::permission::{PermissionLevel, UserPolicy};
use crate::model::tracking::{CalendarSettings, GameDate};
use crate::model::weather::WeatherSettings;
use crate::simulation::{
    self, AdvanceOutcome, ClockStep, SimulationError, WeatherDraw, WeatherOutcome,
    WeatherRollError,
};
use crate::store::{CampaignStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// How the coordinator submits its full-document writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Unconditional overwrite; the later write wins entirely.
    #[default]
    LastWriteWins,
    /// Write carries the snapshot revision; stale writes are rejected.
    RejectStale,
}

/// Coordinator failures surfaced to the initiating UI surface.
#[derive(Debug)]
pub enum CoordinatorError {
    /// Aggregate does not exist; callers should redirect.
    NotFound(CampaignId),
    /// Caller is neither owner nor player.
    AccessDenied { username: String, id: CampaignId },
    UnknownPlayer(String),
    Validation(CampaignValidationError),
    Simulation(SimulationError),
    /// Stale snapshot under `WritePolicy::RejectStale`.
    Conflict {
        id: CampaignId,
        expected: u64,
        actual: u64,
    },
    Store(StoreError),
}

impl Display for CoordinatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "campaign not found: {id}"),
            Self::AccessDenied { username, id } => {
                write!(f, "user `{username}` may not open campaign {id}")
            }
            Self::UnknownPlayer(username) => write!(f, "player not in campaign: {username}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Simulation(err) => write!(f, "{err}"),
            Self::Conflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "campaign {id} was changed elsewhere (have revision {expected}, store has {actual})"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Simulation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoordinatorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Validation(err) => Self::Validation(err),
            StoreError::Conflict {
                id,
                expected,
                actual,
            } => Self::Conflict {
                id,
                expected,
                actual,
            },
            other => Self::Store(other),
        }
    }
}

impl From<CampaignValidationError> for CoordinatorError {
    fn from(value: CampaignValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SimulationError> for CoordinatorError {
    fn from(value: SimulationError) -> Self {
        Self::Simulation(value)
    }
}

/// Result of a persisted time advance.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceReport {
    pub steps: Vec<ClockStep>,
    /// Outcome of the last weather roll performed.
    pub weather: WeatherOutcome,
    /// Every rejected roll, in step order.
    pub weather_errors: Vec<WeatherRollError>,
}

impl AdvanceReport {
    fn from_outcomes(outcomes: Vec<AdvanceOutcome>) -> Self {
        let mut steps = Vec::with_capacity(outcomes.len());
        let mut weather_errors = Vec::new();
        let mut weather = WeatherOutcome::Unchanged;
        for outcome in outcomes {
            steps.push(outcome.step);
            if let WeatherOutcome::Rejected(err) = &outcome.weather {
                weather_errors.push(err.clone());
            }
            weather = outcome.weather;
        }
        Self {
            steps,
            weather,
            weather_errors,
        }
    }

    /// First validation failure to show the user; the clock advance was
    /// saved regardless.
    pub fn weather_error(&self) -> Option<&WeatherRollError> {
        self.weather_errors.first()
    }
}

/// Read-modify-write coordinator bound to one campaign snapshot.
pub struct UpdateCoordinator<S: CampaignStore> {
    store: S,
    snapshot: Campaign,
    policy: WritePolicy,
}

impl<S: CampaignStore> UpdateCoordinator<S> {
    /// Loads the current stored document as this surface's snapshot.
    pub fn load(store: S, id: CampaignId) -> CoordinatorResult<Self> {
        let snapshot = store.fetch(id)?;
        Ok(Self::from_snapshot(store, snapshot))
    }

    /// Creates a new default campaign owned by `owner`.
    pub fn create(
        store: S,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> CoordinatorResult<Self> {
        let snapshot = store.create(&Campaign::new(owner, name))?;
        info!(
            "event=campaign_open module=service status=ok mode=create campaign_id={} revision={}",
            snapshot.id, snapshot.revision
        );
        Ok(Self::from_snapshot(store, snapshot))
    }

    /// Wraps a snapshot the caller already holds (possibly stale).
    pub fn from_snapshot(store: S, snapshot: Campaign) -> Self {
        Self {
            store,
            snapshot,
            policy: WritePolicy::default(),
        }
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    /// Last document this surface has seen.
    pub fn snapshot(&self) -> &Campaign {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Campaign {
        self.snapshot
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.snapshot.id
    }

    /// Replaces the local snapshot with the currently stored document.
    pub fn refresh(&mut self) -> CoordinatorResult<&Campaign> {
        self.snapshot = self.store.fetch(self.snapshot.id)?;
        Ok(&self.snapshot)
    }

    /// Applies `mutate` to a copy of the snapshot and submits the whole
    /// document.
    ///
    /// # Contract
    /// - `mutate` errors abort before any I/O.
    /// - A mutation that leaves the document unchanged performs no write.
    /// - On success the echoed document becomes the snapshot.
    /// - On failure the snapshot is unchanged; there is no retry.
    pub fn submit<F>(&mut self, mutate: F) -> CoordinatorResult<&Campaign>
    where
        F: FnOnce(&mut Campaign) -> CoordinatorResult<()>,
    {
        let mut next = self.snapshot.clone();
        mutate(&mut next)?;
        let id = self.snapshot.id;
        let based_on = self.snapshot.revision;
        if next == self.snapshot {
            debug!(
                "event=campaign_submit module=service status=unchanged campaign_id={id} revision={based_on}"
            );
            return Ok(&self.snapshot);
        }
        next.validate()?;

        let result = match self.policy {
            WritePolicy::LastWriteWins => self.store.replace(id, &next),
            WritePolicy::RejectStale => self.store.replace_if_revision(id, &next, based_on),
        };

        match result {
            Ok(echoed) => {
                debug!(
                    "event=campaign_submit module=service status=ok campaign_id={id} based_on={based_on} revision={}",
                    echoed.revision
                );
                self.snapshot = echoed;
                Ok(&self.snapshot)
            }
            Err(err) => {
                warn!(
                    "event=campaign_submit module=service status=error campaign_id={id} based_on={based_on} error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Advances one time-of-day step, rolls weather, and persists
    /// `tracking`.
    ///
    /// A rejected weather roll is reported in the returned report; the
    /// clock advance is still saved.
    pub fn advance_time<D>(&mut self, draw: &mut D) -> CoordinatorResult<AdvanceReport>
    where
        D: WeatherDraw + ?Sized,
    {
        let outcome = simulation::advance_time(&self.snapshot, draw);
        let tracking = outcome.campaign.tracking.clone();
        self.submit(|campaign| {
            campaign.tracking = tracking;
            Ok(())
        })?;
        Ok(AdvanceReport::from_outcomes(vec![outcome]))
    }

    /// Advances whole days in one write.
    ///
    /// Every step runs even when weather rolls are rejected; the report
    /// lists each rejection. Zero days performs no write.
    pub fn advance_days<D>(
        &mut self,
        days: u32,
        draw: &mut D,
    ) -> CoordinatorResult<AdvanceReport>
    where
        D: WeatherDraw + ?Sized,
    {
        let (next, outcomes) = simulation::advance_days(&self.snapshot, days, draw);
        if !outcomes.is_empty() {
            self.submit(|campaign| {
                campaign.tracking = next.tracking;
                Ok(())
            })?;
        }
        Ok(AdvanceReport::from_outcomes(outcomes))
    }

    /// Switches the active weather region; never rolls weather.
    pub fn select_region(&mut self, region_id: &str) -> CoordinatorResult<&Campaign> {
        let next = simulation::select_region(&self.snapshot, region_id)?;
        self.submit(|campaign| {
            campaign.tracking = next.tracking;
            Ok(())
        })
    }

    pub fn set_date(&mut self, date: GameDate) -> CoordinatorResult<&Campaign> {
        let next = simulation::set_date(&self.snapshot, date)?;
        self.submit(|campaign| {
            campaign.tracking = next.tracking;
            Ok(())
        })
    }

    pub fn set_visibility(
        &mut self,
        show_date: bool,
        show_weather: bool,
    ) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            campaign.tracking.show_date = show_date;
            campaign.tracking.show_weather = show_weather;
            Ok(())
        })
    }

    /// Sets one category level for one player.
    pub fn set_permission(
        &mut self,
        username: &str,
        category_id: &str,
        level: PermissionLevel,
    ) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            ensure_player(campaign, username)?;
            campaign
                .user_permissions
                .entry(username.to_string())
                .or_default()
                .set(category_id, level);
            Ok(())
        })
    }

    /// Replaces a player's whole policy, writing explicit `Full` entries
    /// for every known category the new policy leaves out.
    pub fn replace_user_policy(
        &mut self,
        username: &str,
        mut policy: UserPolicy,
        known_categories: &[&str],
    ) -> CoordinatorResult<&Campaign> {
        policy.materialize(known_categories.iter().copied());
        self.submit(|campaign| {
            ensure_player(campaign, username)?;
            campaign
                .user_permissions
                .insert(username.to_string(), policy);
            Ok(())
        })
    }

    /// Adds a player with an empty inventory; the owner and existing
    /// players are left as they are, without a write.
    pub fn add_player(&mut self, username: &str) -> CoordinatorResult<&Campaign> {
        if self.snapshot.is_owner(username) {
            return Ok(&self.snapshot);
        }
        self.submit(|campaign| {
            if !campaign.is_member(username) {
                campaign.players.push(username.to_string());
            }
            campaign
                .user_inventories
                .entry(username.to_string())
                .or_insert_with(UserInventory::default);
            Ok(())
        })
    }

    /// Removes a player along with their policy and inventory.
    pub fn remove_player(&mut self, username: &str) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            ensure_player(campaign, username)?;
            campaign.players.retain(|player| player != username);
            campaign.user_permissions.remove(username);
            campaign.user_inventories.remove(username);
            Ok(())
        })
    }

    pub fn set_inventory_size(
        &mut self,
        username: &str,
        size: u32,
    ) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            ensure_player(campaign, username)?;
            campaign
                .user_inventories
                .entry(username.to_string())
                .or_default()
                .size = size;
            Ok(())
        })
    }

    /// Inserts or replaces a bestiary entry matched by id.
    pub fn upsert_bestiary_entry(&mut self, entry: BestiaryEntry) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            match campaign.bestiary.iter().position(|e| e.id == entry.id) {
                Some(index) => campaign.bestiary[index] = entry,
                None => campaign.bestiary.push(entry),
            }
            Ok(())
        })
    }

    pub fn remove_bestiary_entry(&mut self, entry_id: Uuid) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            campaign.bestiary.retain(|entry| entry.id != entry_id);
            Ok(())
        })
    }

    /// Saves the free-text DM notes (explicit save, no autosave).
    pub fn save_notes(&mut self, notes: impl Into<String>) -> CoordinatorResult<&Campaign> {
        let notes = notes.into();
        self.submit(|campaign| {
            campaign.notes = notes;
            Ok(())
        })
    }

    pub fn upsert_session_note(&mut self, note: SessionNote) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            match campaign.session_notes.iter().position(|n| n.id == note.id) {
                Some(index) => campaign.session_notes[index] = note,
                None => campaign.session_notes.push(note),
            }
            Ok(())
        })
    }

    pub fn remove_session_note(&mut self, note_id: Uuid) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            campaign.session_notes.retain(|note| note.id != note_id);
            Ok(())
        })
    }

    pub fn update_metadata(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoordinatorResult<&Campaign> {
        let name = name.into();
        let description = description.into();
        self.submit(|campaign| {
            campaign.name = name;
            campaign.description = description;
            Ok(())
        })
    }

    /// Replaces calendar thresholds; the current date must still fit.
    pub fn update_calendar_settings(
        &mut self,
        settings: CalendarSettings,
    ) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            campaign.calendar_settings = settings;
            Ok(())
        })
    }

    /// Replaces weather configuration without checking probability sums.
    ///
    /// If the selected region no longer exists, selection falls back to the
    /// first configured region (or none).
    pub fn update_weather_settings(
        &mut self,
        settings: WeatherSettings,
    ) -> CoordinatorResult<&Campaign> {
        self.submit(|campaign| {
            let selection_gone = campaign
                .tracking
                .current_region_id
                .as_deref()
                .is_some_and(|id| settings.region(id).is_none());
            if selection_gone {
                campaign.tracking.current_region_id =
                    settings.regions.first().map(|region| region.id.clone());
            }
            campaign.weather_settings = settings;
            Ok(())
        })
    }
}

fn ensure_player(campaign: &Campaign, username: &str) -> CoordinatorResult<()> {
    if campaign.players.iter().any(|player| player == username) {
        Ok(())
    } else {
        Err(CoordinatorError::UnknownPlayer(username.to_string()))
    }
}
