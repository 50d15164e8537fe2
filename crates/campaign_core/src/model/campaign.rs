//! Campaign aggregate root.
//!
//! # Responsibility
//! - Define the whole-document shape persisted by the aggregate store.
//! - Provide default construction and structural validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another campaign.
//! - `owner` is the campaign creator and always resolves to full access.
//! - `revision` is assigned by the store; callers never bump it.
//! - Region probability sums are not checked by `validate()`.

use crate::model::content::{BestiaryEntry, SessionNote, UserInventory};
use crate::model::permission::{UserPermissions, UserPolicy};
use crate::model::tracking::{CalendarSettings, Tracking};
use crate::model::weather::WeatherSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one campaign aggregate.
pub type CampaignId = Uuid;

/// Single root document holding all per-campaign state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Username of the Dungeon Master who created the campaign.
    pub owner: String,
    #[serde(default)]
    pub players: Vec<String>,
    pub tracking: Tracking,
    pub calendar_settings: CalendarSettings,
    pub weather_settings: WeatherSettings,
    #[serde(default)]
    pub user_permissions: UserPermissions,
    #[serde(default)]
    pub user_inventories: BTreeMap<String, UserInventory>,
    #[serde(default)]
    pub bestiary: Vec<BestiaryEntry>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session_notes: Vec<SessionNote>,
    /// Store-assigned write counter; 0 until first persisted.
    #[serde(default)]
    pub revision: u64,
}

/// Structural validation failures for a campaign document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignValidationError {
    BlankName,
    BlankOwner,
    InvalidCalendar {
        days_per_month: u32,
        months_per_year: u32,
    },
    DateOutsideCalendar(String),
    DuplicateRegion(String),
    UnknownSelectedRegion(String),
}

impl Display for CampaignValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "campaign name must not be blank"),
            Self::BlankOwner => write!(f, "campaign owner must not be blank"),
            Self::InvalidCalendar {
                days_per_month,
                months_per_year,
            } => write!(
                f,
                "calendar needs at least one day and month, got days_per_month={days_per_month} months_per_year={months_per_year}"
            ),
            Self::DateOutsideCalendar(date) => {
                write!(f, "current date {date} is outside the configured calendar")
            }
            Self::DuplicateRegion(id) => write!(f, "duplicate weather region id: {id}"),
            Self::UnknownSelectedRegion(id) => {
                write!(f, "selected region does not exist: {id}")
            }
        }
    }
}

impl Error for CampaignValidationError {}

impl Campaign {
    /// Creates the default document a DM starts a campaign with.
    ///
    /// # Invariants
    /// - Date is day 1 of month 1, year 1, in the morning.
    /// - The first default region is selected and no weather is rolled.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, name)
    }

    /// Creates the default document with a caller-provided stable ID.
    pub fn with_id(id: CampaignId, owner: impl Into<String>, name: impl Into<String>) -> Self {
        let weather_settings = WeatherSettings::default();
        let tracking = Tracking {
            current_region_id: weather_settings.regions.first().map(|r| r.id.clone()),
            ..Tracking::default()
        };

        Self {
            id,
            name: name.into(),
            description: String::new(),
            owner: owner.into(),
            players: Vec::new(),
            tracking,
            calendar_settings: CalendarSettings::default(),
            weather_settings,
            user_permissions: UserPermissions::new(),
            user_inventories: BTreeMap::new(),
            bestiary: Vec::new(),
            notes: String::new(),
            session_notes: Vec::new(),
            revision: 0,
        }
    }

    /// Validates structural invariants before a write.
    pub fn validate(&self) -> Result<(), CampaignValidationError> {
        if self.name.trim().is_empty() {
            return Err(CampaignValidationError::BlankName);
        }
        if self.owner.trim().is_empty() {
            return Err(CampaignValidationError::BlankOwner);
        }

        let calendar = &self.calendar_settings;
        if calendar.days_per_month == 0 || calendar.months_per_year == 0 {
            return Err(CampaignValidationError::InvalidCalendar {
                days_per_month: calendar.days_per_month,
                months_per_year: calendar.months_per_year,
            });
        }
        if !calendar.contains(&self.tracking.current_date) {
            return Err(CampaignValidationError::DateOutsideCalendar(
                self.tracking.current_date.to_string(),
            ));
        }

        let mut region_ids = HashSet::new();
        for region in &self.weather_settings.regions {
            if !region_ids.insert(region.id.as_str()) {
                return Err(CampaignValidationError::DuplicateRegion(region.id.clone()));
            }
        }
        if let Some(region_id) = &self.tracking.current_region_id {
            if !region_ids.contains(region_id.as_str()) {
                return Err(CampaignValidationError::UnknownSelectedRegion(
                    region_id.clone(),
                ));
            }
        }

        Ok(())
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.owner == username
    }

    /// Owner or listed player.
    pub fn is_member(&self, username: &str) -> bool {
        self.is_owner(username) || self.players.iter().any(|player| player == username)
    }

    /// Policy map for one user; empty when none is configured.
    pub fn policy_for(&self, username: &str) -> Option<&UserPolicy> {
        self.user_permissions.get(username)
    }

    /// All usernames that may open this campaign.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.owner.as_str()).chain(self.players.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::{Campaign, CampaignValidationError};
    use crate::model::tracking::GameDate;

    #[test]
    fn new_campaign_is_valid_and_selects_default_region() {
        let campaign = Campaign::new("dm", "Lost Mines");
        assert!(campaign.validate().is_ok());
        assert_eq!(
            campaign.tracking.current_region_id.as_deref(),
            Some("temperate")
        );
        assert_eq!(campaign.tracking.current_weather, None);
        assert_eq!(campaign.revision, 0);
    }

    #[test]
    fn validate_rejects_zero_length_calendar() {
        let mut campaign = Campaign::new("dm", "Lost Mines");
        campaign.calendar_settings.days_per_month = 0;
        assert!(matches!(
            campaign.validate(),
            Err(CampaignValidationError::InvalidCalendar { .. })
        ));
    }

    #[test]
    fn validate_rejects_date_outside_calendar() {
        let mut campaign = Campaign::new("dm", "Lost Mines");
        campaign.tracking.current_date = GameDate::new(31, 1, 1);
        assert!(matches!(
            campaign.validate(),
            Err(CampaignValidationError::DateOutsideCalendar(_))
        ));
    }

    #[test]
    fn validate_ignores_region_probability_sums() {
        let mut campaign = Campaign::new("dm", "Lost Mines");
        campaign.weather_settings.regions[0].conditions[0].probability = 5.0;
        assert!(campaign.validate().is_ok());
    }

    #[test]
    fn document_uses_camel_case_field_names() {
        let campaign = Campaign::new("dm", "Lost Mines");
        let value = serde_json::to_value(&campaign).unwrap();
        assert!(value["tracking"]["currentDate"].is_object());
        assert_eq!(value["tracking"]["currentTimeOfDay"], "morning");
        assert_eq!(value["calendarSettings"]["daysPerMonth"], 30);
        assert!(value["weatherSettings"]["predefinedConditions"].is_array());
    }

    #[test]
    fn membership_covers_owner_and_players() {
        let mut campaign = Campaign::new("dm", "Lost Mines");
        campaign.players.push("alice".to_string());
        assert!(campaign.is_member("dm"));
        assert!(campaign.is_member("alice"));
        assert!(!campaign.is_member("mallory"));
    }
}
