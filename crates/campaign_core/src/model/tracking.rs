//! Calendar and clock state.
//!
//! # Responsibility
//! - Define the in-game date, time-of-day cycle and calendar thresholds.
//!
//! # Invariants
//! - `TimeOfDay` cycles morning -> noon -> evening -> night -> morning.
//! - Day/month numbering is 1-based.
//! - `days_per_month` and `months_per_year` are at least 1.

use crate::model::weather::RegionId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Four-step time-of-day cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// All states in cycle order.
    pub const CYCLE: [TimeOfDay; 4] = [Self::Morning, Self::Noon, Self::Evening, Self::Night];

    /// Next state in the cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Morning => Self::Noon,
            Self::Noon => Self::Evening,
            Self::Evening => Self::Night,
            Self::Night => Self::Morning,
        }
    }

    /// Whether stepping from `self` starts a new day.
    pub fn wraps_day(self) -> bool {
        matches!(self, Self::Night)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// In-game calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameDate {
    pub day: u32,
    pub month: u32,
    pub year: i64,
}

impl GameDate {
    pub fn new(day: u32, month: u32, year: i64) -> Self {
        Self { day, month, year }
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl Display for GameDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.month, self.year)
    }
}

/// Per-campaign calendar thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub days_per_month: u32,
    pub months_per_year: u32,
    pub year_name: String,
}

impl CalendarSettings {
    /// Whether `date` fits inside this calendar.
    pub fn contains(&self, date: &GameDate) -> bool {
        (1..=self.days_per_month).contains(&date.day)
            && (1..=self.months_per_year).contains(&date.month)
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            days_per_month: 30,
            months_per_year: 12,
            year_name: "Year".to_string(),
        }
    }
}

/// Live tracking state shown on the DM tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub current_date: GameDate,
    pub current_time_of_day: TimeOfDay,
    #[serde(default)]
    pub current_weather: Option<String>,
    #[serde(default)]
    pub current_region_id: Option<RegionId>,
    /// Players see the date on their view.
    #[serde(default = "default_visible")]
    pub show_date: bool,
    /// Players see the weather on their view.
    #[serde(default = "default_visible")]
    pub show_weather: bool,
}

fn default_visible() -> bool {
    true
}

impl Default for Tracking {
    fn default() -> Self {
        Self {
            current_date: GameDate::default(),
            current_time_of_day: TimeOfDay::Morning,
            current_weather: None,
            current_region_id: None,
            show_date: true,
            show_weather: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarSettings, GameDate, TimeOfDay};

    #[test]
    fn time_of_day_cycles_in_fixed_order() {
        let mut state = TimeOfDay::Morning;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(state);
            state = state.next();
        }
        assert_eq!(seen, TimeOfDay::CYCLE.to_vec());
        assert_eq!(state, TimeOfDay::Morning);
    }

    #[test]
    fn only_night_wraps_the_day() {
        let wrapping: Vec<_> = TimeOfDay::CYCLE
            .iter()
            .filter(|state| state.wraps_day())
            .collect();
        assert_eq!(wrapping, vec![&TimeOfDay::Night]);
    }

    #[test]
    fn calendar_contains_checks_both_bounds() {
        let calendar = CalendarSettings::default();
        assert!(calendar.contains(&GameDate::new(30, 12, 4)));
        assert!(!calendar.contains(&GameDate::new(31, 1, 1)));
        assert!(!calendar.contains(&GameDate::new(1, 0, 1)));
    }
}
