//! Time and weather simulation over the campaign aggregate.
//!
//! # Responsibility
//! - Advance the four-step clock and roll the calendar over.
//! - Roll region weather with a weighted, order-sensitive draw.
//! - Produce next document states; persistence is the caller's job.
//!
//! # Invariants
//! - Transforms never mutate their input campaign.
//! - A rejected weather roll never blocks the clock advance.
//! - Region selection never rolls weather.

pub mod clock;
pub mod weather;

use crate::model::campaign::Campaign;
use crate::model::tracking::{GameDate, TimeOfDay};
use crate::model::weather::RegionId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use clock::{advance_clock, ClockStep};
pub use weather::{
    roll_weather, select_condition, validate_region, FixedDraw, RandomDraw, WeatherDraw,
    WeatherOutcome, WeatherRollError, PROBABILITY_TOLERANCE,
};

const STEPS_PER_DAY: u32 = TimeOfDay::CYCLE.len() as u32;

/// Rejected explicit simulation commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    UnknownRegion(RegionId),
    DateOutsideCalendar(GameDate),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRegion(id) => write!(f, "weather region not found: {id}"),
            Self::DateOutsideCalendar(date) => {
                write!(f, "date {date} is outside the configured calendar")
            }
        }
    }
}

impl Error for SimulationError {}

/// Result of one `advance_time` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceOutcome {
    /// Next document state with clock and (maybe) weather applied.
    pub campaign: Campaign,
    pub step: ClockStep,
    pub weather: WeatherOutcome,
}

impl AdvanceOutcome {
    /// Validation failure to surface to the user, if the roll was rejected.
    pub fn weather_error(&self) -> Option<&WeatherRollError> {
        match &self.weather {
            WeatherOutcome::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// Advances the campaign by one time-of-day step and rolls weather.
///
/// # Contract
/// - Exactly one clock step; only night -> morning moves the date.
/// - Weather is rolled on every call against the selected region.
/// - A region whose probabilities do not sum to 100 keeps the previous
///   weather and reports `WeatherOutcome::Rejected`.
pub fn advance_time<D>(campaign: &Campaign, draw: &mut D) -> AdvanceOutcome
where
    D: WeatherDraw + ?Sized,
{
    let mut next = campaign.clone();
    let step = advance_clock(&mut next.tracking, &next.calendar_settings);
    let weather = roll_weather(&next, draw);
    if let WeatherOutcome::Rolled { condition_name, .. } = &weather {
        next.tracking.current_weather = Some(condition_name.clone());
    }

    AdvanceOutcome {
        campaign: next,
        step,
        weather,
    }
}

/// Advances whole days (four steps each).
///
/// Rejected weather rolls never cut the advance short; every step runs and
/// each outcome, rejected or not, is returned in order with the final state.
pub fn advance_days<D>(
    campaign: &Campaign,
    days: u32,
    draw: &mut D,
) -> (Campaign, Vec<AdvanceOutcome>)
where
    D: WeatherDraw + ?Sized,
{
    let mut current = campaign.clone();
    let mut outcomes = Vec::new();
    let steps = days.saturating_mul(STEPS_PER_DAY);
    for _ in 0..steps {
        let outcome = advance_time(&current, draw);
        current = outcome.campaign.clone();
        outcomes.push(outcome);
    }
    (current, outcomes)
}

/// Selects the active weather region without rolling weather.
pub fn select_region(campaign: &Campaign, region_id: &str) -> Result<Campaign, SimulationError> {
    if campaign.weather_settings.region(region_id).is_none() {
        return Err(SimulationError::UnknownRegion(region_id.to_string()));
    }
    let mut next = campaign.clone();
    next.tracking.current_region_id = Some(region_id.to_string());
    Ok(next)
}

/// Jumps the calendar to an explicit date inside the configured calendar.
pub fn set_date(campaign: &Campaign, date: GameDate) -> Result<Campaign, SimulationError> {
    if !campaign.calendar_settings.contains(&date) {
        return Err(SimulationError::DateOutsideCalendar(date));
    }
    let mut next = campaign.clone();
    next.tracking.current_date = date;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::{advance_days, advance_time, select_region, set_date, FixedDraw, SimulationError};
    use crate::model::campaign::Campaign;
    use crate::model::tracking::{GameDate, TimeOfDay};
    use crate::model::weather::RegionCondition;

    fn campaign() -> Campaign {
        Campaign::new("dm", "Test")
    }

    #[test]
    fn four_steps_from_morning_return_to_morning_next_day() {
        let mut current = campaign();
        current.tracking.current_date = GameDate::new(5, 3, 2);
        let mut draw = FixedDraw::new(10.0);
        for _ in 0..4 {
            current = advance_time(&current, &mut draw).campaign;
        }
        assert_eq!(current.tracking.current_time_of_day, TimeOfDay::Morning);
        assert_eq!(current.tracking.current_date, GameDate::new(6, 3, 2));
    }

    #[test]
    fn advance_does_not_mutate_input() {
        let original = campaign();
        let outcome = advance_time(&original, &mut FixedDraw::new(10.0));
        assert_eq!(original.tracking.current_time_of_day, TimeOfDay::Morning);
        assert_eq!(outcome.campaign.tracking.current_time_of_day, TimeOfDay::Noon);
    }

    #[test]
    fn weather_rolls_on_every_step_not_only_day_rollover() {
        let original = campaign();
        let outcome = advance_time(&original, &mut FixedDraw::new(95.0));
        assert_eq!(outcome.campaign.tracking.current_date, GameDate::new(1, 1, 1));
        assert_eq!(
            outcome.campaign.tracking.current_weather.as_deref(),
            Some("Storm")
        );
    }

    #[test]
    fn invalid_region_keeps_weather_but_still_advances_clock() {
        let mut start = campaign();
        start.tracking.current_weather = Some("Sunny".to_string());
        start.tracking.current_time_of_day = TimeOfDay::Night;
        start.weather_settings.regions[0].conditions = vec![
            RegionCondition::new("sunny", 50.0),
            RegionCondition::new("rain", 40.0),
        ];

        let outcome = advance_time(&start, &mut FixedDraw::new(10.0));

        assert!(outcome.weather_error().is_some());
        assert_eq!(
            outcome.campaign.tracking.current_weather.as_deref(),
            Some("Sunny")
        );
        assert_eq!(outcome.campaign.tracking.current_time_of_day, TimeOfDay::Morning);
        assert_eq!(outcome.campaign.tracking.current_date, GameDate::new(2, 1, 1));
    }

    #[test]
    fn advance_days_runs_every_step_past_rejected_rolls() {
        let mut start = campaign();
        start.tracking.current_weather = Some("Cloudy".to_string());
        start.weather_settings.regions[0].conditions = vec![RegionCondition::new("sunny", 90.0)];

        let (end, outcomes) = advance_days(&start, 3, &mut FixedDraw::new(1.0));

        assert_eq!(outcomes.len(), 12);
        assert!(outcomes.iter().all(|outcome| outcome.weather_error().is_some()));
        assert_eq!(end.tracking.current_date, GameDate::new(4, 1, 1));
        assert_eq!(end.tracking.current_time_of_day, TimeOfDay::Morning);
        assert_eq!(end.tracking.current_weather.as_deref(), Some("Cloudy"));
    }

    #[test]
    fn advance_days_zero_returns_input_unchanged() {
        let start = campaign();
        let (end, outcomes) = advance_days(&start, 0, &mut FixedDraw::new(1.0));
        assert!(outcomes.is_empty());
        assert_eq!(end, start);
    }

    #[test]
    fn advance_days_moves_whole_days() {
        let (end, outcomes) = advance_days(&campaign(), 3, &mut FixedDraw::new(1.0));
        assert_eq!(outcomes.len(), 12);
        assert_eq!(end.tracking.current_date, GameDate::new(4, 1, 1));
        assert_eq!(end.tracking.current_time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn select_region_never_rolls_weather() {
        let mut start = campaign();
        start.weather_settings.regions.push(crate::model::weather::Region {
            id: "desert".to_string(),
            name: "Desert".to_string(),
            conditions: vec![RegionCondition::new("sunny", 100.0)],
        });

        let next = select_region(&start, "desert").unwrap();

        assert_eq!(next.tracking.current_region_id.as_deref(), Some("desert"));
        assert_eq!(next.tracking.current_weather, None);
        assert_eq!(next.tracking.current_time_of_day, start.tracking.current_time_of_day);
    }

    #[test]
    fn select_region_rejects_unknown_id() {
        let err = select_region(&campaign(), "moon").unwrap_err();
        assert_eq!(err, SimulationError::UnknownRegion("moon".to_string()));
    }

    #[test]
    fn set_date_validates_against_calendar() {
        let start = campaign();
        assert!(set_date(&start, GameDate::new(30, 12, 9)).is_ok());
        assert!(matches!(
            set_date(&start, GameDate::new(1, 13, 9)),
            Err(SimulationError::DateOutsideCalendar(_))
        ));
    }
}
