//! Weighted weather roll.
//!
//! # Invariants
//! - Each probability is finite and within `0..=100`, and a region's
//!   probabilities sum to 100 (within `PROBABILITY_TOLERANCE`) at roll time;
//!   configuration edits are never checked.
//! - Conditions are walked in configured order; the first whose running
//!   total is `>= draw` wins.
//! - Identical configuration and identical draw always pick the same
//!   condition.

use crate::model::campaign::Campaign;
use crate::model::weather::{ConditionId, Region, RegionCondition, RegionId};
use log::warn;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Allowed absolute deviation of a region's probability sum from 100.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

const DRAW_UPPER_BOUND: f64 = 100.0;

/// Source of uniform draws in `[0, 100)`.
pub trait WeatherDraw {
    fn draw_percent(&mut self) -> f64;
}

/// Adapts any `rand` generator into a weather draw source.
///
/// Seed a `rand_chacha` generator for reproducible campaigns.
#[derive(Debug, Clone)]
pub struct RandomDraw<R> {
    rng: R,
}

impl<R: Rng> RandomDraw<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> WeatherDraw for RandomDraw<R> {
    fn draw_percent(&mut self) -> f64 {
        self.rng.random_range(0.0..DRAW_UPPER_BOUND)
    }
}

/// Always returns the same draw; used by deterministic callers and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraw {
    value: f64,
}

impl FixedDraw {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl WeatherDraw for FixedDraw {
    fn draw_percent(&mut self) -> f64 {
        self.value
    }
}

/// Non-fatal weather roll failures.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherRollError {
    /// Selected region id has no matching configuration.
    UnknownRegion(RegionId),
    /// One entry is NaN, infinite, or outside `0..=100`.
    ProbabilityOutOfRange {
        region_id: RegionId,
        condition_id: ConditionId,
        probability: f64,
    },
    /// Region probabilities do not add up to 100.
    ProbabilitySum { region_id: RegionId, sum: f64 },
}

impl Display for WeatherRollError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRegion(id) => write!(f, "weather region not found: {id}"),
            Self::ProbabilityOutOfRange {
                region_id,
                condition_id,
                probability,
            } => write!(
                f,
                "weather probability {probability} for `{condition_id}` in `{region_id}` is out of range"
            ),
            Self::ProbabilitySum { region_id, sum } => write!(
                f,
                "weather probabilities for region `{region_id}` sum to {sum}, expected 100"
            ),
        }
    }
}

impl Error for WeatherRollError {}

/// What the weather roll did to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Rolled {
        condition_id: ConditionId,
        condition_name: String,
        draw: f64,
    },
    /// No region selected, or the region has no conditions.
    Unchanged,
    /// Validation failed; previous weather retained.
    Rejected(WeatherRollError),
}

/// Checks each probability's range, then that they sum to 100.
pub fn validate_region(region: &Region) -> Result<(), WeatherRollError> {
    let out_of_range = region
        .conditions
        .iter()
        .find(|entry| !(0.0..=DRAW_UPPER_BOUND).contains(&entry.probability));
    if let Some(entry) = out_of_range {
        return Err(WeatherRollError::ProbabilityOutOfRange {
            region_id: region.id.clone(),
            condition_id: entry.condition_id.clone(),
            probability: entry.probability,
        });
    }

    let sum = region.probability_sum();
    if (sum - DRAW_UPPER_BOUND).abs() > PROBABILITY_TOLERANCE {
        return Err(WeatherRollError::ProbabilitySum {
            region_id: region.id.clone(),
            sum,
        });
    }
    Ok(())
}

/// Picks the first condition whose cumulative probability is `>= draw`.
///
/// Falls back to the last condition when accumulated float error leaves
/// the draw just above the final running total.
pub fn select_condition(conditions: &[RegionCondition], draw: f64) -> Option<&RegionCondition> {
    let mut cumulative = 0.0;
    for entry in conditions {
        cumulative += entry.probability;
        if cumulative >= draw {
            return Some(entry);
        }
    }
    conditions.last()
}

/// Rolls weather for the campaign's selected region.
///
/// Draws from `draw` only when the region is valid and non-empty.
pub fn roll_weather<D>(campaign: &Campaign, draw: &mut D) -> WeatherOutcome
where
    D: WeatherDraw + ?Sized,
{
    let Some(region_id) = campaign.tracking.current_region_id.as_deref() else {
        return WeatherOutcome::Unchanged;
    };
    let settings = &campaign.weather_settings;
    let Some(region) = settings.region(region_id) else {
        let err = WeatherRollError::UnknownRegion(region_id.to_string());
        warn!(
            "event=weather_roll module=simulation status=rejected campaign_id={} error={}",
            campaign.id,
            err
        );
        return WeatherOutcome::Rejected(err);
    };
    if region.conditions.is_empty() {
        return WeatherOutcome::Unchanged;
    }
    if let Err(err) = validate_region(region) {
        warn!(
            "event=weather_roll module=simulation status=rejected campaign_id={} error={}",
            campaign.id,
            err
        );
        return WeatherOutcome::Rejected(err);
    }

    let value = draw.draw_percent();
    match select_condition(&region.conditions, value) {
        Some(entry) => WeatherOutcome::Rolled {
            condition_id: entry.condition_id.clone(),
            condition_name: settings.condition_name(&entry.condition_id).to_string(),
            draw: value,
        },
        None => WeatherOutcome::Unchanged,
    }
}
