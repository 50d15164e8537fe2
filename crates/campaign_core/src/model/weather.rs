//! Weather configuration types.
//!
//! # Invariants
//! - A region's condition list order is significant and preserved as
//!   configured; it drives the cumulative weighted draw.
//! - Probability sums are validated lazily at roll time, not here.

use serde::{Deserialize, Serialize};

pub type RegionId = String;
pub type ConditionId = String;

/// A named weather condition available to every region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: ConditionId,
    pub name: String,
}

/// Weighted condition entry inside one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCondition {
    pub condition_id: ConditionId,
    /// Percentage in `0..=100`.
    pub probability: f64,
}

impl RegionCondition {
    pub fn new(condition_id: impl Into<ConditionId>, probability: f64) -> Self {
        Self {
            condition_id: condition_id.into(),
            probability,
        }
    }
}

/// A named area with its own weather distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<RegionCondition>,
}

impl Region {
    /// Sum of configured probabilities in list order.
    pub fn probability_sum(&self) -> f64 {
        self.conditions.iter().map(|entry| entry.probability).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSettings {
    #[serde(default)]
    pub predefined_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl WeatherSettings {
    pub fn region(&self, region_id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == region_id)
    }

    /// Display name for a condition id, falling back to the id itself.
    pub fn condition_name<'a>(&'a self, condition_id: &'a str) -> &'a str {
        self.predefined_conditions
            .iter()
            .find(|condition| condition.id == condition_id)
            .map_or(condition_id, |condition| condition.name.as_str())
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        let predefined_conditions = [
            ("sunny", "Sunny"),
            ("cloudy", "Cloudy"),
            ("rain", "Rain"),
            ("storm", "Storm"),
            ("snow", "Snow"),
        ]
        .into_iter()
        .map(|(id, name)| WeatherCondition {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();

        let temperate = Region {
            id: "temperate".to_string(),
            name: "Temperate".to_string(),
            conditions: vec![
                RegionCondition::new("sunny", 40.0),
                RegionCondition::new("cloudy", 30.0),
                RegionCondition::new("rain", 20.0),
                RegionCondition::new("storm", 10.0),
            ],
        };

        Self {
            predefined_conditions,
            regions: vec![temperate],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WeatherSettings;

    #[test]
    fn default_region_distribution_sums_to_one_hundred() {
        let settings = WeatherSettings::default();
        let region = settings.region("temperate").expect("default region");
        assert!((region.probability_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn condition_name_falls_back_to_id() {
        let settings = WeatherSettings::default();
        assert_eq!(settings.condition_name("rain"), "Rain");
        assert_eq!(settings.condition_name("hail"), "hail");
    }
}
