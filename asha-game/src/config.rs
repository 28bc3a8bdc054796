//! Scalar defaults substituted when mission parameter bags omit a field.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BARTER_START_ITEM, DEFAULT_BARTER_TARGET_ITEM, DEFAULT_REFLECTION_PROMPT,
    DEFAULT_STARTING_FUNDS, INFLATION_BACKGROUND_RATE, INFLATION_EPOCH_YEAR,
    INFLATION_LOOKAHEAD_YEARS, INFLATION_SPEED_PRESETS, INFLATION_TICK_BASE_MS,
};

/// Tunable defaults shared by every simulation handler.
///
/// Every field falls back to its constant when absent from JSON, so a partial
/// override file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "SimulationDefaults::default_starting_funds")]
    pub starting_funds: i64,
    #[serde(default = "SimulationDefaults::default_barter_start_item")]
    pub barter_start_item: String,
    #[serde(default = "SimulationDefaults::default_barter_target_item")]
    pub barter_target_item: String,
    #[serde(default = "SimulationDefaults::default_inflation_start_year")]
    pub inflation_start_year: i32,
    #[serde(default = "SimulationDefaults::default_inflation_background_rate")]
    pub inflation_background_rate: f64,
    #[serde(default = "SimulationDefaults::default_inflation_lookahead_years")]
    pub inflation_lookahead_years: i32,
    #[serde(default = "SimulationDefaults::default_inflation_speed_presets")]
    pub inflation_speed_presets: Vec<u32>,
    #[serde(default = "SimulationDefaults::default_reflection_prompt")]
    pub default_reflection_prompt: String,
}

impl SimulationDefaults {
    const fn default_starting_funds() -> i64 {
        DEFAULT_STARTING_FUNDS
    }

    fn default_barter_start_item() -> String {
        DEFAULT_BARTER_START_ITEM.to_string()
    }

    fn default_barter_target_item() -> String {
        DEFAULT_BARTER_TARGET_ITEM.to_string()
    }

    const fn default_inflation_start_year() -> i32 {
        INFLATION_EPOCH_YEAR
    }

    const fn default_inflation_background_rate() -> f64 {
        INFLATION_BACKGROUND_RATE
    }

    const fn default_inflation_lookahead_years() -> i32 {
        INFLATION_LOOKAHEAD_YEARS
    }

    fn default_inflation_speed_presets() -> Vec<u32> {
        INFLATION_SPEED_PRESETS.to_vec()
    }

    fn default_reflection_prompt() -> String {
        DEFAULT_REFLECTION_PROMPT.to_string()
    }

    /// Load defaults from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Speed presets that yield a tick of at least one millisecond; falls
    /// back to the built-in presets when none remain.
    #[must_use]
    pub fn speed_presets(&self) -> Vec<u32> {
        let presets: Vec<u32> = self
            .inflation_speed_presets
            .iter()
            .copied()
            .filter(|speed| (1..=INFLATION_TICK_BASE_MS).contains(&u64::from(*speed)))
            .collect();
        if presets.is_empty() {
            Self::default_inflation_speed_presets()
        } else {
            presets
        }
    }
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            starting_funds: Self::default_starting_funds(),
            barter_start_item: Self::default_barter_start_item(),
            barter_target_item: Self::default_barter_target_item(),
            inflation_start_year: Self::default_inflation_start_year(),
            inflation_background_rate: Self::default_inflation_background_rate(),
            inflation_lookahead_years: Self::default_inflation_lookahead_years(),
            inflation_speed_presets: Self::default_inflation_speed_presets(),
            default_reflection_prompt: Self::default_reflection_prompt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_documented_defaults() {
        let defaults = SimulationDefaults::from_json("{}").unwrap();
        assert_eq!(defaults, SimulationDefaults::default());
        assert_eq!(defaults.starting_funds, 1_000);
        assert_eq!(defaults.inflation_start_year, 1900);
        assert_eq!(defaults.barter_start_item, "clay pot");
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let defaults =
            SimulationDefaults::from_json(r#"{ "starting_funds": 250, "inflation_speed_presets": [0] }"#)
                .unwrap();
        assert_eq!(defaults.starting_funds, 250);
        assert_eq!(defaults.barter_target_item, "salt block");
        assert_eq!(defaults.speed_presets(), vec![1, 2, 5, 10]);
    }

    #[test]
    fn presets_faster_than_one_millisecond_are_dropped() {
        let defaults = SimulationDefaults {
            inflation_speed_presets: vec![1, 1_000, 2_000, u32::MAX],
            ..SimulationDefaults::default()
        };
        assert_eq!(defaults.speed_presets(), vec![1, 1_000]);
    }
}
