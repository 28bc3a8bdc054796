//! Centralized tuning constants for Asha's Bitcoin Journey mission logic.
//!
//! These values define the deterministic math for every simulation. The
//! serde-backed [`SimulationDefaults`](crate::config::SimulationDefaults)
//! falls back to them whenever a configuration file omits a field.

// Journey log keys ---------------------------------------------------------
pub(crate) const LOG_JOURNEY_START: &str = "log.route.start";
pub(crate) const LOG_JOURNEY_LEG: &str = "log.route.leg";
pub(crate) const LOG_BARTER_TRADE: &str = "log.barter.trade";

// Lifecycle progress -------------------------------------------------------
pub(crate) const PROGRESS_INTRO_PCT: u8 = 25;
pub(crate) const PROGRESS_SIMULATION_PCT: u8 = 50;
pub(crate) const PROGRESS_COMPLETE_PCT: u8 = 100;

// Mission id encoding ------------------------------------------------------
pub(crate) const MISSIONS_PER_REALM: u32 = 100;

// Trade routes -------------------------------------------------------------
pub(crate) const DEFAULT_STARTING_FUNDS: i64 = 1_000;

// Barter -------------------------------------------------------------------
pub(crate) const DEFAULT_BARTER_START_ITEM: &str = "clay pot";
pub(crate) const DEFAULT_BARTER_TARGET_ITEM: &str = "salt block";

// Inflation ----------------------------------------------------------------
pub(crate) const INFLATION_EPOCH_YEAR: i32 = 1900;
pub(crate) const INFLATION_BACKGROUND_RATE: f64 = 0.005;
pub(crate) const INFLATION_LOOKAHEAD_YEARS: i32 = 5;
pub(crate) const INFLATION_SPEED_PRESETS: [u32; 4] = [1, 2, 5, 10];
pub(crate) const INFLATION_TICK_BASE_MS: u64 = 1_000;

// Reflection ---------------------------------------------------------------
pub(crate) const DEFAULT_REFLECTION_PROMPT: &str =
    "What did you learn in this mission, and how does it connect to Bitcoin?";

// Session seeds ------------------------------------------------------------
pub(crate) const DEFAULT_SESSION_SEED: u64 = 0x00A5_4A00_B17C_0111;
