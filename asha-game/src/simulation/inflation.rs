//! Inflation compounding: per-year price drift plus scripted shock events.
//!
//! The engine itself is synchronous. A host drives it by asking for a
//! [`RunToken`] with [`InflationEngine::start`] and feeding that token back
//! through [`InflationEngine::apply_tick`] once per [`InflationEngine::tick_interval`].
//! Pausing, resetting, or changing speed retires the token, so a tick that
//! was already scheduled when the user paused can never advance the year.
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::Step;
use crate::config::SimulationDefaults;
use crate::constants::INFLATION_TICK_BASE_MS;
use crate::numbers::u32_to_f64;

static NEXT_RUN_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of one running stretch of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken(u64);

impl RunToken {
    fn issue() -> Self {
        Self(NEXT_RUN_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Good {
    pub id: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub name: String,
    pub initial_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockEvent {
    pub year: i32,
    pub multiplier: f64,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub goods: Vec<Good>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub events: Vec<ShockEvent>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub start_year: Option<i32>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationAction {
    Start,
    Pause,
    /// Pause when running, resume otherwise.
    Toggle,
    SetSpeed(u32),
    Tick(RunToken),
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InflationEngine {
    goods: Vec<Good>,
    events: Vec<ShockEvent>,
    background_rate: f64,
    speed_presets: Vec<u32>,
    start_year: i32,
    end_year: i32,
    year: i32,
    prices: Vec<f64>,
    active_run: Option<RunToken>,
    speed: u32,
    inflation_history: Vec<f64>,
    complete: bool,
}

impl InflationEngine {
    #[must_use]
    pub fn new(params: InflationParams, defaults: &SimulationDefaults) -> Self {
        let start_year = params.start_year.unwrap_or(defaults.inflation_start_year);
        let last_event_year = params
            .events
            .iter()
            .map(|event| event.year)
            .max()
            .unwrap_or(start_year)
            .max(start_year);
        let end_year = params.end_year.unwrap_or_else(|| {
            last_event_year.saturating_add(defaults.inflation_lookahead_years)
        });
        let speed_presets = defaults.speed_presets();
        let speed = speed_presets.first().copied().unwrap_or(1);

        let mut engine = Self {
            goods: params.goods,
            events: params.events,
            background_rate: defaults.inflation_background_rate,
            speed_presets,
            start_year,
            end_year,
            year: start_year,
            prices: Vec::new(),
            active_run: None,
            speed,
            inflation_history: Vec::new(),
            complete: false,
        };
        engine.reset();
        engine
    }

    pub fn apply(&mut self, action: InflationAction) -> Step {
        match action {
            InflationAction::Start => self.start().map_or(Step::Ignored, |_| Step::Updated),
            InflationAction::Pause => self.pause(),
            InflationAction::Toggle => {
                if self.is_running() {
                    self.pause()
                } else {
                    self.start().map_or(Step::Ignored, |_| Step::Updated)
                }
            }
            InflationAction::SetSpeed(speed) => self.set_speed(speed),
            InflationAction::Tick(token) => self.apply_tick(token),
            InflationAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    /// Begin (or resume) running. Returns the token the host must present
    /// with every tick, or `None` when already running or complete.
    pub fn start(&mut self) -> Option<RunToken> {
        if self.complete || self.active_run.is_some() {
            return None;
        }
        let token = RunToken::issue();
        self.active_run = Some(token);
        Some(token)
    }

    /// Stop running. Accumulated years and prices are kept.
    pub fn pause(&mut self) -> Step {
        if self.active_run.take().is_some() {
            Step::Updated
        } else {
            Step::Ignored
        }
    }

    /// Switch to a preset speed. A running engine gets a fresh token so the
    /// host reschedules at the new rate.
    pub fn set_speed(&mut self, speed: u32) -> Step {
        if speed == self.speed || !self.speed_presets.contains(&speed) {
            return Step::Ignored;
        }
        self.speed = speed;
        if self.active_run.is_some() {
            self.active_run = Some(RunToken::issue());
        }
        Step::Updated
    }

    /// Advance one simulated year if `token` belongs to the current run.
    pub fn apply_tick(&mut self, token: RunToken) -> Step {
        if self.active_run != Some(token) {
            log::debug!("discarding stale inflation tick {token:?}");
            return Step::Ignored;
        }
        self.advance_year();
        if self.complete {
            self.active_run = None;
            Step::Completed
        } else {
            Step::Updated
        }
    }

    fn advance_year(&mut self) {
        self.year += 1;
        let shocks: Vec<f64> = self
            .events
            .iter()
            .filter(|event| event.year == self.year)
            .map(|event| event.multiplier)
            .collect();
        let (multiplier, pct) = if shocks.is_empty() {
            (1.0 + self.background_rate, self.background_rate * 100.0)
        } else {
            let combined: f64 = shocks.iter().product();
            (combined, (combined - 1.0) * 100.0)
        };
        for price in &mut self.prices {
            *price *= multiplier;
        }
        self.inflation_history.push(pct);
        if self.year >= self.end_year {
            self.complete = true;
        }
    }

    /// Restore year, prices, history, and speed to their starting values.
    pub fn reset(&mut self) {
        self.active_run = None;
        self.year = self.start_year;
        self.prices = self.goods.iter().map(|good| good.initial_price).collect();
        self.inflation_history.clear();
        self.speed = self.speed_presets.first().copied().unwrap_or(1);
        self.complete = self.year >= self.end_year;
    }

    /// Real time between simulated years at the current speed.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis((INFLATION_TICK_BASE_MS / u64::from(self.speed.max(1))).max(1))
    }

    #[must_use]
    pub fn price(&self, good_id: &str) -> Option<f64> {
        self.goods
            .iter()
            .position(|good| good.id == good_id)
            .and_then(|index| self.prices.get(index).copied())
    }

    /// Current price relative to the initial one, as a percentage change.
    #[must_use]
    pub fn cumulative_change_pct(&self, good_id: &str) -> Option<f64> {
        let index = self.goods.iter().position(|good| good.id == good_id)?;
        let initial = self.goods.get(index)?.initial_price;
        let current = *self.prices.get(index)?;
        if initial == 0.0 {
            return None;
        }
        Some((current / initial - 1.0) * 100.0)
    }

    /// Mean of the recorded yearly inflation rates.
    #[must_use]
    pub fn average_inflation_pct(&self) -> f64 {
        if self.inflation_history.is_empty() {
            return 0.0;
        }
        let years = u32::try_from(self.inflation_history.len()).unwrap_or(u32::MAX);
        self.inflation_history.iter().sum::<f64>() / u32_to_f64(years)
    }

    #[must_use]
    pub fn goods(&self) -> &[Good] {
        &self.goods
    }

    #[must_use]
    pub fn events(&self) -> &[ShockEvent] {
        &self.events
    }

    #[must_use]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    #[must_use]
    pub const fn end_year(&self) -> i32 {
        self.end_year
    }

    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    #[must_use]
    pub fn speed_presets(&self) -> &[u32] {
        &self.speed_presets
    }

    #[must_use]
    pub fn inflation_history(&self) -> &[f64] {
        &self.inflation_history
    }

    #[must_use]
    pub const fn run_token(&self) -> Option<RunToken> {
        self.active_run
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active_run.is_some()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn bread() -> Good {
        Good {
            id: "bread".to_string(),
            name: "Loaf of bread".to_string(),
            initial_price: 0.05,
        }
    }

    fn engine(events: Vec<ShockEvent>, end_year: Option<i32>) -> InflationEngine {
        InflationEngine::new(
            InflationParams {
                goods: vec![bread()],
                events,
                start_year: None,
                end_year,
            },
            &SimulationDefaults::default(),
        )
    }

    fn run_years(engine: &mut InflationEngine, years: u32) {
        let token = engine.start().expect("engine should start");
        for _ in 0..years {
            engine.apply_tick(token);
        }
    }

    #[test]
    fn background_drift_compounds_each_year() {
        let mut engine = engine(Vec::new(), Some(1950));
        run_years(&mut engine, 12);
        let expected = 0.05 * 1.005_f64.powi(12);
        assert_eq!(engine.year(), 1912);
        assert!((engine.price("bread").unwrap() - expected).abs() < EPSILON);
        assert_eq!(engine.inflation_history().len(), 12);
        assert!(engine.inflation_history().iter().all(|pct| (pct - 0.5).abs() < EPSILON));
    }

    #[test]
    fn shock_year_applies_multiplier_instead_of_drift() {
        let shock = ShockEvent {
            year: 1905,
            multiplier: 2.0,
            label: "war".to_string(),
        };
        let mut engine = engine(vec![shock], None);
        run_years(&mut engine, 5);
        let expected = 0.05 * 1.005_f64.powi(4) * 2.0;
        assert!((engine.price("bread").unwrap() - expected).abs() < EPSILON);
        assert!((engine.inflation_history()[4] - 100.0).abs() < EPSILON);
        assert!((engine.cumulative_change_pct("bread").unwrap() - (expected / 0.05 - 1.0) * 100.0).abs() < EPSILON);
    }

    #[test]
    fn completes_five_years_after_last_event() {
        let shock = ShockEvent {
            year: 1910,
            multiplier: 1.5,
            label: String::new(),
        };
        let mut engine = engine(vec![shock], None);
        assert_eq!(engine.end_year(), 1915);
        let token = engine.start().unwrap();
        let mut steps = Vec::new();
        for _ in 0..20 {
            steps.push(engine.apply_tick(token));
        }
        assert_eq!(steps.iter().filter(|step| **step == Step::Completed).count(), 1);
        assert_eq!(engine.year(), 1915);
        assert!(engine.is_complete());
        assert!(!engine.is_running());
        assert!(engine.start().is_none());
    }

    #[test]
    fn pause_keeps_progress_and_retires_token() {
        let mut engine = engine(Vec::new(), Some(1950));
        let token = engine.start().unwrap();
        engine.apply_tick(token);
        engine.apply_tick(token);
        assert_eq!(engine.pause(), Step::Updated);
        assert_eq!(engine.apply_tick(token), Step::Ignored);
        assert_eq!(engine.year(), 1902);

        let resumed = engine.start().unwrap();
        assert_ne!(resumed, token);
        assert_eq!(engine.apply_tick(resumed), Step::Updated);
        assert_eq!(engine.year(), 1903);
    }

    #[test]
    fn stale_tick_after_reset_and_restart_is_discarded() {
        let fresh = engine(Vec::new(), Some(1950));
        let mut engine = fresh.clone();
        let stale = engine.start().unwrap();
        engine.apply_tick(stale);
        engine.pause();
        engine.reset();
        assert_eq!(engine, fresh);

        let current = engine.start().unwrap();
        assert_eq!(engine.apply_tick(stale), Step::Ignored);
        assert_eq!(engine.year(), 1900);
        assert!((engine.price("bread").unwrap() - 0.05).abs() < f64::EPSILON);
        assert_eq!(engine.apply_tick(current), Step::Updated);
    }

    #[test]
    fn reset_while_running_restores_initial_state() {
        let fresh = engine(Vec::new(), Some(1950));
        let mut engine = fresh.clone();
        let token = engine.start().unwrap();
        engine.apply_tick(token);
        engine.set_speed(5);
        engine.reset();
        assert_eq!(engine, fresh);
        assert_eq!(engine.apply_tick(token), Step::Ignored);
    }

    #[test]
    fn speed_changes_only_accept_presets_and_reissue_tokens() {
        let mut engine = engine(Vec::new(), Some(1950));
        assert_eq!(engine.tick_interval(), Duration::from_millis(1_000));
        assert_eq!(engine.set_speed(3), Step::Ignored);
        let token = engine.start().unwrap();
        assert_eq!(engine.set_speed(10), Step::Updated);
        assert_eq!(engine.tick_interval(), Duration::from_millis(100));
        assert_eq!(engine.apply_tick(token), Step::Ignored);
        let rescheduled = engine.run_token().unwrap();
        assert_eq!(engine.apply_tick(rescheduled), Step::Updated);
    }

    #[test]
    fn same_year_shocks_compound() {
        let events = vec![
            ShockEvent {
                year: 1901,
                multiplier: 2.0,
                label: String::new(),
            },
            ShockEvent {
                year: 1901,
                multiplier: 1.5,
                label: String::new(),
            },
        ];
        let mut engine = engine(events, None);
        run_years(&mut engine, 1);
        assert!((engine.price("bread").unwrap() - 0.15).abs() < EPSILON);
        assert!((engine.inflation_history()[0] - 200.0).abs() < EPSILON);
    }

    #[test]
    fn toggle_flips_running_state() {
        let mut engine = engine(Vec::new(), Some(1950));
        assert_eq!(engine.apply(InflationAction::Toggle), Step::Updated);
        assert!(engine.is_running());
        assert_eq!(engine.apply(InflationAction::Toggle), Step::Updated);
        assert!(!engine.is_running());
        assert_eq!(engine.apply(InflationAction::Pause), Step::Ignored);
    }

    #[test]
    fn fastest_configured_speed_keeps_a_nonzero_interval() {
        let defaults = SimulationDefaults {
            inflation_speed_presets: vec![1, 2_000],
            ..SimulationDefaults::default()
        };
        let mut engine = InflationEngine::new(
            InflationParams {
                goods: vec![bread()],
                ..InflationParams::default()
            },
            &defaults,
        );
        assert_eq!(engine.speed_presets(), &[1]);
        assert_eq!(engine.set_speed(2_000), Step::Ignored);
        assert_eq!(engine.tick_interval(), Duration::from_millis(1_000));
    }

    #[test]
    fn extreme_event_years_do_not_overflow() {
        let engine = engine(
            vec![ShockEvent {
                year: i32::MAX - 1,
                multiplier: 2.0,
                label: String::new(),
            }],
            None,
        );
        assert_eq!(engine.end_year(), i32::MAX);
        assert!(!engine.is_complete());
    }

    #[test]
    fn no_events_stop_after_lookahead() {
        let engine = engine(Vec::new(), None);
        assert_eq!(engine.end_year(), 1905);
        assert!((engine.average_inflation_pct()).abs() < f64::EPSILON);
    }
}
