//! Interactive simulations and the typed parameter union that feeds them.
//!
//! Each simulation is a self-contained state machine over mission-supplied
//! parameters. User actions return a [`Step`]; an illegal action is reported
//! as [`Step::Ignored`] and leaves the state untouched.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SimulationDefaults;

pub mod barter;
pub mod inflation;
mod lenient;
pub mod quiz;
pub mod reflection;
#[cfg(feature = "async")]
pub mod ticker;
pub mod timeline;
pub mod trade_route;

pub use barter::{BarterAction, BarterParams, BarterWalker, TradeEntry, Trader, normalize_good};
pub use inflation::{
    Good, InflationAction, InflationEngine, InflationParams, RunToken, ShockEvent,
};
pub use quiz::{QuizAction, QuizOption, QuizParams, QuizQuestion, QuizReport, QuizRound};
pub use reflection::{ReflectionAction, ReflectionPad, ReflectionParams};
#[cfg(feature = "async")]
pub use ticker::Ticker;
pub use timeline::{
    TimelineAction, TimelineChecker, TimelineEvent, TimelineParams, TimelineResult, YearKey,
};
pub use trade_route::{City, JourneyEntry, Route, RouteAction, TradeRouteLedger, TradeRouteParams};

/// Result of feeding one action to a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Illegal in the current state; nothing changed.
    Ignored,
    /// State changed; the simulation is still running.
    Updated,
    /// The simulation reached its terminal state with this action.
    Completed,
}

impl Step {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Simulations known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Timeline,
    Barter,
    TradeRoute,
    Inflation,
    Quiz,
    Reflection,
}

impl SimulationKind {
    pub const ALL: [Self; 6] = [
        Self::Timeline,
        Self::Barter,
        Self::TradeRoute,
        Self::Inflation,
        Self::Quiz,
        Self::Reflection,
    ];

    /// Canonical registry tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Barter => "barter",
            Self::TradeRoute => "trade_route",
            Self::Inflation => "inflation",
            Self::Quiz => "quiz",
            Self::Reflection => "reflection",
        }
    }
}

impl std::fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Strongly typed parameters, one variant per simulation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum SimulationParams {
    Timeline(TimelineParams),
    Barter(BarterParams),
    TradeRoute(TradeRouteParams),
    Inflation(InflationParams),
    Quiz(QuizParams),
    Reflection(ReflectionParams),
}

impl SimulationParams {
    /// Parse a mission's parameter bag for `kind`. A bag that is not an
    /// object degrades to the variant's defaults; inside an object, bad
    /// fields are defaulted and bad list entries dropped one at a time.
    #[must_use]
    pub fn parse(kind: SimulationKind, data: &serde_json::Value) -> Self {
        match kind {
            SimulationKind::Timeline => Self::Timeline(parse_or_default(kind, data)),
            SimulationKind::Barter => Self::Barter(parse_or_default(kind, data)),
            SimulationKind::TradeRoute => Self::TradeRoute(parse_or_default(kind, data)),
            SimulationKind::Inflation => Self::Inflation(parse_or_default(kind, data)),
            SimulationKind::Quiz => Self::Quiz(parse_or_default(kind, data)),
            SimulationKind::Reflection => Self::Reflection(parse_or_default(kind, data)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SimulationKind {
        match self {
            Self::Timeline(_) => SimulationKind::Timeline,
            Self::Barter(_) => SimulationKind::Barter,
            Self::TradeRoute(_) => SimulationKind::TradeRoute,
            Self::Inflation(_) => SimulationKind::Inflation,
            Self::Quiz(_) => SimulationKind::Quiz,
            Self::Reflection(_) => SimulationKind::Reflection,
        }
    }
}

fn parse_or_default<T>(kind: SimulationKind, data: &serde_json::Value) -> T
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return T::default();
    }
    serde_json::from_value(data.clone()).unwrap_or_else(|err| {
        log::warn!("{kind} parameters malformed, using defaults: {err}");
        T::default()
    })
}

/// A user action addressed to whichever simulation is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationAction {
    Timeline(TimelineAction),
    Barter(BarterAction),
    TradeRoute(RouteAction),
    Inflation(InflationAction),
    Quiz(QuizAction),
    Reflection(ReflectionAction),
}

/// The live session state of one activated simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveSimulation {
    Timeline(TimelineChecker),
    Barter(BarterWalker),
    TradeRoute(TradeRouteLedger),
    Inflation(InflationEngine),
    Quiz(QuizRound),
    Reflection(ReflectionPad),
}

impl ActiveSimulation {
    /// Construct the state machine for `params`.
    #[must_use]
    pub fn activate(params: SimulationParams, defaults: &SimulationDefaults, seed: u64) -> Self {
        match params {
            SimulationParams::Timeline(params) => Self::Timeline(TimelineChecker::new(params, seed)),
            SimulationParams::Barter(params) => Self::Barter(BarterWalker::new(params, defaults)),
            SimulationParams::TradeRoute(params) => {
                Self::TradeRoute(TradeRouteLedger::new(params, defaults))
            }
            SimulationParams::Inflation(params) => {
                Self::Inflation(InflationEngine::new(params, defaults))
            }
            SimulationParams::Quiz(params) => Self::Quiz(QuizRound::new(params)),
            SimulationParams::Reflection(params) => Self::Reflection(ReflectionPad::new(
                params,
                &defaults.default_reflection_prompt,
            )),
        }
    }

    /// Route an action; actions for a different kind are ignored.
    pub fn apply(&mut self, action: SimulationAction) -> Step {
        match (self, action) {
            (Self::Timeline(sim), SimulationAction::Timeline(action)) => sim.apply(action),
            (Self::Barter(sim), SimulationAction::Barter(action)) => sim.apply(action),
            (Self::TradeRoute(sim), SimulationAction::TradeRoute(action)) => sim.apply(action),
            (Self::Inflation(sim), SimulationAction::Inflation(action)) => sim.apply(action),
            (Self::Quiz(sim), SimulationAction::Quiz(action)) => sim.apply(action),
            (Self::Reflection(sim), SimulationAction::Reflection(action)) => sim.apply(action),
            (sim, action) => {
                log::debug!("ignoring {action:?} for active {} simulation", sim.kind());
                Step::Ignored
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Timeline(sim) => sim.reset(),
            Self::Barter(sim) => sim.reset(),
            Self::TradeRoute(sim) => sim.reset(),
            Self::Inflation(sim) => sim.reset(),
            Self::Quiz(sim) => sim.reset(),
            Self::Reflection(sim) => sim.reset(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Timeline(sim) => sim.is_terminal(),
            Self::Barter(sim) => sim.is_terminal(),
            Self::TradeRoute(sim) => sim.is_terminal(),
            Self::Inflation(sim) => sim.is_complete(),
            Self::Quiz(sim) => sim.is_terminal(),
            Self::Reflection(sim) => sim.is_terminal(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SimulationKind {
        match self {
            Self::Timeline(_) => SimulationKind::Timeline,
            Self::Barter(_) => SimulationKind::Barter,
            Self::TradeRoute(_) => SimulationKind::TradeRoute,
            Self::Inflation(_) => SimulationKind::Inflation,
            Self::Quiz(_) => SimulationKind::Quiz,
            Self::Reflection(_) => SimulationKind::Reflection,
        }
    }
}
