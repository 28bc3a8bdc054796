//! Simulation registry: maps a mission's `simulationType` tag to a handler.
use serde::Serialize;
use std::collections::HashMap;

use crate::config::SimulationDefaults;
use crate::error::MissionError;
use crate::simulation::{ActiveSimulation, SimulationKind, SimulationParams};

/// Default substituted when a parameter field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDefault {
    EmptyList,
    /// Read from the named field of [`SimulationDefaults`].
    Configured(&'static str),
    /// Computed from other parameters.
    Derived(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamField {
    pub name: &'static str,
    pub default: ParamDefault,
}

const fn field(name: &'static str, default: ParamDefault) -> ParamField {
    ParamField { name, default }
}

const TIMELINE_FIELDS: &[ParamField] = &[field("events", ParamDefault::EmptyList)];
const BARTER_FIELDS: &[ParamField] = &[
    field("traders", ParamDefault::EmptyList),
    field("startItem", ParamDefault::Configured("barter_start_item")),
    field("targetItem", ParamDefault::Configured("barter_target_item")),
];
const TRADE_ROUTE_FIELDS: &[ParamField] = &[
    field("cities", ParamDefault::EmptyList),
    field("routes", ParamDefault::EmptyList),
    field("startingFunds", ParamDefault::Configured("starting_funds")),
];
const INFLATION_FIELDS: &[ParamField] = &[
    field("goods", ParamDefault::EmptyList),
    field("events", ParamDefault::EmptyList),
    field("startYear", ParamDefault::Configured("inflation_start_year")),
    field(
        "endYear",
        ParamDefault::Derived("last event year + inflation_lookahead_years"),
    ),
];
const QUIZ_FIELDS: &[ParamField] = &[field("questions", ParamDefault::EmptyList)];
const REFLECTION_FIELDS: &[ParamField] = &[field(
    "prompt",
    ParamDefault::Configured("default_reflection_prompt"),
)];

/// A registered simulation and the parameters it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HandlerSpec {
    pub kind: SimulationKind,
    pub label: &'static str,
    pub fields: &'static [ParamField],
}

impl HandlerSpec {
    #[must_use]
    pub const fn for_kind(kind: SimulationKind) -> Self {
        let (label, fields) = match kind {
            SimulationKind::Timeline => ("Timeline ordering", TIMELINE_FIELDS),
            SimulationKind::Barter => ("Barter chain", BARTER_FIELDS),
            SimulationKind::TradeRoute => ("Trade routes", TRADE_ROUTE_FIELDS),
            SimulationKind::Inflation => ("Inflation over time", INFLATION_FIELDS),
            SimulationKind::Quiz => ("Knowledge check", QUIZ_FIELDS),
            SimulationKind::Reflection => ("Reflection", REFLECTION_FIELDS),
        };
        Self {
            kind,
            label,
            fields,
        }
    }

    /// Parse `data` into typed params, defaulting whatever is missing.
    #[must_use]
    pub fn params(&self, data: &serde_json::Value) -> SimulationParams {
        SimulationParams::parse(self.kind, data)
    }

    /// Build a fresh simulation session from a mission's parameter bag.
    #[must_use]
    pub fn activate(
        &self,
        data: &serde_json::Value,
        defaults: &SimulationDefaults,
        seed: u64,
    ) -> ActiveSimulation {
        ActiveSimulation::activate(self.params(data), defaults, seed)
    }
}

/// Lookup table from tag to handler. Pure: no side effects beyond logging.
#[derive(Debug, Clone)]
pub struct SimulationRegistry {
    handlers: HashMap<String, HandlerSpec>,
}

impl SimulationRegistry {
    /// A registry with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Every built-in simulation under its canonical tag plus common aliases.
    #[must_use]
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::empty();
        for kind in SimulationKind::ALL {
            registry.register(kind.tag(), HandlerSpec::for_kind(kind));
        }
        registry.register_alias("trade-route", SimulationKind::TradeRoute);
        registry.register_alias("trading", SimulationKind::TradeRoute);
        registry.register_alias("chronology", SimulationKind::Timeline);
        registry
    }

    pub fn register(&mut self, tag: &str, handler: HandlerSpec) {
        self.handlers.insert(normalize_tag(tag), handler);
    }

    pub fn register_alias(&mut self, tag: &str, kind: SimulationKind) {
        self.register(tag, HandlerSpec::for_kind(kind));
    }

    /// Resolve a tag to its handler.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::UnknownSimulationType`] for unregistered tags.
    pub fn resolve(&self, tag: &str) -> Result<&HandlerSpec, MissionError> {
        self.handlers.get(&normalize_tag(tag)).ok_or_else(|| {
            log::warn!("no simulation handler registered for '{tag}'");
            MissionError::UnknownSimulationType {
                tag: tag.to_string(),
            }
        })
    }

    /// Registered tags in sorted order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::with_builtin_handlers()
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}
