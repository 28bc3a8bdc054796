//! Trade-route ledger: walk directed routes between cities, banking value.
use serde::{Deserialize, Serialize};

use super::Step;
use crate::config::SimulationDefaults;
use crate::constants::{LOG_JOURNEY_LEG, LOG_JOURNEY_START};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub value: i64,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub goods: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRouteParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub cities: Vec<City>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub routes: Vec<Route>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub starting_funds: Option<i64>,
}

/// A single journal line, stored as a message key plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub key: String,
    pub city: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub goods: String,
    #[serde(default)]
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    /// Take the route at this index.
    Take(usize),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRouteLedger {
    cities: Vec<City>,
    routes: Vec<Route>,
    starting_funds: i64,
    current_city: Option<String>,
    visited_cities: Vec<String>,
    selected_routes: Vec<usize>,
    total_value: i64,
    journey_log: Vec<JourneyEntry>,
    terminal: bool,
}

impl TradeRouteLedger {
    #[must_use]
    pub fn new(params: TradeRouteParams, defaults: &SimulationDefaults) -> Self {
        let mut ledger = Self {
            cities: params.cities,
            routes: params.routes,
            starting_funds: params.starting_funds.unwrap_or(defaults.starting_funds),
            current_city: None,
            visited_cities: Vec::new(),
            selected_routes: Vec::new(),
            total_value: 0,
            journey_log: Vec::new(),
            terminal: false,
        };
        ledger.reset();
        ledger
    }

    pub fn apply(&mut self, action: RouteAction) -> Step {
        match action {
            RouteAction::Take(index) => self.take(index),
            RouteAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    /// Travel along a route leaving the current city. Each route runs once.
    pub fn take(&mut self, index: usize) -> Step {
        if self.terminal || self.selected_routes.contains(&index) {
            return Step::Ignored;
        }
        let Some(route) = self.routes.get(index) else {
            return Step::Ignored;
        };
        if self.current_city.as_deref() != Some(route.from.as_str()) {
            return Step::Ignored;
        }

        let route = route.clone();
        self.selected_routes.push(index);
        if !self.visited_cities.contains(&route.to) {
            self.visited_cities.push(route.to.clone());
        }
        self.total_value = self.total_value.saturating_add(route.value);
        self.journey_log.push(JourneyEntry {
            key: LOG_JOURNEY_LEG.to_string(),
            city: route.to.clone(),
            from: Some(route.from),
            goods: route.goods,
            value: route.value,
        });
        self.current_city = Some(route.to);

        if self.journey_exhausted() {
            self.terminal = true;
            Step::Completed
        } else {
            Step::Updated
        }
    }

    /// Restore the single-city starting configuration.
    pub fn reset(&mut self) {
        self.current_city = self.cities.first().map(|city| city.id.clone());
        self.visited_cities.clear();
        self.visited_cities.extend(self.current_city.iter().cloned());
        self.selected_routes.clear();
        self.total_value = 0;
        self.journey_log.clear();
        if let Some(city) = &self.current_city {
            self.journey_log.push(JourneyEntry {
                key: LOG_JOURNEY_START.to_string(),
                city: city.clone(),
                from: None,
                goods: String::new(),
                value: 0,
            });
        }
        self.terminal = false;
    }

    fn journey_exhausted(&self) -> bool {
        let all_cities = self
            .cities
            .iter()
            .all(|city| self.visited_cities.contains(&city.id));
        let all_routes = self.selected_routes.len() >= self.routes.len();
        all_cities || all_routes
    }

    /// Indices of untaken routes leaving the current city.
    #[must_use]
    pub fn available_routes(&self) -> Vec<usize> {
        if self.terminal {
            return Vec::new();
        }
        let Some(current) = self.current_city.as_deref() else {
            return Vec::new();
        };
        self.routes
            .iter()
            .enumerate()
            .filter(|(index, route)| route.from == current && !self.selected_routes.contains(index))
            .map(|(index, _)| index)
            .collect()
    }

    /// No route leaves the current city and the journey has not ended.
    #[must_use]
    pub fn is_stranded(&self) -> bool {
        !self.terminal && self.available_routes().is_empty()
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[must_use]
    pub fn current_city(&self) -> Option<&str> {
        self.current_city.as_deref()
    }

    #[must_use]
    pub fn visited_cities(&self) -> &[String] {
        &self.visited_cities
    }

    #[must_use]
    pub fn selected_routes(&self) -> &[usize] {
        &self.selected_routes
    }

    #[must_use]
    pub const fn total_value(&self) -> i64 {
        self.total_value
    }

    #[must_use]
    pub const fn purse(&self) -> i64 {
        self.starting_funds.saturating_add(self.total_value)
    }

    #[must_use]
    pub fn journey_log(&self) -> &[JourneyEntry] {
        &self.journey_log
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }
}
