//! Barter chain: trade from a starting good to a target good.
use serde::{Deserialize, Serialize};

use super::Step;
use crate::config::SimulationDefaults;
use crate::constants::LOG_BARTER_TRADE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trader {
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub name: String,
    pub has: String,
    pub wants: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarterParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub traders: Vec<Trader>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub start_item: Option<String>,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub target_item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEntry {
    pub key: String,
    pub trader: String,
    pub gave: String,
    pub received: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarterAction {
    /// Trade with the trader at this index.
    Trade(usize),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarterWalker {
    traders: Vec<Trader>,
    start_item: String,
    target_item: String,
    current_item: String,
    trade_log: Vec<TradeEntry>,
    trade_count: u32,
    terminal: bool,
}

impl BarterWalker {
    #[must_use]
    pub fn new(params: BarterParams, defaults: &SimulationDefaults) -> Self {
        let start_item = params
            .start_item
            .unwrap_or_else(|| defaults.barter_start_item.clone());
        let target_item = params
            .target_item
            .unwrap_or_else(|| defaults.barter_target_item.clone());
        let terminal = goods_match(&start_item, &target_item);
        Self {
            traders: params.traders,
            current_item: start_item.clone(),
            start_item,
            target_item,
            trade_log: Vec::new(),
            trade_count: 0,
            terminal,
        }
    }

    pub fn apply(&mut self, action: BarterAction) -> Step {
        match action {
            BarterAction::Trade(index) => self.trade(index),
            BarterAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    /// Trade with a trader who wants what we currently hold.
    pub fn trade(&mut self, index: usize) -> Step {
        if self.terminal {
            return Step::Ignored;
        }
        let Some(trader) = self.traders.get(index) else {
            return Step::Ignored;
        };
        if !goods_match(&trader.wants, &self.current_item) {
            return Step::Ignored;
        }

        self.trade_log.push(TradeEntry {
            key: LOG_BARTER_TRADE.to_string(),
            trader: trader.name.clone(),
            gave: self.current_item.clone(),
            received: trader.has.clone(),
        });
        self.current_item = trader.has.clone();
        self.trade_count = self.trade_count.saturating_add(1);

        if goods_match(&self.current_item, &self.target_item) {
            self.terminal = true;
            Step::Completed
        } else {
            Step::Updated
        }
    }

    pub fn reset(&mut self) {
        self.current_item = self.start_item.clone();
        self.trade_log.clear();
        self.trade_count = 0;
        self.terminal = goods_match(&self.start_item, &self.target_item);
    }

    /// Indices of traders willing to take the current item.
    #[must_use]
    pub fn available_traders(&self) -> Vec<usize> {
        if self.terminal {
            return Vec::new();
        }
        self.traders
            .iter()
            .enumerate()
            .filter(|(_, trader)| goods_match(&trader.wants, &self.current_item))
            .map(|(index, _)| index)
            .collect()
    }

    #[must_use]
    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    #[must_use]
    pub fn current_item(&self) -> &str {
        &self.current_item
    }

    #[must_use]
    pub fn target_item(&self) -> &str {
        &self.target_item
    }

    #[must_use]
    pub fn trade_log(&self) -> &[TradeEntry] {
        &self.trade_log
    }

    #[must_use]
    pub const fn trade_count(&self) -> u32 {
        self.trade_count
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Canonical form of a good's name: trimmed and Unicode lowercased.
#[must_use]
pub fn normalize_good(name: &str) -> String {
    name.trim().to_lowercase()
}

fn goods_match(left: &str, right: &str) -> bool {
    normalize_good(left) == normalize_good(right)
}
