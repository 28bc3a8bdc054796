//! Mission lifecycle: intro, simulation, reflection, complete.
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{PROGRESS_COMPLETE_PCT, PROGRESS_INTRO_PCT, PROGRESS_SIMULATION_PCT};
use crate::data::Mission;

pub mod controller;
pub use controller::MissionController;

/// Lifecycle phase of an open mission. `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    Intro,
    Simulation,
    Reflection,
    Complete,
}

impl MissionPhase {
    /// Coarse progress indicator. Reflection reports the simulation value
    /// so that only a finished mission ever shows 100.
    #[must_use]
    pub const fn progress_pct(self) -> u8 {
        match self {
            Self::Intro => PROGRESS_INTRO_PCT,
            Self::Simulation | Self::Reflection => PROGRESS_SIMULATION_PCT,
            Self::Complete => PROGRESS_COMPLETE_PCT,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Outcome of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// The session moved to this phase.
    Advanced(MissionPhase),
    /// The request was not valid here; the session stays in this phase.
    Refused(MissionPhase),
}

impl Transition {
    #[must_use]
    pub const fn phase(self) -> MissionPhase {
        match self {
            Self::Advanced(phase) | Self::Refused(phase) => phase,
        }
    }

    #[must_use]
    pub const fn is_advanced(self) -> bool {
        matches!(self, Self::Advanced(_))
    }
}

/// Presentation snapshot of the open mission.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionView {
    pub mission: Arc<Mission>,
    pub phase: MissionPhase,
    pub progress_pct: u8,
    pub reflection_prompt: String,
    /// Whether the ledger already held this mission when it was opened.
    pub previously_completed: bool,
}
