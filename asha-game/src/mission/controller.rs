use std::sync::Arc;

use super::{MissionPhase, MissionView, Transition};
use crate::config::SimulationDefaults;
use crate::constants::DEFAULT_SESSION_SEED;
use crate::data::{Mission, MissionCatalog};
use crate::error::MissionError;
use crate::progress::ProgressLedger;
use crate::registry::SimulationRegistry;
use crate::simulation::{ActiveSimulation, SimulationAction, SimulationKind, Step};

/// Per-visit state for one open mission.
#[derive(Debug, Clone)]
struct MissionSession {
    mission: Arc<Mission>,
    phase: MissionPhase,
    kind: Option<SimulationKind>,
    simulation: Option<ActiveSimulation>,
    simulation_done: bool,
    ledger_notified: bool,
    previously_completed: bool,
    reflection_response: Option<String>,
}

impl MissionSession {
    fn new(mission: Arc<Mission>, previously_completed: bool) -> Self {
        Self {
            mission,
            phase: MissionPhase::Intro,
            kind: None,
            simulation: None,
            simulation_done: false,
            ledger_notified: false,
            previously_completed,
            reflection_response: None,
        }
    }

    /// A reflection-type mission with no authored question goes straight
    /// from simulation to complete.
    fn reflection_applies(&self) -> bool {
        self.kind != Some(SimulationKind::Reflection) || self.mission.has_reflection_question()
    }
}

/// Drives a single mission through its lifecycle and owns the active
/// simulation. Completion is reported to the ledger at most once per visit.
#[derive(Debug)]
pub struct MissionController<P: ProgressLedger> {
    catalog: Arc<MissionCatalog>,
    registry: SimulationRegistry,
    defaults: SimulationDefaults,
    ledger: P,
    seed: u64,
    session: Option<MissionSession>,
}

impl<P: ProgressLedger> MissionController<P> {
    #[must_use]
    pub fn new(catalog: Arc<MissionCatalog>, ledger: P) -> Self {
        Self {
            catalog,
            registry: SimulationRegistry::default(),
            defaults: SimulationDefaults::default(),
            ledger,
            seed: DEFAULT_SESSION_SEED,
            session: None,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: SimulationRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: SimulationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Seed used for simulations that shuffle their content.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Open a mission in the `intro` phase, replacing any open session.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NotFound`] if the catalog has no such mission.
    pub fn open_mission(&mut self, mission_id: u32) -> Result<MissionView, MissionError> {
        let mission = self.catalog.get(mission_id)?;
        let previously_completed = self.ledger.is_complete(mission_id);
        self.session = Some(MissionSession::new(mission, previously_completed));
        self.view().ok_or(MissionError::NoActiveMission)
    }

    /// Leave `intro` and activate the mission's simulation.
    ///
    /// An unknown simulation tag still moves the session to `simulation`
    /// with no active handler so the host can render its fallback.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NoActiveMission`] with no open mission, or
    /// [`MissionError::UnknownSimulationType`] if the tag is unregistered.
    pub fn start_simulation(&mut self) -> Result<Transition, MissionError> {
        let session = self.session.as_mut().ok_or(MissionError::NoActiveMission)?;
        if session.phase != MissionPhase::Intro {
            log::debug!(
                "mission {}: start refused in {:?}",
                session.mission.id,
                session.phase
            );
            return Ok(Transition::Refused(session.phase));
        }
        session.phase = MissionPhase::Simulation;

        let handler = self.registry.resolve(&session.mission.simulation_type)?;
        let simulation = handler.activate(
            &session.mission.simulation_data,
            &self.defaults,
            session_seed(self.seed, session.mission.id),
        );
        let terminal_on_arrival = simulation.is_terminal();
        session.kind = Some(handler.kind);
        session.simulation = Some(simulation);

        if terminal_on_arrival {
            return self.on_simulation_complete();
        }
        Ok(Transition::Advanced(MissionPhase::Simulation))
    }

    /// Forward a user action to the active simulation. Reaching the
    /// simulation's terminal state advances the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NoActiveMission`] with no open mission.
    pub fn act(&mut self, action: SimulationAction) -> Result<Step, MissionError> {
        let session = self.session.as_mut().ok_or(MissionError::NoActiveMission)?;
        if session.phase != MissionPhase::Simulation {
            return Ok(Step::Ignored);
        }
        let Some(simulation) = session.simulation.as_mut() else {
            return Ok(Step::Ignored);
        };
        let step = simulation.apply(action);
        if step.is_completed() {
            self.on_simulation_complete()?;
        }
        Ok(step)
    }

    /// Completion signal from the active simulation. Honoured once per
    /// visit, and only while the simulation is actually terminal.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NoActiveMission`] with no open mission.
    pub fn on_simulation_complete(&mut self) -> Result<Transition, MissionError> {
        let session = self.session.as_mut().ok_or(MissionError::NoActiveMission)?;
        let terminal = session
            .simulation
            .as_ref()
            .is_some_and(ActiveSimulation::is_terminal);
        if session.phase != MissionPhase::Simulation || session.simulation_done || !terminal {
            return Ok(Transition::Refused(session.phase));
        }
        session.simulation_done = true;

        if session.reflection_applies() {
            session.phase = MissionPhase::Reflection;
            return Ok(Transition::Advanced(MissionPhase::Reflection));
        }
        Ok(self.finish())
    }

    /// Close the reflection step and record the mission as complete.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NoActiveMission`] with no open mission.
    pub fn on_reflection_complete(
        &mut self,
        response: Option<&str>,
    ) -> Result<Transition, MissionError> {
        let session = self.session.as_mut().ok_or(MissionError::NoActiveMission)?;
        if session.phase != MissionPhase::Reflection {
            return Ok(Transition::Refused(session.phase));
        }
        session.reflection_response = response
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToString::to_string);
        Ok(self.finish())
    }

    fn finish(&mut self) -> Transition {
        let Some(session) = self.session.as_mut() else {
            return Transition::Refused(MissionPhase::Intro);
        };
        session.phase = MissionPhase::Complete;
        if !session.ledger_notified {
            session.ledger_notified = true;
            self.ledger.mark_complete(session.mission.id);
            log::info!("mission {} complete", session.mission.id);
        }
        Transition::Advanced(MissionPhase::Complete)
    }

    /// Restore the active simulation to its initial state. Has no effect on
    /// the lifecycle once the simulation has signalled completion.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NoActiveMission`] with no open mission.
    pub fn reset_simulation(&mut self) -> Result<Step, MissionError> {
        let session = self.session.as_mut().ok_or(MissionError::NoActiveMission)?;
        if session.phase != MissionPhase::Simulation {
            return Ok(Step::Ignored);
        }
        match session.simulation.as_mut() {
            Some(simulation) => {
                simulation.reset();
                Ok(Step::Updated)
            }
            None => Ok(Step::Ignored),
        }
    }

    /// Discard the open session.
    pub fn close_mission(&mut self) {
        self.session = None;
    }

    #[must_use]
    pub fn view(&self) -> Option<MissionView> {
        self.session.as_ref().map(|session| MissionView {
            mission: Arc::clone(&session.mission),
            phase: session.phase,
            progress_pct: session.phase.progress_pct(),
            reflection_prompt: session
                .mission
                .reflection_prompt(&self.defaults.default_reflection_prompt)
                .to_string(),
            previously_completed: session.previously_completed,
        })
    }

    #[must_use]
    pub fn phase(&self) -> Option<MissionPhase> {
        self.session.as_ref().map(|session| session.phase)
    }

    #[must_use]
    pub fn simulation(&self) -> Option<&ActiveSimulation> {
        self.session
            .as_ref()
            .and_then(|session| session.simulation.as_ref())
    }

    #[must_use]
    pub fn reflection_response(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|session| session.reflection_response.as_deref())
    }

    #[must_use]
    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn defaults(&self) -> &SimulationDefaults {
        &self.defaults
    }

    #[must_use]
    pub const fn ledger(&self) -> &P {
        &self.ledger
    }

    /// Consume the controller, returning the ledger.
    #[must_use]
    pub fn into_ledger(self) -> P {
        self.ledger
    }
}

fn session_seed(base: u64, mission_id: u32) -> u64 {
    base ^ u64::from(mission_id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
