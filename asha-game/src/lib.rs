//! Asha's Bitcoin Journey mission engine
//!
//! Platform-agnostic core logic for the mission-based Bitcoin education game:
//! the mission catalog, simulation registry, interactive simulations and the
//! mission lifecycle controller. No presentation code lives here.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod mission;
pub mod numbers;
pub mod progress;
pub mod registry;
pub mod simulation;

use std::sync::Arc;

// Re-export commonly used types
pub use config::SimulationDefaults;
pub use data::{Mission, MissionCatalog, Realm};
pub use error::{CatalogError, MissionError};
pub use mission::{MissionController, MissionPhase, MissionView, Transition};
pub use progress::{MemoryLedger, ProgressLedger, RealmProgress, realm_progress};
pub use registry::{HandlerSpec, ParamDefault, ParamField, SimulationRegistry};
#[cfg(feature = "async")]
pub use simulation::Ticker;
pub use simulation::{
    ActiveSimulation, BarterAction, InflationAction, QuizAction, ReflectionAction, RouteAction,
    RunToken, SimulationAction, SimulationKind, SimulationParams, Step, TimelineAction,
};

/// Trait for abstracting where missions and tuning come from.
/// Platform-specific implementations should provide this.
pub trait MissionSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mission catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;

    /// Load simulation defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be read or parsed.
    fn load_defaults(&self) -> Result<SimulationDefaults, Self::Error>;
}

/// Source backed by the catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl MissionSource for EmbeddedSource {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        MissionCatalog::embedded()
    }

    fn load_defaults(&self) -> Result<SimulationDefaults, Self::Error> {
        Ok(SimulationDefaults::default())
    }
}

/// Source backed by in-memory JSON documents, e.g. files read by a host.
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    catalog: Option<String>,
    defaults: Option<String>,
}

impl JsonSource {
    /// Missing documents fall back to the embedded catalog and built-in
    /// defaults.
    #[must_use]
    pub const fn new(catalog: Option<String>, defaults: Option<String>) -> Self {
        Self { catalog, defaults }
    }
}

impl MissionSource for JsonSource {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        match &self.catalog {
            Some(json) => MissionCatalog::from_json(json),
            None => MissionCatalog::embedded(),
        }
    }

    fn load_defaults(&self) -> Result<SimulationDefaults, Self::Error> {
        match &self.defaults {
            Some(json) => Ok(SimulationDefaults::from_json(json)?),
            None => Ok(SimulationDefaults::default()),
        }
    }
}

/// Main engine for creating mission controllers over a data source.
pub struct JourneyEngine<S>
where
    S: MissionSource,
{
    source: S,
    registry: SimulationRegistry,
}

impl<S> JourneyEngine<S>
where
    S: MissionSource,
{
    /// Create an engine with the built-in simulation handlers.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            registry: SimulationRegistry::default(),
        }
    }

    /// Replace the simulation registry used by new controllers.
    #[must_use]
    pub fn with_registry(mut self, registry: SimulationRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Construct a controller over freshly loaded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or defaults cannot be loaded.
    pub fn create_controller<P>(
        &self,
        ledger: P,
        seed: u64,
    ) -> Result<MissionController<P>, S::Error>
    where
        P: ProgressLedger,
    {
        let catalog = Arc::new(self.source.load_catalog()?);
        let defaults = self.source.load_defaults()?;
        Ok(MissionController::new(catalog, ledger)
            .with_registry(self.registry.clone())
            .with_defaults(defaults)
            .with_seed(seed))
    }

    /// Per-realm completion summary for a ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn realm_summary(
        &self,
        ledger: &impl ProgressLedger,
    ) -> Result<Vec<RealmProgress>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let catalog = self.source.load_catalog().map_err(Into::into)?;
        Ok(realm_progress(&catalog, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    const FIXTURE: &str = r#"{
        "realms": [{ "id": 1, "name": "Marketplace" }],
        "missions": [
            {
                "id": 101,
                "title": "Tally",
                "simulationType": "quiz",
                "simulationData": {
                    "questions": [{
                        "prompt": "Which is scarce?",
                        "options": [
                            { "text": "sand", "correct": false },
                            { "text": "gold", "correct": true }
                        ]
                    }]
                }
            }
        ]
    }"#;

    #[derive(Clone, Copy, Default)]
    struct FixtureSource;

    impl MissionSource for FixtureSource {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
            Ok(MissionCatalog::from_json(FIXTURE).unwrap())
        }

        fn load_defaults(&self) -> Result<SimulationDefaults, Self::Error> {
            Ok(SimulationDefaults {
                default_reflection_prompt: "What stuck with you?".to_string(),
                ..SimulationDefaults::default()
            })
        }
    }

    #[test]
    fn engine_creates_configured_controllers() {
        let engine = JourneyEngine::new(FixtureSource);
        let mut controller = engine.create_controller(MemoryLedger::new(), 7).unwrap();
        let view = controller.open_mission(101).unwrap();
        assert_eq!(view.reflection_prompt, "What stuck with you?");

        controller.start_simulation().unwrap();
        controller.act(SimulationAction::Quiz(QuizAction::Select(1))).unwrap();
        controller.act(SimulationAction::Quiz(QuizAction::Check)).unwrap();
        assert_eq!(
            controller.act(SimulationAction::Quiz(QuizAction::Next)).unwrap(),
            Step::Completed
        );
        controller.on_reflection_complete(Some("gold")).unwrap();

        let ledger = controller.into_ledger();
        let summary = engine.realm_summary(&ledger).unwrap();
        assert_eq!(summary[0].percent, 100);
    }

    #[test]
    fn json_source_falls_back_to_embedded_data() {
        let source = JsonSource::new(None, Some(r#"{ "starting_funds": 5 }"#.to_string()));
        assert!(!source.load_catalog().unwrap().is_empty());
        assert_eq!(source.load_defaults().unwrap().starting_funds, 5);
        assert!(JsonSource::new(Some("[".to_string()), None)
            .load_catalog()
            .is_err());
    }

    #[test]
    fn custom_registry_reaches_controllers() {
        let engine = JourneyEngine::new(FixtureSource).with_registry(SimulationRegistry::empty());
        let mut controller = engine.create_controller(MemoryLedger::new(), 7).unwrap();
        controller.open_mission(101).unwrap();
        assert!(matches!(
            controller.start_simulation(),
            Err(MissionError::UnknownSimulationType { .. })
        ));
    }
}
