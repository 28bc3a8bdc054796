use anyhow::{Context, Result};
use asha_game::{
    ActiveSimulation, InflationAction, JourneyEngine, MemoryLedger, MissionController,
    MissionPhase, MissionSource, ProgressLedger, RealmProgress, SimulationAction, Step, Ticker,
};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::autopilot::{Autopilot, Strategy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionResult {
    pub mission_id: u32,
    pub title: String,
    pub simulation: String,
    pub strategy: Strategy,
    pub seed: u64,
    pub passed: bool,
    pub final_phase: MissionPhase,
    pub steps: usize,
    pub ignored_steps: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub missions: Vec<MissionResult>,
    pub realms: Vec<RealmProgress>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.missions.iter().filter(|result| result.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.missions.iter().all(|result| result.passed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MissionTester {
    strategy: Strategy,
    max_steps: usize,
    realtime: bool,
    verbose: bool,
}

#[derive(Debug, Default)]
struct StepCounts {
    steps: usize,
    ignored: usize,
}

impl MissionTester {
    pub const fn new(strategy: Strategy, max_steps: usize, realtime: bool, verbose: bool) -> Self {
        Self {
            strategy,
            max_steps,
            realtime,
            verbose,
        }
    }

    /// Play every mission for every seed, sharing one progress ledger.
    pub async fn run_all<S>(
        &self,
        engine: &JourneyEngine<S>,
        missions: &[u32],
        seeds: &[u64],
    ) -> Result<RunSummary>
    where
        S: MissionSource,
        S::Error: Into<anyhow::Error>,
    {
        let mut ledger = MemoryLedger::new();
        let mut results = Vec::with_capacity(missions.len() * seeds.len());
        for &seed in seeds {
            for &mission_id in missions {
                let controller = engine
                    .create_controller(&mut ledger, seed)
                    .map_err(Into::<anyhow::Error>::into)
                    .context("failed to create mission controller")?;
                let result = self.run_mission(controller, mission_id, seed).await;
                log::debug!(
                    "mission {mission_id} seed {seed}: {:?} after {} steps",
                    result.final_phase,
                    result.steps
                );
                if self.verbose {
                    let status = if result.passed {
                        "PASS".green()
                    } else {
                        "FAIL".red()
                    };
                    println!(
                        "  {status} mission {} '{}' seed {} ({} steps)",
                        result.mission_id, result.title, seed, result.steps
                    );
                }
                results.push(result);
            }
        }
        let realms = engine.realm_summary(&ledger)?;
        Ok(RunSummary {
            missions: results,
            realms,
        })
    }

    pub async fn run_mission<P: ProgressLedger>(
        &self,
        mut controller: MissionController<P>,
        mission_id: u32,
        seed: u64,
    ) -> MissionResult {
        let started = Instant::now();
        let mut autopilot = Autopilot::new(self.strategy, seed ^ u64::from(mission_id));
        let mut counts = StepCounts::default();
        let mut failures = Vec::new();

        if let Err(err) = self
            .drive(&mut controller, &mut autopilot, mission_id, &mut counts)
            .await
        {
            failures.push(format!("{err:#}"));
        }

        let view = controller.view();
        let final_phase = view.as_ref().map_or(MissionPhase::Intro, |view| view.phase);
        if view.is_some() {
            failures.extend(check_invariants(&controller, mission_id, final_phase));
        }
        if failures.is_empty() && final_phase != MissionPhase::Complete {
            failures.push(format!(
                "stopped in {final_phase:?} after {} steps",
                counts.steps
            ));
        }

        MissionResult {
            mission_id,
            title: view
                .as_ref()
                .map(|view| view.mission.title.clone())
                .unwrap_or_default(),
            simulation: view
                .as_ref()
                .map(|view| view.mission.simulation_type.clone())
                .unwrap_or_default(),
            strategy: self.strategy,
            seed,
            passed: failures.is_empty(),
            final_phase,
            steps: counts.steps,
            ignored_steps: counts.ignored,
            failures,
            duration: started.elapsed(),
        }
    }

    async fn drive<P: ProgressLedger>(
        &self,
        controller: &mut MissionController<P>,
        autopilot: &mut Autopilot,
        mission_id: u32,
        counts: &mut StepCounts,
    ) -> Result<()> {
        controller.open_mission(mission_id)?;
        controller.start_simulation()?;

        while controller.phase() == Some(MissionPhase::Simulation) {
            if counts.steps >= self.max_steps {
                anyhow::bail!("step budget of {} exhausted", self.max_steps);
            }
            let Some(simulation) = controller.simulation() else {
                anyhow::bail!("no simulation is active");
            };
            if self.realtime && matches!(simulation, ActiveSimulation::Inflation(_)) {
                self.run_inflation_realtime(controller, counts).await?;
                continue;
            }
            let Some(action) = autopilot.choose(simulation) else {
                anyhow::bail!("no legal move left after {} steps", counts.steps);
            };
            let step = controller.act(action)?;
            counts.steps += 1;
            if step == Step::Ignored {
                counts.ignored += 1;
            }
        }

        if controller.phase() == Some(MissionPhase::Reflection) {
            controller.on_reflection_complete(Some(&autopilot.reflection()))?;
        }
        Ok(())
    }

    /// Drive an inflation simulation from a live ticker at the fastest
    /// preset speed.
    async fn run_inflation_realtime<P: ProgressLedger>(
        &self,
        controller: &mut MissionController<P>,
        counts: &mut StepCounts,
    ) -> Result<()> {
        let fastest = controller
            .defaults()
            .speed_presets()
            .into_iter()
            .max()
            .unwrap_or(1);
        controller.act(SimulationAction::Inflation(InflationAction::SetSpeed(fastest)))?;
        controller.act(SimulationAction::Inflation(InflationAction::Start))?;
        counts.steps += 2;

        let Some(ActiveSimulation::Inflation(engine)) = controller.simulation() else {
            return Ok(());
        };
        let Some(token) = engine.run_token() else {
            anyhow::bail!("inflation run did not start");
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::spawn(token, engine.tick_interval(), tx);

        let mut outcome = Ok(());
        while let Some(token) = rx.recv().await {
            counts.steps += 1;
            match controller.act(SimulationAction::Inflation(InflationAction::Tick(token))) {
                Ok(Step::Completed) => break,
                Ok(Step::Ignored) => counts.ignored += 1,
                Ok(Step::Updated) => {}
                Err(err) => {
                    outcome = Err(err.into());
                    break;
                }
            }
            if counts.steps >= self.max_steps {
                break;
            }
        }
        ticker.cancel().await;
        outcome
    }
}

fn check_invariants<P: ProgressLedger>(
    controller: &MissionController<P>,
    mission_id: u32,
    phase: MissionPhase,
) -> Vec<String> {
    let mut failures = Vec::new();
    let recorded = controller.ledger().is_complete(mission_id);
    let previously = controller
        .view()
        .is_some_and(|view| view.previously_completed);
    if phase == MissionPhase::Complete && !recorded {
        failures.push("completed mission missing from ledger".to_string());
    }
    if phase != MissionPhase::Complete && recorded && !previously {
        failures.push(format!("ledger marked complete while in {phase:?}"));
    }
    if let Some(view) = controller.view()
        && view.progress_pct != phase.progress_pct()
    {
        failures.push(format!("progress {} does not match {phase:?}", view.progress_pct));
    }
    failures
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
