use asha_game::simulation::{
    BarterWalker, InflationEngine, QuizRound, TimelineChecker, TradeRouteLedger, normalize_good,
};
use asha_game::{
    ActiveSimulation, BarterAction, InflationAction, QuizAction, ReflectionAction, RouteAction,
    SimulationAction, TimelineAction,
};
use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// How the autopilot plays a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Always pick the correct move
    Scholar,
    /// Pick seeded random moves
    Wanderer,
}

impl Strategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scholar => "scholar",
            Self::Wanderer => "wanderer",
        }
    }
}

const REFLECTIONS: [&str; 3] = [
    "Money works when people trust that nobody can create more of it at will.",
    "Every trade taught me that a shared medium of exchange saves time.",
    "Saving is easier when the unit of account keeps its value.",
];

/// Chooses one action at a time for whichever simulation is active.
pub struct Autopilot {
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Autopilot {
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next action, or `None` when no legal move exists.
    pub fn choose(&mut self, simulation: &ActiveSimulation) -> Option<SimulationAction> {
        match (self.strategy, simulation) {
            (Strategy::Scholar, ActiveSimulation::Timeline(checker)) => {
                scholar_timeline(checker).map(SimulationAction::Timeline)
            }
            (Strategy::Scholar, ActiveSimulation::Barter(walker)) => scholar_barter(walker)
                .map(|index| SimulationAction::Barter(BarterAction::Trade(index))),
            (Strategy::Scholar, ActiveSimulation::TradeRoute(ledger)) => scholar_route(ledger)
                .map(|index| SimulationAction::TradeRoute(RouteAction::Take(index))),
            (Strategy::Scholar, ActiveSimulation::Quiz(round)) => {
                scholar_quiz(round).map(SimulationAction::Quiz)
            }
            (Strategy::Wanderer, ActiveSimulation::Timeline(checker)) => self
                .wander_timeline(checker)
                .map(SimulationAction::Timeline),
            (Strategy::Wanderer, ActiveSimulation::Barter(walker)) => walker
                .available_traders()
                .choose(&mut self.rng)
                .map(|index| SimulationAction::Barter(BarterAction::Trade(*index))),
            (Strategy::Wanderer, ActiveSimulation::TradeRoute(ledger)) => ledger
                .available_routes()
                .choose(&mut self.rng)
                .map(|index| SimulationAction::TradeRoute(RouteAction::Take(*index))),
            (Strategy::Wanderer, ActiveSimulation::Quiz(round)) => {
                self.wander_quiz(round).map(SimulationAction::Quiz)
            }
            (_, ActiveSimulation::Inflation(engine)) => {
                self.drive_inflation(engine).map(SimulationAction::Inflation)
            }
            (_, ActiveSimulation::Reflection(pad)) => {
                if pad.is_terminal() {
                    None
                } else {
                    Some(SimulationAction::Reflection(ReflectionAction::Submit(
                        self.reflection(),
                    )))
                }
            }
        }
    }

    /// Free-text answer for reflection prompts.
    pub fn reflection(&mut self) -> String {
        let index = match self.strategy {
            Strategy::Scholar => 0,
            Strategy::Wanderer => self.rng.gen_range(0..REFLECTIONS.len()),
        };
        REFLECTIONS[index].to_string()
    }

    fn drive_inflation(&mut self, engine: &InflationEngine) -> Option<InflationAction> {
        if engine.is_complete() {
            return None;
        }
        let Some(token) = engine.run_token() else {
            return Some(InflationAction::Start);
        };
        if self.strategy == Strategy::Wanderer && self.rng.gen_bool(0.1) {
            if self.rng.gen_bool(0.5) {
                return Some(InflationAction::Pause);
            }
            if let Some(speed) = engine.speed_presets().choose(&mut self.rng) {
                return Some(InflationAction::SetSpeed(*speed));
            }
        }
        Some(InflationAction::Tick(token))
    }

    fn wander_timeline(&mut self, checker: &TimelineChecker) -> Option<TimelineAction> {
        if checker.is_terminal() {
            return None;
        }
        if checker.can_submit() {
            let placed = checker.placed().len();
            if placed < 2 || self.rng.gen_bool(0.5) {
                return Some(TimelineAction::Submit);
            }
            let from = self.rng.gen_range(0..placed);
            let to = self.rng.gen_range(0..placed);
            return Some(TimelineAction::MovePlaced { from, to });
        }
        checker
            .available()
            .choose(&mut self.rng)
            .map(|event| TimelineAction::Place(event.id.clone()))
    }

    fn wander_quiz(&mut self, round: &QuizRound) -> Option<QuizAction> {
        let question = round.current_question()?;
        if round.is_revealed() {
            return Some(QuizAction::Next);
        }
        if round.selected_answer(round.question_index()).is_some() {
            return Some(QuizAction::Check);
        }
        if question.options.is_empty() {
            return Some(QuizAction::Check);
        }
        Some(QuizAction::Select(self.rng.gen_range(0..question.options.len())))
    }
}

fn scholar_timeline(checker: &TimelineChecker) -> Option<TimelineAction> {
    if checker.is_terminal() {
        return None;
    }
    let solution = checker.solution();
    let on_track = checker
        .placed()
        .iter()
        .zip(solution)
        .all(|(event, expected)| &event.id == expected);
    if !on_track {
        return Some(TimelineAction::Reset);
    }
    match solution.get(checker.placed().len()) {
        Some(next) => Some(TimelineAction::Place(next.clone())),
        None => Some(TimelineAction::Submit),
    }
}

/// First trader on a shortest trade chain to the target good.
fn scholar_barter(walker: &BarterWalker) -> Option<usize> {
    let start = normalize_good(walker.current_item());
    let target = normalize_good(walker.target_item());
    let mut seen = HashSet::from([start.clone()]);
    let mut queue: VecDeque<(String, Option<usize>)> = VecDeque::from([(start, None)]);

    while let Some((good, first_trade)) = queue.pop_front() {
        if good == target {
            return first_trade;
        }
        for (index, trader) in walker.traders().iter().enumerate() {
            let next = normalize_good(&trader.has);
            if normalize_good(&trader.wants) == good && seen.insert(next.clone()) {
                queue.push_back((next, first_trade.or(Some(index))));
            }
        }
    }
    None
}

/// Prefer routes that reach a city not yet visited.
fn scholar_route(ledger: &TradeRouteLedger) -> Option<usize> {
    let available = ledger.available_routes();
    available
        .iter()
        .copied()
        .find(|index| {
            ledger
                .routes()
                .get(*index)
                .is_some_and(|route| !ledger.visited_cities().contains(&route.to))
        })
        .or_else(|| available.first().copied())
}

fn scholar_quiz(round: &QuizRound) -> Option<QuizAction> {
    let question = round.current_question()?;
    if round.is_revealed() {
        return Some(QuizAction::Next);
    }
    let answer = question.correct_index().unwrap_or(0);
    match round.selected_answer(round.question_index()) {
        Some(selected) if selected == answer => Some(QuizAction::Check),
        _ if question.options.is_empty() => Some(QuizAction::Check),
        _ => Some(QuizAction::Select(answer)),
    }
}
