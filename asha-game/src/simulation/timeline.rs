//! Drag-to-order timeline: arrange historical events chronologically.
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::Step;

/// One historical event. `year` is free text such as `"c. 3000 BCE"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    #[serde(deserialize_with = "crate::simulation::lenient::text")]
    pub year: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub events: Vec<TimelineEvent>,
}

/// Sort key extracted from a free-text year.
///
/// All digits in the string are concatenated and read as one number, so
/// `"c. 3000 BCE"` sorts as 3000 and era suffixes are ignored. Strings with
/// no digits sort after every numeric year, by raw text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum YearKey {
    Numeric(u64),
    Text(String),
}

impl YearKey {
    #[must_use]
    pub fn parse(year: &str) -> Self {
        let digits: String = year.chars().filter(char::is_ascii_digit).collect();
        digits
            .parse::<u64>()
            .map_or_else(|_| Self::Text(year.to_string()), Self::Numeric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineResult {
    Unknown,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAction {
    /// Append an available event to the end of the placed sequence.
    Place(String),
    /// Return a placed event to the available pool.
    Unplace(String),
    /// Reorder within the placed sequence.
    MovePlaced { from: usize, to: usize },
    Submit,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineChecker {
    events: Vec<TimelineEvent>,
    solution: Vec<String>,
    seed: u64,
    available: Vec<TimelineEvent>,
    placed: Vec<TimelineEvent>,
    attempts: u32,
    result: TimelineResult,
}

impl TimelineChecker {
    #[must_use]
    pub fn new(params: TimelineParams, seed: u64) -> Self {
        let events = params.events;
        let mut chronological = events.clone();
        chronological.sort_by_cached_key(|event| YearKey::parse(&event.year));
        let solution = chronological.into_iter().map(|event| event.id).collect();

        let mut checker = Self {
            events,
            solution,
            seed,
            available: Vec::new(),
            placed: Vec::new(),
            attempts: 0,
            result: TimelineResult::Unknown,
        };
        checker.reset();
        checker
    }

    pub fn apply(&mut self, action: TimelineAction) -> Step {
        match action {
            TimelineAction::Place(id) => self.place(&id),
            TimelineAction::Unplace(id) => self.unplace(&id),
            TimelineAction::MovePlaced { from, to } => self.move_placed(from, to),
            TimelineAction::Submit => self.submit(),
            TimelineAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    pub fn place(&mut self, id: &str) -> Step {
        if self.is_terminal() {
            return Step::Ignored;
        }
        let Some(position) = self.available.iter().position(|event| event.id == id) else {
            return Step::Ignored;
        };
        let event = self.available.remove(position);
        self.placed.push(event);
        self.clear_stale_result();
        Step::Updated
    }

    pub fn unplace(&mut self, id: &str) -> Step {
        if self.is_terminal() {
            return Step::Ignored;
        }
        let Some(position) = self.placed.iter().position(|event| event.id == id) else {
            return Step::Ignored;
        };
        let event = self.placed.remove(position);
        self.available.push(event);
        self.clear_stale_result();
        Step::Updated
    }

    pub fn move_placed(&mut self, from: usize, to: usize) -> Step {
        if self.is_terminal() || from >= self.placed.len() || to >= self.placed.len() || from == to
        {
            return Step::Ignored;
        }
        let event = self.placed.remove(from);
        self.placed.insert(to, event);
        self.clear_stale_result();
        Step::Updated
    }

    /// Check the placed order. Only allowed once every event is placed.
    pub fn submit(&mut self) -> Step {
        if self.is_terminal() || self.placed.len() != self.events.len() {
            return Step::Ignored;
        }
        self.attempts = self.attempts.saturating_add(1);
        let matches = self
            .placed
            .iter()
            .zip(&self.solution)
            .all(|(event, expected)| &event.id == expected);
        if matches {
            self.result = TimelineResult::Correct;
            Step::Completed
        } else {
            self.result = TimelineResult::Incorrect;
            Step::Updated
        }
    }

    /// Discard placements and reshuffle from the session seed.
    pub fn reset(&mut self) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.available = self.events.clone();
        self.available.shuffle(&mut rng);
        self.placed.clear();
        self.attempts = 0;
        self.result = TimelineResult::Unknown;
    }

    fn clear_stale_result(&mut self) {
        if self.result == TimelineResult::Incorrect {
            self.result = TimelineResult::Unknown;
        }
    }

    #[must_use]
    pub fn available(&self) -> &[TimelineEvent] {
        &self.available
    }

    #[must_use]
    pub fn placed(&self) -> &[TimelineEvent] {
        &self.placed
    }

    /// Event ids in chronological order.
    #[must_use]
    pub fn solution(&self) -> &[String] {
        &self.solution
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn result(&self) -> TimelineResult {
        self.result
    }

    #[must_use]
    pub fn total_events(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_terminal() && self.placed.len() == self.events.len()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.result == TimelineResult::Correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, year: &str) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            year: year.to_string(),
            title: String::new(),
            description: String::new(),
        }
    }

    fn checker(events: Vec<TimelineEvent>) -> TimelineChecker {
        TimelineChecker::new(TimelineParams { events }, 7)
    }

    fn permutations(items: &[String]) -> Vec<Vec<String>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for (i, head) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    fn submit_order(checker: &mut TimelineChecker, order: &[String]) -> TimelineResult {
        checker.reset();
        for id in order {
            assert_eq!(checker.place(id), Step::Updated);
        }
        checker.submit();
        checker.result()
    }

    #[test]
    fn only_chronological_order_is_correct() {
        let mut timeline = checker(vec![
            event("a", "1800"),
            event("b", "1900"),
            event("c", "1850"),
        ]);
        assert_eq!(timeline.solution(), ["a", "c", "b"]);

        let ids: Vec<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
        let mut correct = 0;
        for order in permutations(&ids) {
            let result = submit_order(&mut timeline, &order);
            if order == ["a", "c", "b"] {
                assert_eq!(result, TimelineResult::Correct);
                correct += 1;
            } else {
                assert_eq!(result, TimelineResult::Incorrect, "order {order:?}");
            }
        }
        assert_eq!(correct, 1);
    }

    #[test]
    fn four_event_permutations_have_single_solution() {
        let mut timeline = checker(vec![
            event("coins", "c. 600 BCE"),
            event("paper", "1024"),
            event("gold", "1871"),
            event("bitcoin", "2009"),
        ]);
        let ids: Vec<String> = timeline.solution().to_vec();
        let all = permutations(&ids);
        assert_eq!(all.len(), 24);
        let correct = all
            .iter()
            .filter(|order| submit_order(&mut timeline, order) == TimelineResult::Correct)
            .count();
        assert_eq!(correct, 1);
    }

    #[test]
    fn submission_requires_every_event_placed() {
        let mut timeline = checker(vec![event("a", "1"), event("b", "2")]);
        timeline.place("a");
        assert!(!timeline.can_submit());
        assert_eq!(timeline.submit(), Step::Ignored);
        assert_eq!(timeline.attempts(), 0);
        assert_eq!(timeline.result(), TimelineResult::Unknown);
    }

    #[test]
    fn incorrect_attempts_can_be_rearranged_and_resubmitted() {
        let mut timeline = checker(vec![event("a", "1"), event("b", "2")]);
        timeline.place("b");
        timeline.place("a");
        assert_eq!(timeline.submit(), Step::Updated);
        assert_eq!(timeline.result(), TimelineResult::Incorrect);

        assert_eq!(timeline.move_placed(1, 0), Step::Updated);
        assert_eq!(timeline.result(), TimelineResult::Unknown);
        assert_eq!(timeline.submit(), Step::Completed);
        assert_eq!(timeline.attempts(), 2);
        assert!(timeline.is_terminal());
        assert_eq!(timeline.unplace("a"), Step::Ignored);
    }

    #[test]
    fn unplace_returns_event_to_available() {
        let mut timeline = checker(vec![event("a", "1"), event("b", "2")]);
        timeline.place("a");
        assert_eq!(timeline.available().len(), 1);
        assert_eq!(timeline.unplace("a"), Step::Updated);
        assert_eq!(timeline.available().len(), 2);
        assert!(timeline.placed().is_empty());
        assert_eq!(timeline.unplace("a"), Step::Ignored);
        assert_eq!(timeline.place("zzz"), Step::Ignored);
    }

    #[test]
    fn year_parsing_extracts_digits_and_falls_back_to_text() {
        assert_eq!(YearKey::parse("c. 3000 BCE"), YearKey::Numeric(3000));
        assert_eq!(YearKey::parse("2009"), YearKey::Numeric(2009));
        assert_eq!(
            YearKey::parse("Ancient times"),
            YearKey::Text("Ancient times".to_string())
        );
        assert!(YearKey::parse("99999") < YearKey::parse("Antiquity"));
    }

    #[test]
    fn reset_matches_fresh_instance() {
        let events = vec![event("a", "1"), event("b", "2"), event("c", "3")];
        let fresh = checker(events.clone());
        let mut used = checker(events);
        let first = used.available()[0].id.clone();
        used.place(&first);
        used.reset();
        assert_eq!(used, fresh);
    }

    #[test]
    fn empty_timeline_completes_on_submit() {
        let mut timeline = checker(Vec::new());
        assert!(timeline.can_submit());
        assert_eq!(timeline.submit(), Step::Completed);
    }
}
