//! Single-answer multiple choice quiz with end-of-run scoring.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use super::Step;
use crate::numbers::percent_of;

/// Most questions carry four options; they are stored inline.
pub type OptionList = SmallVec<[QuizOption; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub options: OptionList,
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    /// The designated answer. Only the first flagged option counts.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.correct)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::list")]
    pub questions: Vec<QuizQuestion>,
}

/// Final result shared by every realm that scores a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizAction {
    Select(usize),
    Check,
    Next,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRound {
    questions: Vec<QuizQuestion>,
    question_index: usize,
    selected: BTreeMap<usize, usize>,
    revealed: bool,
    score: usize,
    terminal: bool,
}

impl QuizRound {
    #[must_use]
    pub fn new(params: QuizParams) -> Self {
        let mut round = Self {
            questions: params.questions,
            question_index: 0,
            selected: BTreeMap::new(),
            revealed: false,
            score: 0,
            terminal: false,
        };
        round.reset();
        round
    }

    pub fn apply(&mut self, action: QuizAction) -> Step {
        match action {
            QuizAction::Select(option) => self.select(option),
            QuizAction::Check => self.check(),
            QuizAction::Next => self.next(),
            QuizAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    /// Choose an option for the current question. Locked once revealed.
    pub fn select(&mut self, option: usize) -> Step {
        if self.terminal || self.revealed {
            return Step::Ignored;
        }
        let Some(question) = self.current_question() else {
            return Step::Ignored;
        };
        if option >= question.options.len() {
            return Step::Ignored;
        }
        self.selected.insert(self.question_index, option);
        Step::Updated
    }

    /// Reveal the answer for the current question and score the selection.
    pub fn check(&mut self) -> Step {
        if self.terminal || self.revealed {
            return Step::Ignored;
        }
        let Some(question) = self.current_question() else {
            return Step::Ignored;
        };
        // A question without options can only be revealed, never answered.
        let choice = self.selected.get(&self.question_index).copied();
        if choice.is_none() && !question.options.is_empty() {
            return Step::Ignored;
        }
        let correct = choice.is_some() && question.correct_index() == choice;
        if correct {
            self.score += 1;
        }
        self.revealed = true;
        Step::Updated
    }

    /// Move past a revealed question; finishing the last one ends the quiz.
    pub fn next(&mut self) -> Step {
        if self.terminal || !self.revealed {
            return Step::Ignored;
        }
        self.revealed = false;
        if self.question_index + 1 >= self.questions.len() {
            self.terminal = true;
            return Step::Completed;
        }
        self.question_index += 1;
        Step::Updated
    }

    /// Clear every selection and the score.
    pub fn reset(&mut self) {
        self.question_index = 0;
        self.selected.clear();
        self.revealed = false;
        self.score = 0;
        self.terminal = self.questions.is_empty();
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.terminal {
            return None;
        }
        self.questions.get(self.question_index)
    }

    #[must_use]
    pub fn selected_answer(&self, question: usize) -> Option<usize> {
        self.selected.get(&question).copied()
    }

    /// Whether the revealed selection for the current question was right.
    #[must_use]
    pub fn last_answer_correct(&self) -> Option<bool> {
        if !self.revealed {
            return None;
        }
        let question = self.questions.get(self.question_index)?;
        let choice = self.selected.get(&self.question_index)?;
        Some(question.correct_index() == Some(*choice))
    }

    #[must_use]
    pub fn report(&self) -> QuizReport {
        QuizReport {
            score: self.score,
            total: self.questions.len(),
            percent: self.percent(),
        }
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_of(self.score, self.questions.len())
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub const fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            prompt: format!("Pick {correct}"),
            options: (0..4)
                .map(|index| QuizOption {
                    text: format!("option {index}"),
                    correct: index == correct,
                })
                .collect(),
            explanation: None,
        }
    }

    fn round(count: usize) -> QuizRound {
        QuizRound::new(QuizParams {
            questions: (0..count).map(|index| question(index % 4)).collect(),
        })
    }

    fn answer(round: &mut QuizRound, option: usize) -> Step {
        round.select(option);
        round.check();
        round.next()
    }

    #[test]
    fn scoring_reports_rounded_percentage() {
        let mut quiz = round(3);
        assert_eq!(answer(&mut quiz, 0), Step::Updated);
        assert_eq!(answer(&mut quiz, 1), Step::Updated);
        assert_eq!(answer(&mut quiz, 3), Step::Completed);
        assert!(quiz.is_terminal());
        assert_eq!(
            quiz.report(),
            QuizReport {
                score: 2,
                total: 3,
                percent: 67
            }
        );
    }

    #[test]
    fn every_score_matches_rounded_ratio() {
        for correct in 0..=7 {
            let mut quiz = round(7);
            for index in 0..7 {
                let right = index % 4;
                let choice = if index < correct { right } else { (right + 1) % 4 };
                answer(&mut quiz, choice);
            }
            let expected = (f64::from(u8::try_from(correct).unwrap()) / 7.0 * 100.0).round();
            assert_eq!(f64::from(quiz.percent()), expected);
        }
    }

    #[test]
    fn selection_is_locked_after_reveal() {
        let mut quiz = round(2);
        quiz.select(1);
        assert_eq!(quiz.check(), Step::Updated);
        assert_eq!(quiz.last_answer_correct(), Some(false));
        assert_eq!(quiz.select(0), Step::Ignored);
        assert_eq!(quiz.check(), Step::Ignored);
        assert_eq!(quiz.selected_answer(0), Some(1));
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn check_and_next_require_preconditions() {
        let mut quiz = round(2);
        assert_eq!(quiz.check(), Step::Ignored);
        assert_eq!(quiz.next(), Step::Ignored);
        assert_eq!(quiz.select(9), Step::Ignored);
        quiz.select(2);
        quiz.select(0);
        assert_eq!(quiz.selected_answer(0), Some(0));
    }

    #[test]
    fn question_without_flagged_answer_never_scores() {
        let mut quiz = QuizRound::new(QuizParams {
            questions: vec![QuizQuestion {
                prompt: "Trick".to_string(),
                options: smallvec![QuizOption {
                    text: "nope".to_string(),
                    correct: false,
                }],
                explanation: None,
            }],
        });
        assert_eq!(answer(&mut quiz, 0), Step::Completed);
        assert_eq!(quiz.percent(), 0);
    }

    #[test]
    fn question_without_options_can_be_passed() {
        let mut quiz = QuizRound::new(QuizParams {
            questions: vec![
                QuizQuestion {
                    prompt: "Blank".to_string(),
                    options: OptionList::new(),
                    explanation: None,
                },
                question(1),
            ],
        });
        assert_eq!(quiz.select(0), Step::Ignored);
        assert_eq!(quiz.check(), Step::Updated);
        assert_eq!(quiz.next(), Step::Updated);
        assert_eq!(answer(&mut quiz, 1), Step::Completed);
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.percent(), 50);
    }

    #[test]
    fn empty_quiz_is_terminal() {
        let quiz = round(0);
        assert!(quiz.is_terminal());
        assert_eq!(quiz.percent(), 0);
        assert!(quiz.current_question().is_none());
    }

    #[test]
    fn reset_matches_fresh_instance() {
        let fresh = round(3);
        let mut used = fresh.clone();
        answer(&mut used, 0);
        used.select(3);
        used.reset();
        assert_eq!(used, fresh);
    }
}
