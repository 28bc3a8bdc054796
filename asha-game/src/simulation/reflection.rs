//! Free-text reflection used as a mission's whole interactive step.
use serde::{Deserialize, Serialize};

use super::Step;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionParams {
    #[serde(default, deserialize_with = "crate::simulation::lenient::field")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionAction {
    Submit(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionPad {
    prompt: String,
    response: Option<String>,
}

impl ReflectionPad {
    #[must_use]
    pub fn new(params: ReflectionParams, fallback_prompt: &str) -> Self {
        let prompt = params
            .prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or_else(|| fallback_prompt.to_string());
        Self {
            prompt,
            response: None,
        }
    }

    pub fn apply(&mut self, action: ReflectionAction) -> Step {
        match action {
            ReflectionAction::Submit(text) => self.submit(&text),
            ReflectionAction::Reset => {
                self.reset();
                Step::Updated
            }
        }
    }

    /// Record a non-blank response. The first accepted response ends the pad.
    pub fn submit(&mut self, text: &str) -> Step {
        if self.response.is_some() || text.trim().is_empty() {
            return Step::Ignored;
        }
        self.response = Some(text.trim().to_string());
        Step::Completed
    }

    pub fn reset(&mut self) {
        self.response = None;
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.response.is_some()
    }
}
