// file: src/prompt/answers.rs
// version: 1.0.0
// guid: 64d0f2a9-8c1e-4b57-9e3a-a5f7c2d80b16

//! Non-interactive answers served from a file

use super::{Field, Prompter};
use crate::config::Answers;
use crate::error::ProvisionError;
use crate::Result;
use tracing::debug;

/// Serves answers from an `Answers` map, falling back to defaults
pub struct AnswersPrompter {
    answers: Answers,
}

impl AnswersPrompter {
    pub fn new(answers: Answers) -> Self {
        Self { answers }
    }
}

impl Prompter for AnswersPrompter {
    fn ask(&mut self, field: Field, default: Option<&str>) -> Result<String> {
        match self.answers.get(field.key()) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => {
                debug!("No answer for '{}', using default", field.key());
                Ok(default.unwrap_or_default().to_string())
            }
        }
    }

    fn ask_secret(&mut self, field: Field) -> Result<String> {
        self.answers
            .get(field.key())
            .map(str::to_string)
            .ok_or_else(|| {
                ProvisionError::prompt(format!("Answers file has no '{}' entry", field.key()))
            })
    }

    fn confirm(&mut self, question: &str, _default: bool) -> Result<bool> {
        debug!("Auto-confirming '{}'", question);
        Ok(true)
    }
}
