// file: src/host/testing.rs
// version: 1.0.0
// guid: f3a81d6c-0b95-4e27-8d4f-72c6e9b15a08

//! Scripted executor for unit tests

use super::executor::{render_command, CommandExecutor};
use crate::error::ProvisionError;
use crate::Result;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Records every command and answers from prefix-matched scripts.
///
/// Unscripted commands succeed with empty output; unscripted checks return false.
/// Checks whose command contains ` ping ` consume the probe queue.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    calls: Vec<String>,
    outputs: Vec<(String, String)>,
    failures: Vec<String>,
    checks: Vec<(String, bool)>,
    probes: VecDeque<bool>,
    existing_paths: Vec<PathBuf>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, prefix: &str, output: &str) -> Self {
        self.outputs.push((prefix.to_string(), output.to_string()));
        self
    }

    pub fn with_failure(mut self, prefix: &str) -> Self {
        self.failures.push(prefix.to_string());
        self
    }

    pub fn with_check(mut self, prefix: &str, result: bool) -> Self {
        self.checks.push((prefix.to_string(), result));
        self
    }

    pub fn with_probes(mut self, results: &[bool]) -> Self {
        self.probes.extend(results.iter().copied());
        self
    }

    pub fn with_existing_path(mut self, path: &str) -> Self {
        self.existing_paths.push(PathBuf::from(path));
        self
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn probe_count(&self) -> usize {
        self.calls.iter().filter(|c| c.contains(" ping ")).count()
    }

    fn record(&mut self, program: &str, args: &[String]) -> Result<String> {
        let rendered = render_command(program, args);
        self.calls.push(rendered.clone());

        if self.failures.iter().any(|p| rendered.starts_with(p.as_str())) {
            return Err(ProvisionError::ProcessError {
                command: rendered,
                exit_code: Some(1),
                stderr: "scripted failure".to_string(),
            });
        }

        Ok(rendered)
    }
}

#[async_trait::async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(&mut self, program: &str, args: &[String]) -> Result<()> {
        self.record(program, args).map(|_| ())
    }

    async fn execute_with_output(&mut self, program: &str, args: &[String]) -> Result<String> {
        let rendered = self.record(program, args)?;
        Ok(self
            .outputs
            .iter()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    async fn check_silent(&mut self, program: &str, args: &[String]) -> Result<bool> {
        let rendered = match self.record(program, args) {
            Ok(rendered) => rendered,
            Err(_) => return Ok(false),
        };

        if rendered.contains(" ping ") {
            return Ok(self.probes.pop_front().unwrap_or(false));
        }

        Ok(self
            .checks
            .iter()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, result)| *result)
            .unwrap_or(false))
    }

    async fn path_exists(&mut self, path: &Path) -> bool {
        self.existing_paths.iter().any(|p| p == path)
    }
}
