// file: src/host/executor.rs
// version: 1.0.0
// guid: e17b3f92-5c40-4d8a-a2f6-08c9d1e4b7a3

//! Command execution trait for host tooling

use crate::Result;
use std::path::Path;

/// Flags whose following argument must never reach logs or error messages
const SECRET_FLAGS: &[&str] = &["--password"];

/// Trait for running host programs.
///
/// Programs are spawned directly with an argument vector, never through a shell.
#[async_trait::async_trait]
pub trait CommandExecutor: Send {
    /// Run a program with inherited stdout/stderr, failing on non-zero exit
    async fn execute(&mut self, program: &str, args: &[String]) -> Result<()>;

    /// Run a program and return its stdout, failing on non-zero exit
    async fn execute_with_output(&mut self, program: &str, args: &[String]) -> Result<String>;

    /// Run a program as a boolean check without emitting error logs.
    /// Returns Ok(true) on exit 0, Ok(false) on non-zero, Err if it could not be spawned.
    async fn check_silent(&mut self, program: &str, args: &[String]) -> Result<bool>;

    /// Check whether a host path exists
    async fn path_exists(&mut self, path: &Path) -> bool;
}

/// Render a command line for logs, masking secret arguments
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_string());

    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("********".to_string());
            mask_next = false;
            continue;
        }
        mask_next = SECRET_FLAGS.contains(&arg.as_str());
        parts.push(arg.clone());
    }

    parts.join(" ")
}
