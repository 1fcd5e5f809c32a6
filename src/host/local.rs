// file: src/host/local.rs
// version: 1.1.0
// guid: 92d6a0f3-8e1c-4b57-b4a9-6f3e20c85d17

//! Local command execution on the Proxmox VE host

use super::executor::{render_command, CommandExecutor};
use crate::error::ProvisionError;
use crate::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs host programs through `tokio::process`
#[derive(Debug, Default)]
pub struct LocalClient {
    stdout_to_stderr: bool,
}

impl LocalClient {
    /// Create a new local client
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the stdout of inherited-output commands to our stderr, keeping
    /// this process's stdout free for machine-readable output
    pub fn with_stdout_to_stderr(mut self, enabled: bool) -> Self {
        self.stdout_to_stderr = enabled;
        self
    }

    fn inherited_stdout(&self) -> Stdio {
        if self.stdout_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        }
    }

    fn spawn_error(program: &str, args: &[String], e: std::io::Error) -> ProvisionError {
        ProvisionError::ProcessError {
            command: render_command(program, args),
            exit_code: None,
            stderr: format!("Failed to execute command: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl CommandExecutor for LocalClient {
    async fn execute(&mut self, program: &str, args: &[String]) -> Result<()> {
        let rendered = render_command(program, args);
        debug!("Executing command: {}", rendered);

        let status = Command::new(program)
            .args(args)
            .stdout(self.inherited_stdout())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Self::spawn_error(program, args, e))?;

        if !status.success() {
            error!("Command failed with exit code {:?}", status.code());
            return Err(ProvisionError::ProcessError {
                command: rendered,
                exit_code: status.code(),
                stderr: "see output above".to_string(),
            });
        }

        debug!("Command executed successfully");
        Ok(())
    }

    async fn execute_with_output(&mut self, program: &str, args: &[String]) -> Result<String> {
        let rendered = render_command(program, args);
        debug!("Executing command with output: {}", rendered);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Self::spawn_error(program, args, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let exit_code = output.status.code();
            error!("Command failed with exit code {:?}", exit_code);
            if !stderr.trim().is_empty() {
                error!("STDERR: {}", stderr.trim());
            }
            return Err(ProvisionError::ProcessError {
                command: rendered,
                exit_code,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            });
        }

        debug!("Command produced {} bytes of output", stdout.len());
        Ok(stdout)
    }

    async fn check_silent(&mut self, program: &str, args: &[String]) -> Result<bool> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| Self::spawn_error(program, args, e))?;

        Ok(status.success())
    }

    async fn path_exists(&mut self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}
