// file: tests/common/mod.rs
// version: 1.0.0
// guid: e4b7a1d0-6c35-4f92-8d0e-23f5c9a7b618

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pve_devbox_agent::host::{render_command, CommandExecutor};
use pve_devbox_agent::{ProvisionError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Stand-in for a Proxmox VE host.
///
/// Knows a set of existing container ids, answers `pvesh`/`pveam` queries and
/// replays a queue of ping results. Every command is recorded.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub calls: Vec<String>,
    pub next_id: u32,
    pub existing: Vec<u32>,
    pub pings: VecDeque<bool>,
    pub fail_prefix: Option<String>,
}

impl FakeHost {
    pub fn new(next_id: u32) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }

    pub fn with_existing(mut self, ctid: u32) -> Self {
        self.existing.push(ctid);
        self
    }

    pub fn with_pings(mut self, pings: &[bool]) -> Self {
        self.pings.extend(pings.iter().copied());
        self
    }

    pub fn failing(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls.iter().position(|c| c.starts_with(prefix))
    }

    fn record(&mut self, program: &str, args: &[String]) -> Result<String> {
        let rendered = render_command(program, args);
        self.calls.push(rendered.clone());
        match &self.fail_prefix {
            Some(prefix) if rendered.starts_with(prefix.as_str()) => {
                Err(ProvisionError::ProcessError {
                    command: rendered,
                    exit_code: Some(2),
                    stderr: "simulated failure".to_string(),
                })
            }
            _ => Ok(rendered),
        }
    }
}

#[async_trait]
impl CommandExecutor for FakeHost {
    async fn execute(&mut self, program: &str, args: &[String]) -> Result<()> {
        self.record(program, args).map(|_| ())
    }

    async fn execute_with_output(&mut self, program: &str, args: &[String]) -> Result<String> {
        let rendered = self.record(program, args)?;
        let output = if rendered == "pvesh get /cluster/nextid" {
            format!("{}\n", self.next_id)
        } else if rendered.starts_with("pveam list") {
            "NAME                                                   SIZE\n\
             local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst   120.29MB\n\
             local:vztmpl/debian-12-standard_12.7-1_amd64.tar.zst   123.81MB\n"
                .to_string()
        } else if rendered.ends_with("-- hostname -I") {
            "192.168.1.80 fd00::80\n".to_string()
        } else if rendered.starts_with("pct status") {
            "status: running\n".to_string()
        } else {
            String::new()
        };
        Ok(output)
    }

    async fn check_silent(&mut self, program: &str, args: &[String]) -> Result<bool> {
        let rendered = self.record(program, args)?;
        if rendered.contains(" ping ") {
            return Ok(self.pings.pop_front().unwrap_or(false));
        }
        if let Some(id) = rendered.strip_prefix("pct status ") {
            return Ok(id
                .trim()
                .parse::<u32>()
                .map(|id| self.existing.contains(&id))
                .unwrap_or(false));
        }
        Ok(false)
    }

    async fn path_exists(&mut self, path: &Path) -> bool {
        self.existing
            .iter()
            .any(|id| PathBuf::from(format!("/etc/pve/lxc/{}.conf", id)) == path)
    }
}
