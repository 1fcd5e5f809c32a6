// file: src/host/manager.rs
// version: 1.0.0
// guid: b5f27c18-3a94-4e0d-8c61-d47e9a2b0f35

//! `pct`/`pvesh` wrapper for the single container being provisioned

use super::args;
use super::executor::{render_command, CommandExecutor};
use crate::config::ContainerConfig;
use crate::error::ProvisionError;
use crate::Result;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{debug, info};

/// Directory where Proxmox VE keeps container configs
const PVE_LXC_CONFIG_DIR: &str = "/etc/pve/lxc";

/// Drives the container manager CLI over a [`CommandExecutor`].
///
/// In dry-run mode every mutating command is logged and skipped while
/// read-only queries still run.
pub struct ContainerManager<E> {
    executor: E,
    dry_run: bool,
}

impl<E: CommandExecutor> ContainerManager<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Ask the cluster for the next free VMID
    pub async fn next_free_id(&mut self) -> Result<u32> {
        let output = self
            .executor
            .execute_with_output("pvesh", &args(["get", "/cluster/nextid"]))
            .await?;

        let raw = output.trim().trim_matches('"');
        raw.parse::<u32>().map_err(|_| {
            ProvisionError::ProcessError {
                command: "pvesh get /cluster/nextid".to_string(),
                exit_code: Some(0),
                stderr: format!("Unexpected output: {}", output.trim()),
            }
        })
    }

    /// Whether a guest with this id already exists on the host
    pub async fn exists(&mut self, ctid: u32) -> Result<bool> {
        let config_path = format!("{}/{}.conf", PVE_LXC_CONFIG_DIR, ctid);
        if self.executor.path_exists(Path::new(&config_path)).await {
            debug!("Found existing config {}", config_path);
            return Ok(true);
        }

        self.executor
            .check_silent("pct", &args(["status".to_string(), ctid.to_string()]))
            .await
    }

    /// Arguments for `pct create`
    pub fn create_args(config: &ContainerConfig, template: &str) -> Vec<String> {
        let mut create = args([
            "create".to_string(),
            config.ctid.to_string(),
            template.to_string(),
            "--hostname".to_string(),
            config.hostname.clone(),
            "--password".to_string(),
            config.password.clone(),
            "--cores".to_string(),
            config.cores.to_string(),
            "--memory".to_string(),
            config.memory_mb.to_string(),
            "--swap".to_string(),
            config.swap_mb.to_string(),
            "--rootfs".to_string(),
            config.rootfs(),
            "--net0".to_string(),
            config.network.net0(&config.bridge),
            "--nameserver".to_string(),
            config.dns.clone(),
            "--features".to_string(),
            "nesting=1,keyctl=1".to_string(),
            "--unprivileged".to_string(),
            "1".to_string(),
            "--onboot".to_string(),
            "1".to_string(),
        ]);

        if let Some(key_path) = &config.ssh_key_path {
            create.push("--ssh-public-keys".to_string());
            create.push(key_path.display().to_string());
        }

        create
    }

    /// Create the container
    pub async fn create(&mut self, config: &ContainerConfig, template: &str) -> Result<()> {
        info!("Creating container {} ({})", config.ctid, config.hostname);
        let create = Self::create_args(config, template);
        self.mutate("pct", &create).await
    }

    /// Start the container
    pub async fn start(&mut self, ctid: u32) -> Result<()> {
        info!("Starting container {}", ctid);
        self.mutate("pct", &args(["start".to_string(), ctid.to_string()]))
            .await
    }

    /// Current status word reported by `pct status` (e.g. `running`)
    pub async fn status(&mut self, ctid: u32) -> Result<String> {
        let output = self
            .executor
            .execute_with_output("pct", &args(["status".to_string(), ctid.to_string()]))
            .await?;
        Ok(parse_status(&output))
    }

    /// Copy a host file into the guest
    pub async fn push(&mut self, ctid: u32, local: &Path, remote: &str, perms: &str) -> Result<()> {
        info!("Pushing {} to CT {}:{}", local.display(), ctid, remote);
        let push = args([
            "push".to_string(),
            ctid.to_string(),
            local.display().to_string(),
            remote.to_string(),
            "--perms".to_string(),
            perms.to_string(),
        ]);
        self.mutate("pct", &push).await
    }

    /// Run a command inside the guest, streaming its output
    pub async fn exec(&mut self, ctid: u32, command: &[&str]) -> Result<()> {
        let exec = Self::exec_args(ctid, command);
        self.mutate("pct", &exec).await
    }

    /// Run a read-only command inside the guest and capture stdout
    pub async fn exec_with_output(&mut self, ctid: u32, command: &[&str]) -> Result<String> {
        let exec = Self::exec_args(ctid, command);
        self.executor.execute_with_output("pct", &exec).await
    }

    /// Run a command inside the guest as a boolean check
    pub async fn exec_check(&mut self, ctid: u32, command: &[&str]) -> Result<bool> {
        let exec = Self::exec_args(ctid, command);
        self.executor.check_silent("pct", &exec).await
    }

    /// IPv4 addresses the guest reports for itself
    pub async fn guest_addresses(&mut self, ctid: u32) -> Result<Vec<String>> {
        let output = self.exec_with_output(ctid, &["hostname", "-I"]).await?;
        Ok(parse_ipv4_addresses(&output))
    }

    fn exec_args(ctid: u32, command: &[&str]) -> Vec<String> {
        let mut exec = args(["exec".to_string(), ctid.to_string(), "--".to_string()]);
        exec.extend(command.iter().map(|part| part.to_string()));
        exec
    }

    /// Run a command that changes host state, or log it in dry-run mode
    pub(crate) async fn mutate(&mut self, program: &str, args: &[String]) -> Result<()> {
        if self.dry_run {
            info!("DRY RUN: would execute: {}", render_command(program, args));
            return Ok(());
        }
        self.executor.execute(program, args).await
    }

    /// Run a read-only host command and capture stdout
    pub(crate) async fn query(&mut self, program: &str, args: &[String]) -> Result<String> {
        self.executor.execute_with_output(program, args).await
    }
}

/// Extract the status word from `pct status` output (`status: running`)
pub fn parse_status(output: &str) -> String {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("status:"))
        .map(|status| status.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Keep the IPv4 entries of `hostname -I` output
pub fn parse_ipv4_addresses(output: &str) -> Vec<String> {
    output
        .split_whitespace()
        .filter(|token| token.parse::<Ipv4Addr>().is_ok())
        .map(str::to_string)
        .collect()
}
