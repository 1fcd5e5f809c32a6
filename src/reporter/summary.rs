// file: src/reporter/summary.rs
// version: 1.1.0
// guid: c5a09e73-2d18-4f6b-8e04-97b3d1f6a2c8

//! Summary of a provisioned container.
//!
//! Presentational only: nothing here changes host or guest state.

use crate::config::{ContainerConfig, PayloadConfig};
use crate::host::{CommandExecutor, ContainerManager};
use crate::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Shown when the guest reports no IPv4 address
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Facts about the finished run. Never carries the root password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub run_id: Uuid,
    pub ctid: u32,
    pub hostname: String,
    pub address: String,
    pub status: String,
    pub cores: u32,
    pub memory_mb: u32,
    pub disk_gb: u32,
    pub network: String,
    /// Host port of the browser editor when it was installed
    pub editor_port: Option<u32>,
    /// Browser editor URL, only when the guest address is known
    pub editor_url: Option<String>,
    /// The editor still uses the shipped default credential
    pub editor_default_credential: bool,
    pub payload_sha256: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Summary {
    /// Query the guest and assemble the summary
    pub async fn collect<E: CommandExecutor>(
        manager: &mut ContainerManager<E>,
        config: &ContainerConfig,
        payload: &PayloadConfig,
        payload_sha256: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        let address = match manager.guest_addresses(config.ctid).await {
            Ok(addresses) => addresses
                .into_iter()
                .next()
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            Err(e) => {
                warn!("Could not read the container address: {}", e);
                UNKNOWN_ADDRESS.to_string()
            }
        };

        let status = manager.status(config.ctid).await.unwrap_or_else(|e| {
            warn!("Could not read the container status: {}", e);
            "unknown".to_string()
        });

        Ok(Self::new(config, payload, address, status, payload_sha256, started_at))
    }

    /// Assemble a summary from already known facts
    pub fn new(
        config: &ContainerConfig,
        payload: &PayloadConfig,
        address: String,
        status: String,
        payload_sha256: &str,
        started_at: DateTime<Utc>,
    ) -> Self {
        let editor_port = config.install_editor.then_some(payload.editor_port);
        let editor_url = editor_port
            .filter(|_| address != UNKNOWN_ADDRESS)
            .map(|port| format!("http://{}:{}", address, port));

        Self {
            run_id: Uuid::new_v4(),
            ctid: config.ctid,
            hostname: config.hostname.clone(),
            address,
            status,
            cores: config.cores,
            memory_mb: config.memory_mb,
            disk_gb: config.disk_gb,
            network: config.network.describe(),
            editor_port,
            editor_url,
            editor_default_credential: config.install_editor
                && payload.editor_password == PayloadConfig::default().editor_password,
            payload_sha256: payload_sha256.to_string(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn ssh_command(&self) -> Option<String> {
        (self.address != UNKNOWN_ADDRESS).then(|| format!("ssh root@{}", self.address))
    }

    pub fn enter_command(&self) -> String {
        format!("pct enter {}", self.ctid)
    }

    /// Where to find the editor when the guest address could not be read
    fn editor_hint(&self, port: u32) -> String {
        format!(
            "port {} on the guest address (run `{}` and check `hostname -I`)",
            port,
            self.enter_command()
        )
    }

    /// Print the colored summary to stdout
    pub fn print(&self) {
        println!();
        println!("{}", "Devbox ready".green().bold());
        println!("  {:<10} {}", "ID:".bold(), self.ctid);
        println!("  {:<10} {}", "Hostname:".bold(), self.hostname);
        println!("  {:<10} {}", "Address:".bold(), self.address.cyan());
        println!("  {:<10} {}", "Status:".bold(), self.status);
        println!(
            "  {:<10} {} cores, {} MB RAM, {} GB disk",
            "Resources:".bold(),
            self.cores,
            self.memory_mb,
            self.disk_gb
        );
        println!("  {:<10} {}", "Network:".bold(), self.network);
        println!();
        if let Some(ssh) = self.ssh_command() {
            println!("  Connect:  {}", ssh.cyan());
        }
        println!("  Console:  {}", self.enter_command().cyan());
        if let Some(port) = self.editor_port {
            match &self.editor_url {
                Some(url) => println!("  Editor:   {}", url.cyan()),
                None => println!("  Editor:   {}", self.editor_hint(port)),
            }
            if self.editor_default_credential {
                println!(
                    "  {}",
                    "WARNING: the editor uses the default password; change it before exposing the port"
                        .yellow()
                );
            }
        }
        println!();
        println!("  Payload SHA-256: {}", self.payload_sha256.dimmed());
        println!(
            "  Took {}s",
            (self.finished_at - self.started_at).num_seconds().max(0)
        );
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container {} ({}) is {}", self.ctid, self.hostname, self.status)?;
        writeln!(f, "Address: {}", self.address)?;
        writeln!(
            f,
            "Resources: {} cores, {} MB RAM, {} GB disk",
            self.cores, self.memory_mb, self.disk_gb
        )?;
        writeln!(f, "Network: {}", self.network)?;
        if let Some(ssh) = self.ssh_command() {
            writeln!(f, "Connect: {}", ssh)?;
        }
        writeln!(f, "Console: {}", self.enter_command())?;
        if let Some(port) = self.editor_port {
            match &self.editor_url {
                Some(url) => writeln!(f, "Editor: {}", url)?,
                None => writeln!(f, "Editor: {}", self.editor_hint(port))?,
            }
            if self.editor_default_credential {
                writeln!(f, "Editor password is the shipped default")?;
            }
        }
        write!(f, "Payload SHA-256: {}", self.payload_sha256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkMode;
    use crate::host::testing::FakeExecutor;

    fn config(install_editor: bool) -> ContainerConfig {
        ContainerConfig {
            ctid: 120,
            hostname: "devbox".to_string(),
            password: "hunter2".to_string(),
            cores: 4,
            memory_mb: 8192,
            swap_mb: 2048,
            disk_gb: 32,
            storage: "local-lvm".to_string(),
            bridge: "vmbr0".to_string(),
            network: NetworkMode::Dhcp,
            dns: "1.1.1.1".to_string(),
            ssh_key_path: None,
            install_editor,
        }
    }

    #[tokio::test]
    async fn test_collect_takes_first_ipv4() {
        // Arrange
        let executor = FakeExecutor::new()
            .with_output("pct exec 120 -- hostname -I", "10.0.0.7 fd00::7 172.17.0.1\n")
            .with_output("pct status 120", "status: running\n");
        let mut manager = ContainerManager::new(executor);

        // Act
        let summary = Summary::collect(
            &mut manager,
            &config(false),
            &PayloadConfig::default(),
            "abc123",
            Utc::now(),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(summary.address, "10.0.0.7");
        assert_eq!(summary.status, "running");
        assert_eq!(summary.ssh_command().as_deref(), Some("ssh root@10.0.0.7"));
    }

    #[tokio::test]
    async fn test_collect_without_address() {
        let mut manager = ContainerManager::new(FakeExecutor::new().with_failure("pct exec"));

        let summary = Summary::collect(
            &mut manager,
            &config(false),
            &PayloadConfig::default(),
            "abc123",
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(summary.address, UNKNOWN_ADDRESS);
        assert!(summary.ssh_command().is_none());
    }

    #[test]
    fn test_display_mentions_id_hostname_and_hint() {
        let summary = Summary::new(
            &config(false),
            &PayloadConfig::default(),
            "10.0.0.7".to_string(),
            "running".to_string(),
            "abc123",
            Utc::now(),
        );

        let text = summary.to_string();
        assert!(text.contains("Container 120 (devbox) is running"));
        assert!(text.contains("pct enter 120"));
        assert!(text.contains("abc123"));
        assert!(!text.contains("Editor"));
    }

    #[test]
    fn test_editor_url_and_default_credential_warning() {
        let summary = Summary::new(
            &config(true),
            &PayloadConfig::default(),
            "10.0.0.7".to_string(),
            "running".to_string(),
            "abc123",
            Utc::now(),
        );

        assert_eq!(summary.editor_url.as_deref(), Some("http://10.0.0.7:8443"));
        assert!(summary.editor_default_credential);
        assert!(summary.to_string().contains("shipped default"));
    }

    #[test]
    fn test_unknown_address_has_no_editor_url() {
        let summary = Summary::new(
            &config(true),
            &PayloadConfig::default(),
            UNKNOWN_ADDRESS.to_string(),
            "running".to_string(),
            "abc123",
            Utc::now(),
        );

        assert_eq!(summary.editor_url, None);
        assert_eq!(summary.editor_port, Some(8443));
        let text = summary.to_string();
        assert!(!text.contains("http://unknown"));
        assert!(text.contains("port 8443"));
        assert!(text.contains("pct enter 120"));
        assert!(text.contains("shipped default"));
    }

    #[test]
    fn test_json_never_contains_password() {
        let summary = Summary::new(
            &config(true),
            &PayloadConfig::default(),
            "10.0.0.7".to_string(),
            "running".to_string(),
            "abc123",
            Utc::now(),
        );

        let json = summary.to_json().unwrap();
        assert!(!json.contains("hunter2"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["ctid"], 120);
    }
}
