// file: src/config/mod.rs
// version: 1.0.0
// guid: 0e6b2d47-9a1c-4f35-8d7e-c4a19b3f6052

//! Configuration module for the devbox provisioner
//!
//! Holds the tool's own defaults (`AppConfig`), the per-run container record
//! (`ContainerConfig`) and the loader for config and answers files.

pub mod container;
pub mod loader;

pub use container::{ContainerConfig, NetworkMode};
pub use loader::{Answers, ConfigLoader};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tool configuration, read from `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Default answers offered at each prompt
    #[validate(nested)]
    pub defaults: Defaults,
    /// Where container templates come from
    #[validate(nested)]
    pub template: TemplateConfig,
    /// Reachability poll settings
    #[validate(nested)]
    pub network_wait: NetworkWaitConfig,
    /// Values baked into the provisioning payload
    #[validate(nested)]
    pub payload: PayloadConfig,
}

/// Default answers for the interactive prompts
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Defaults {
    #[validate(length(min = 1, max = 63))]
    pub hostname: String,
    #[validate(range(min = 1, max = 512))]
    pub cores: u32,
    #[validate(range(min = 256))]
    pub memory_mb: u32,
    pub swap_mb: u32,
    #[validate(range(min = 4))]
    pub disk_gb: u32,
    #[validate(length(min = 1))]
    pub storage: String,
    #[validate(length(min = 1))]
    pub bridge: String,
    #[validate(length(min = 1))]
    pub dns: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            hostname: "devbox".to_string(),
            cores: 4,
            memory_mb: 8192,
            swap_mb: 2048,
            disk_gb: 32,
            storage: "local-lvm".to_string(),
            bridge: "vmbr0".to_string(),
            dns: "1.1.1.1".to_string(),
        }
    }
}

/// Template repository settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TemplateConfig {
    /// Storage holding `vztmpl` content
    #[validate(length(min = 1))]
    pub storage: String,
    /// Substring a template file name must contain
    #[validate(length(min = 1))]
    pub pattern: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            storage: "local".to_string(),
            pattern: "debian-12-standard".to_string(),
        }
    }
}

/// Bounded reachability poll after container start
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NetworkWaitConfig {
    #[validate(range(min = 1, max = 600))]
    pub attempts: u32,
    #[validate(range(max = 60))]
    pub interval_secs: u64,
    #[validate(length(min = 1))]
    pub probe_target: String,
}

impl Default for NetworkWaitConfig {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval_secs: 2,
            probe_target: "1.1.1.1".to_string(),
        }
    }
}

/// Values rendered into the provisioning payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PayloadConfig {
    #[validate(length(min = 1))]
    pub timezone: String,
    #[validate(length(min = 1))]
    pub locale: String,
    #[validate(length(min = 1))]
    pub go_version: String,
    #[validate(range(min = 18))]
    pub node_major: u32,
    pub npm_global_packages: Vec<String>,
    #[validate(length(min = 2))]
    pub workspace_dir: String,
    #[validate(length(min = 2))]
    pub settings_path: String,
    #[validate(range(min = 1, max = 65535))]
    pub editor_port: u32,
    #[validate(length(min = 1))]
    pub editor_password: String,
    /// Where the payload lands inside the guest
    #[validate(length(min = 2))]
    pub remote_path: String,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            timezone: "Etc/UTC".to_string(),
            locale: "en_US.UTF-8".to_string(),
            go_version: "1.23.4".to_string(),
            node_major: 22,
            npm_global_packages: vec!["pnpm".to_string(), "typescript".to_string()],
            workspace_dir: "/root/workspace".to_string(),
            settings_path: "/root/.agent/settings.json".to_string(),
            editor_port: 8443,
            editor_password: "changeme".to_string(),
            remote_path: "/root/devbox-provision.sh".to_string(),
        }
    }
}
