// file: src/provision/compose.rs
// version: 1.1.0
// guid: 7a3f0c52-e8d1-4b96-8c47-2d5e91b06fa3

//! Compose definitions for the auxiliary guest services

use crate::config::PayloadConfig;
use crate::error::ProvisionError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port the editor listens on inside its container
const EDITOR_CONTAINER_PORT: u32 = 8080;

/// Subset of the compose schema the payload uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeService {
    pub image: String,
    pub container_name: String,
    pub restart: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl ComposeFile {
    /// Watcher that keeps the other service images up to date
    pub fn update_watcher() -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("WATCHTOWER_CLEANUP".to_string(), "true".to_string());
        environment.insert("WATCHTOWER_SCHEDULE".to_string(), "0 0 4 * * *".to_string());

        Self::single(
            "watchtower",
            ComposeService {
                image: "containrrr/watchtower:latest".to_string(),
                container_name: "watchtower".to_string(),
                restart: "unless-stopped".to_string(),
                user: None,
                ports: Vec::new(),
                volumes: vec!["/var/run/docker.sock:/var/run/docker.sock".to_string()],
                environment,
            },
        )
    }

    /// Browser-based editor on the configured port, guarded by the default password
    pub fn browser_editor(config: &PayloadConfig) -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("PASSWORD".to_string(), config.editor_password.clone());
        environment.insert("TZ".to_string(), config.timezone.clone());

        Self::single(
            "code-server",
            ComposeService {
                image: "codercom/code-server:latest".to_string(),
                container_name: "code-server".to_string(),
                restart: "unless-stopped".to_string(),
                user: Some("0:0".to_string()),
                ports: vec![format!("{}:{}", config.editor_port, EDITOR_CONTAINER_PORT)],
                volumes: vec![
                    format!("{}:/root/workspace", config.workspace_dir),
                    "/opt/devbox/code-server/config:/root/.config".to_string(),
                ],
                environment,
            },
        )
    }

    fn single(name: &str, service: ComposeService) -> Self {
        let mut services = BTreeMap::new();
        services.insert(name.to_string(), service);
        Self { services }
    }

    /// Structural checks beyond what serialization guarantees
    pub fn validate(&self) -> Result<()> {
        if self.services.is_empty() {
            return Err(ProvisionError::payload("Compose file defines no services"));
        }

        for (name, service) in &self.services {
            if service.image.trim().is_empty() {
                return Err(ProvisionError::payload(format!(
                    "Service '{}' has no image",
                    name
                )));
            }
            for port in &service.ports {
                let valid = port
                    .split_once(':')
                    .map(|(host, container)| {
                        host.parse::<u16>().is_ok() && container.parse::<u16>().is_ok()
                    })
                    .unwrap_or(false);
                if !valid {
                    return Err(ProvisionError::payload(format!(
                        "Service '{}' has an invalid port mapping '{}'",
                        name, port
                    )));
                }
            }
            for volume in &service.volumes {
                if !is_valid_bind(volume) {
                    return Err(ProvisionError::payload(format!(
                        "Service '{}' has an invalid volume '{}': expected /host/path:/container/path[:ro|rw] with no ':' inside either path",
                        name, volume
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate and serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Short-syntax bind mount: two absolute paths and an optional access mode
fn is_valid_bind(volume: &str) -> bool {
    let parts: Vec<&str> = volume.split(':').collect();
    let (host, container) = match parts.as_slice() {
        [host, container] => (*host, *container),
        [host, container, "ro"] | [host, container, "rw"] => (*host, *container),
        _ => return false,
    };
    [host, container]
        .iter()
        .all(|path| path.starts_with('/') && !path.chars().any(char::is_control))
}
