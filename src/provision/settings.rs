// file: src/provision/settings.rs
// version: 1.0.0
// guid: d6b2e8f4-1a07-4c39-b5d0-7e3f9a24c815

//! Pinned agent settings written into the guest

use crate::config::PayloadConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tool invocations the agent may run without asking
const ALLOWED_TOOLS: &[&str] = &[
    "Bash(bun:*)",
    "Bash(cargo:*)",
    "Bash(docker:*)",
    "Bash(docker compose:*)",
    "Bash(git:*)",
    "Bash(go:*)",
    "Bash(make:*)",
    "Bash(node:*)",
    "Bash(npm:*)",
    "Bash(npx:*)",
    "Bash(pnpm:*)",
    "Bash(python3:*)",
    "Bash(pip:*)",
    "Bash(rustc:*)",
    "Bash(rg:*)",
    "Edit(**)",
    "Read(**)",
    "Write(**)",
];

/// Invocations that stay blocked even inside the sandbox
const DENIED_TOOLS: &[&str] = &["Bash(rm -rf /:*)", "Read(/etc/shadow)"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

/// Settings document: permission patterns and environment overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub permissions: Permissions,
    pub env: BTreeMap<String, String>,
}

impl AgentSettings {
    /// Settings for a devbox workspace
    pub fn for_workspace(config: &PayloadConfig, hostname: &str) -> Self {
        let mut env = BTreeMap::new();
        env.insert("DEVBOX_HOSTNAME".to_string(), hostname.to_string());
        env.insert("WORKSPACE_DIR".to_string(), config.workspace_dir.clone());
        env.insert("TZ".to_string(), config.timezone.clone());
        env.insert("GOPATH".to_string(), "/root/go".to_string());
        env.insert("DISABLE_TELEMETRY".to_string(), "1".to_string());
        env.insert("DISABLE_AUTOUPDATER".to_string(), "1".to_string());

        Self {
            permissions: Permissions {
                allow: ALLOWED_TOOLS.iter().map(|s| s.to_string()).collect(),
                deny: DENIED_TOOLS.iter().map(|s| s.to_string()).collect(),
            },
            env,
        }
    }

    /// Pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
