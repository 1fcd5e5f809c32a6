// file: src/utils/system.rs
// version: 2.0.0
// guid: 41c8e7a2-5f93-4d0b-b6e1-8a2d07f3c95e

//! Host precondition checks

use crate::error::ProvisionError;
use crate::Result;
use tracing::{debug, warn};

/// Host tools the pipeline calls
pub const REQUIRED_COMMANDS: &[&str] = &["pct", "pveam", "pvesh"];

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }

    /// Check if running as root
    pub fn is_root() -> bool {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Host tools that are missing from PATH
    pub fn check_prerequisites() -> Vec<String> {
        let missing: Vec<String> = REQUIRED_COMMANDS
            .iter()
            .filter(|cmd| !Self::command_exists(cmd))
            .map(|cmd| cmd.to_string())
            .collect();

        if !std::path::Path::new("/etc/pve").is_dir() {
            warn!("/etc/pve not found - this does not look like a Proxmox VE host");
        }

        missing
    }

    /// Fail unless running as root with every host tool available
    pub fn ensure_preconditions() -> Result<()> {
        if !Self::is_root() {
            return Err(ProvisionError::precondition(
                "This tool must be run as root on the Proxmox VE host",
            ));
        }

        let missing = Self::check_prerequisites();
        if !missing.is_empty() {
            return Err(ProvisionError::precondition(format!(
                "Required host tools not found: {}",
                missing.join(", ")
            )));
        }

        debug!("Host preconditions satisfied");
        Ok(())
    }
}
