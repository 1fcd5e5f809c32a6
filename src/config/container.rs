// file: src/config/container.rs
// version: 1.0.0
// guid: 7c41e8b2-0d6f-4a93-b5e2-9f08d3a6c174

//! Per-run container configuration collected from the operator

use crate::error::ProvisionError;
use crate::Result;
use regex::Regex;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use validator::Validate;

/// Lowest container id Proxmox VE accepts
pub const MIN_CTID: u32 = 100;

/// How the guest's `eth0` gets its address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkMode {
    Dhcp,
    Static { ip_cidr: String, gateway: String },
}

impl NetworkMode {
    /// Render the `--net0` value for `pct create`
    pub fn net0(&self, bridge: &str) -> String {
        match self {
            NetworkMode::Dhcp => format!("name=eth0,bridge={},ip=dhcp", bridge),
            NetworkMode::Static { ip_cidr, gateway } => format!(
                "name=eth0,bridge={},ip={},gw={}",
                bridge, ip_cidr, gateway
            ),
        }
    }

    /// Short label used in plans and summaries
    pub fn describe(&self) -> String {
        match self {
            NetworkMode::Dhcp => "dhcp".to_string(),
            NetworkMode::Static { ip_cidr, gateway } => {
                format!("static {} via {}", ip_cidr, gateway)
            }
        }
    }

    /// Validate static addressing
    pub fn validate(&self) -> Result<()> {
        if let NetworkMode::Static { ip_cidr, gateway } = self {
            validate_ip_cidr(ip_cidr)?;
            if gateway.trim().is_empty() {
                return Err(ProvisionError::validation(
                    "Gateway is required for a static IP configuration",
                ));
            }
            gateway.parse::<Ipv4Addr>().map_err(|_| {
                ProvisionError::validation(format!("Invalid gateway address: {}", gateway))
            })?;
        }
        Ok(())
    }
}

/// Everything needed to create one container
#[derive(Clone, Validate)]
pub struct ContainerConfig {
    pub ctid: u32,
    #[validate(length(min = 1, max = 63))]
    pub hostname: String,
    #[validate(length(min = 1))]
    pub password: String,
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
    pub network: NetworkMode,
    #[validate(length(min = 1))]
    pub dns: String,
    pub ssh_key_path: Option<PathBuf>,
    pub install_editor: bool,
}

impl ContainerConfig {
    /// Validate the whole record
    pub fn validate(&self) -> Result<()> {
        validate_ctid(self.ctid)?;
        if self.password.is_empty() {
            return Err(ProvisionError::validation("Password cannot be empty"));
        }
        validate_hostname(&self.hostname)?;
        Validate::validate(self)?;
        self.network.validate()?;
        Ok(())
    }

    /// Root filesystem spec, `<storage>:<size in GB>`
    pub fn rootfs(&self) -> String {
        format!("{}:{}", self.storage, self.disk_gb)
    }
}

impl fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerConfig")
            .field("ctid", &self.ctid)
            .field("hostname", &self.hostname)
            .field("password", &"********")
            .field("cores", &self.cores)
            .field("memory_mb", &self.memory_mb)
            .field("swap_mb", &self.swap_mb)
            .field("disk_gb", &self.disk_gb)
            .field("storage", &self.storage)
            .field("bridge", &self.bridge)
            .field("network", &self.network)
            .field("dns", &self.dns)
            .field("ssh_key_path", &self.ssh_key_path)
            .field("install_editor", &self.install_editor)
            .finish()
    }
}

/// Parse a container id typed by the operator
pub fn parse_ctid(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProvisionError::validation(format!(
            "Container ID must be numeric, got '{}'",
            raw
        )));
    }
    let ctid = trimmed.parse::<u32>().map_err(|_| {
        ProvisionError::validation(format!("Container ID out of range: {}", raw))
    })?;
    validate_ctid(ctid)?;
    Ok(ctid)
}

fn validate_ctid(ctid: u32) -> Result<()> {
    if ctid < MIN_CTID {
        return Err(ProvisionError::validation(format!(
            "Container ID must be at least {}, got {}",
            MIN_CTID, ctid
        )));
    }
    Ok(())
}

/// Validate hostname according to RFC 1123
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() {
        return Err(ProvisionError::validation("Hostname cannot be empty"));
    }
    if hostname.len() > 63 {
        return Err(ProvisionError::validation(
            "Hostname cannot be longer than 63 characters",
        ));
    }

    let hostname_regex = Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?$")
        .map_err(|e| ProvisionError::config(format!("Invalid hostname regex: {}", e)))?;
    if !hostname_regex.is_match(hostname) {
        return Err(ProvisionError::validation(format!(
            "Hostname '{}' does not meet RFC 1123 standards",
            hostname
        )));
    }

    Ok(())
}

/// Validate an `a.b.c.d/nn` address
pub fn validate_ip_cidr(ip_cidr: &str) -> Result<()> {
    let invalid = || {
        ProvisionError::validation(format!(
            "Static IP must look like 192.168.1.50/24, got '{}'",
            ip_cidr
        ))
    };

    let (address, prefix) = ip_cidr.split_once('/').ok_or_else(invalid)?;
    address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }
    Ok(())
}
