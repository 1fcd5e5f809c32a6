// file: src/prompt/mod.rs
// version: 1.0.0
// guid: 2b8e5c71-f403-4d9a-a6e2-0c7d91b45f38

//! Operator input: prompt sources and the configuration collector

pub mod answers;
pub mod collector;
pub mod stdio;

pub use answers::AnswersPrompter;
pub use collector::ConfigCollector;
pub use stdio::StdioPrompter;

use crate::error::ProvisionError;
use crate::Result;

/// Every value the collector asks for, in asking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ctid,
    Hostname,
    Password,
    Cores,
    MemoryMb,
    SwapMb,
    DiskGb,
    Storage,
    Network,
    IpCidr,
    Gateway,
    Dns,
    SshKeyPath,
    InstallEditor,
}

impl Field {
    /// Key used in answers files
    pub fn key(&self) -> &'static str {
        match self {
            Field::Ctid => "ctid",
            Field::Hostname => "hostname",
            Field::Password => "password",
            Field::Cores => "cores",
            Field::MemoryMb => "memory_mb",
            Field::SwapMb => "swap_mb",
            Field::DiskGb => "disk_gb",
            Field::Storage => "storage",
            Field::Network => "network",
            Field::IpCidr => "ip_cidr",
            Field::Gateway => "gateway",
            Field::Dns => "dns",
            Field::SshKeyPath => "ssh_key_path",
            Field::InstallEditor => "install_editor",
        }
    }

    /// Question shown at the interactive prompt
    pub fn question(&self) -> &'static str {
        match self {
            Field::Ctid => "Container ID",
            Field::Hostname => "Hostname",
            Field::Password => "Root password",
            Field::Cores => "CPU cores",
            Field::MemoryMb => "Memory (MB)",
            Field::SwapMb => "Swap (MB)",
            Field::DiskGb => "Disk size (GB)",
            Field::Storage => "Storage for the root disk",
            Field::Network => "Network mode (dhcp/static)",
            Field::IpCidr => "Static IP with prefix (e.g. 192.168.1.50/24)",
            Field::Gateway => "Gateway",
            Field::Dns => "DNS server",
            Field::SshKeyPath => "SSH public key file (blank for none)",
            Field::InstallEditor => "Install browser editor? (yes/no)",
        }
    }
}

/// Source of operator answers.
///
/// `ask` returns the default when the operator gives a blank answer, and an
/// empty string when there is no default either.
pub trait Prompter: Send {
    fn ask(&mut self, field: Field, default: Option<&str>) -> Result<String>;

    /// Read a value without echoing it
    fn ask_secret(&mut self, field: Field) -> Result<String>;

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Interpret a yes/no answer
pub fn parse_yes_no(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        other => Err(ProvisionError::validation(format!(
            "Expected yes or no, got '{}'",
            other
        ))),
    }
}
