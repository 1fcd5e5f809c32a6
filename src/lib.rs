// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # pve-devbox-agent
//!
//! Creates one LXC development container on a Proxmox VE host and provisions it:
//! collect parameters, make sure a template is present, create and start the
//! container, wait for its network, then push and run a provisioning payload.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod prompt;
pub mod provision;
pub mod reporter;
pub mod utils;

pub use error::{ProvisionError, Result};

/// Version information for the agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
