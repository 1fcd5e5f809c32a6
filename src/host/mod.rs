// file: src/host/mod.rs
// version: 1.0.0
// guid: 4a8e0c25-71bd-4f93-9e06-b3d52c7f18a4

//! Host-side collaborators: process execution and the Proxmox VE CLIs

pub mod executor;
pub mod local;
pub mod manager;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::{render_command, CommandExecutor};
pub use local::LocalClient;
pub use manager::ContainerManager;

/// Build an owned argument vector from anything string-like
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
