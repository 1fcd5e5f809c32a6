// file: src/provision/mod.rs
// version: 1.0.0
// guid: 5f1a3d86-b0c2-4e79-a8d3-94e6c01b7f52

//! Provisioning payload executed inside the guest

pub mod compose;
pub mod packages;
pub mod payload;
pub mod settings;

pub use compose::{ComposeFile, ComposeService};
pub use packages::Installer;
pub use payload::{Payload, PayloadBuilder};
pub use settings::AgentSettings;
