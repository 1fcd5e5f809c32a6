// file: src/cli/mod.rs
// version: 2.0.0
// guid: 3c8e0a57-91d4-4f2b-a6e3-b4d7f1c09e25

//! Command line interface for the devbox provisioner

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::*;
