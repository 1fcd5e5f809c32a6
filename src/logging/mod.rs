// file: src/logging/mod.rs
// version: 1.0.0
// guid: 8b2e4f10-3c7d-4a95-b1e6-2f9d7c0a5e38

//! Logging system for the devbox provisioner

pub mod logger;

pub use logger::{init_logger, phase_span, with_operation_span};
