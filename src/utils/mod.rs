// file: src/utils/mod.rs
// version: 2.0.0
// guid: 0d5a92f7-c3e1-4b86-9f40-e7b1a6c28d53

//! Utility modules for system operations

pub mod system;

pub use system::SystemUtils;
