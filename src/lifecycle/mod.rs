// file: src/lifecycle/mod.rs
// version: 1.0.0
// guid: 1b7c4e09-d2a8-4f61-b3e5-8a90f6c2d417

//! Container lifecycle: create, start, and wait for the guest network

pub mod driver;
pub mod poll;

pub use driver::{ContainerDriver, GuestPingProbe};
pub use poll::{Probe, ReachabilityPoll};
