// file: src/reporter/mod.rs
// version: 2.0.0
// guid: 8e2f6a41-b7c0-4d93-a5e8-13c9f0d47b26

//! End-of-run summary

pub mod summary;

pub use summary::Summary;
