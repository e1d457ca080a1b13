//! Clipserve - HTTP service for video fetch-and-transform workflows
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod screenshot;
pub mod server;
