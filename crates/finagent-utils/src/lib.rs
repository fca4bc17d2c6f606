//! Shared utilities for finagent-rs
//!
//! This crate provides common functionality used across the finagent-rs
//! workspace: tracing setup and application-level configuration.

pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::init_tracing;
