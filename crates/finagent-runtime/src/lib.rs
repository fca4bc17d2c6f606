//! Runtime infrastructure for finagent-rs
//!
//! This crate provides the message bus that routes envelopes between
//! registered agents and the [`FinanceRuntime`] that wires shared
//! resources (text generator, bus) into agent contexts.

pub mod bus;
pub mod runtime;

// Re-export key types
pub use bus::{DEFAULT_MAX_DEPTH, MessageBus};
pub use runtime::{FinanceRuntime, FinanceRuntimeBuilder, RuntimeConfig};
