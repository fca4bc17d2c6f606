//! Core abstractions for finagent-rs
//!
//! This crate defines the fundamental traits and types shared by every
//! agent in the system: the [`Agent`] trait, the [`AgentContext`] each
//! agent carries, the [`Envelope`] messages travel in, and the
//! [`Delivery`] seam the runtime's bus implements.

pub mod agent;
pub mod context;
pub mod envelope;
pub mod error;

pub use agent::{Agent, Delivery};
pub use context::{AgentContext, HistoryEntry, NestingGuard};
pub use envelope::Envelope;
pub use error::{AgentError, Result};
