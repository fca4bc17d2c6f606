//! Message envelope protocols for finagent-rs
//!
//! Five protocols cover the different kinds of inter-agent exchange in the
//! finance system:
//!
//! - [`a2a`] - general agent-to-agent messaging (notifications, requests)
//! - [`acp`] - structured communicative acts with performatives
//! - [`anp`] - negotiations (task allocation, conflict resolution)
//! - [`agui`] - agent-to-user-interface display messages
//! - [`mcp`] - standardized message content with per-type data schemas
//!
//! Every builder stamps a fresh message id and UTC timestamp. Constructors
//! that accept a discriminator as a string fail with
//! [`ProtocolError::Validation`] when the value falls outside the
//! protocol's closed set; `validate` functions check inbound wire values.

pub mod a2a;
pub mod acp;
pub mod agui;
pub mod anp;
pub mod error;
pub mod mcp;
pub mod protocol;

mod wire;

pub use error::{ProtocolError, Result};
pub use protocol::Protocol;

/// Wire-format version shared by all five protocols.
pub const PROTOCOL_VERSION: &str = "1.0";
