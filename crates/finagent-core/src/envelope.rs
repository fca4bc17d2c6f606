//! Message envelope passed between agents
//!
//! Every inter-agent message travels inside an [`Envelope`]: a routing
//! wrapper that records who sent it, who should receive it, which protocol
//! the content follows, and how deep in a re-entrant send chain it was
//! produced. The protocol-specific payload itself lives in `content`.

use chrono::{DateTime, Utc};
use finagent_protocol::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Routing envelope for a single inter-agent message.
///
/// The wire representation uses the `from`/`to`/`type` key names shared by
/// all protocol payloads, so a serialized envelope can be inspected with the
/// same tooling as the messages it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Name of the sending agent
    #[serde(rename = "from")]
    pub sender: String,
    /// Name of the receiving agent
    #[serde(rename = "to")]
    pub receiver: String,
    /// Protocol the content conforms to
    pub protocol: Protocol,
    /// Message type discriminator, e.g. `EXECUTE_TASK` or `ALERT_REQUIRED`
    #[serde(rename = "type")]
    pub kind: String,
    /// Protocol-specific payload
    pub content: Value,
    /// When the envelope was constructed
    pub timestamp: DateTime<Utc>,
    /// Sender's receive-nesting level when this envelope was sent.
    ///
    /// Top-level sends carry 0. The value only grows along re-entrant
    /// chains (A processes a message and sends to B, which sends back to
    /// A, ...), which is what lets the bus cut cycles without limiting
    /// ordinary fan-out.
    #[serde(default)]
    pub depth: u32,
}

impl Envelope {
    /// Create an envelope with the current timestamp and depth 0.
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        protocol: Protocol,
        kind: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            protocol,
            kind: kind.into(),
            content,
            timestamp: Utc::now(),
            depth: 0,
        }
    }

    /// Set the re-entrancy depth stamp.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Serialize to a JSON value.
    ///
    /// Envelope fields are all plain JSON-serializable data, so this cannot
    /// fail in practice; if serde ever reports an error the envelope is
    /// replaced by an error object rather than panicking, because callers
    /// on the send path must never unwind.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({
                "status": "error",
                "error": format!("envelope serialization failed: {e}"),
            })
        })
    }
}
