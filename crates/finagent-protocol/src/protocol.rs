//! The closed set of protocol families

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// The five protocol families an envelope can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// General agent-to-agent messaging
    A2a,
    /// Structured communicative acts (performative-based)
    Acp,
    /// Agent negotiation (task allocation, conflicts, resources)
    Anp,
    /// Agent-to-user-interface display messages
    Agui,
    /// Standardized message content with data schemas
    Mcp,
}

impl Protocol {
    /// All protocol families, in declaration order.
    pub const ALL: [Protocol; 5] = [
        Protocol::A2a,
        Protocol::Acp,
        Protocol::Anp,
        Protocol::Agui,
        Protocol::Mcp,
    ];

    /// The wire tag for this protocol.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::A2a => "A2A",
            Protocol::Acp => "ACP",
            Protocol::Anp => "ANP",
            Protocol::Agui => "AGUI",
            Protocol::Mcp => "MCP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A2A" => Ok(Protocol::A2a),
            "ACP" => Ok(Protocol::Acp),
            "ANP" => Ok(Protocol::Anp),
            "AGUI" => Ok(Protocol::Agui),
            "MCP" => Ok(Protocol::Mcp),
            other => Err(ProtocolError::Validation(format!(
                "unknown protocol: {other}"
            ))),
        }
    }
}
