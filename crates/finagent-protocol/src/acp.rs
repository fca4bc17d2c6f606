//! ACP (agent communication protocol)
//!
//! FIPA-style structured messaging: every message names a performative
//! drawn from a closed set, and messages can be threaded into multi-turn
//! conversations via `conversation_id` and `reply_to`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ProtocolError, Result};
use crate::protocol::Protocol;
use crate::{PROTOCOL_VERSION, wire};

const REQUIRED_FIELDS: [&str; 8] = [
    "protocol",
    "message_id",
    "conversation_id",
    "timestamp",
    "sender",
    "receiver",
    "performative",
    "content",
];

/// The communicative intent of an ACP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performative {
    /// State a fact
    Inform,
    /// Ask the receiver to act
    Request,
    /// Ask for information
    Query,
    /// Confirm a fact
    Confirm,
    /// Decline a request
    Refuse,
    /// Put forward a proposal
    Propose,
    /// Accept a proposal
    Accept,
    /// Reject a proposal
    Reject,
}

impl Performative {
    /// All performatives, in declaration order.
    pub const ALL: [Performative; 8] = [
        Performative::Inform,
        Performative::Request,
        Performative::Query,
        Performative::Confirm,
        Performative::Refuse,
        Performative::Propose,
        Performative::Accept,
        Performative::Reject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Performative::Inform => "inform",
            Performative::Request => "request",
            Performative::Query => "query",
            Performative::Confirm => "confirm",
            Performative::Refuse => "refuse",
            Performative::Propose => "propose",
            Performative::Accept => "accept",
            Performative::Reject => "reject",
        }
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Performative {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Performative::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid performative: {s}")))
    }
}

/// A structured communicative act between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcpMessage {
    pub protocol: Protocol,
    pub version: String,
    pub message_id: String,
    /// Conversation thread id; defaults to the message's own id.
    pub conversation_id: String,
    /// Id of the message this one answers, when part of a dialogue.
    pub reply_to: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub receiver: String,
    pub performative: Performative,
    pub content: Value,
    /// Locale of human-readable content.
    pub language: String,
}

impl AcpMessage {
    /// Thread this message into an existing conversation.
    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }

    /// Mark this message as a reply to an earlier one.
    pub fn replying_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn build(sender: &str, receiver: &str, performative: Performative, content: Value) -> AcpMessage {
    let message_id = wire::message_id();
    AcpMessage {
        protocol: Protocol::Acp,
        version: PROTOCOL_VERSION.to_string(),
        conversation_id: message_id.clone(),
        message_id,
        reply_to: None,
        timestamp: wire::timestamp(),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        performative,
        content,
        language: "es-MX".to_string(),
    }
}

/// Build an ACP message, failing when the performative is out of set.
///
/// The conversation id defaults to the fresh message id; use
/// [`AcpMessage::in_conversation`] and [`AcpMessage::replying_to`] to
/// thread dialogues.
pub fn create_message(
    sender: &str,
    receiver: &str,
    performative: &str,
    content: Value,
) -> Result<AcpMessage> {
    let performative = performative.parse::<Performative>()?;
    Ok(build(sender, receiver, performative, content))
}

/// INFORM: state a fact.
pub fn inform(sender: &str, receiver: &str, fact: Value) -> AcpMessage {
    build(sender, receiver, Performative::Inform, json!({"fact": fact}))
}

/// REQUEST: ask the receiver to perform an action.
pub fn request(sender: &str, receiver: &str, action: &str, parameters: Value) -> AcpMessage {
    build(
        sender,
        receiver,
        Performative::Request,
        json!({
            "action": action,
            "parameters": parameters,
        }),
    )
}

/// QUERY: ask for information matching the given conditions.
pub fn query(sender: &str, receiver: &str, query_type: &str, conditions: Value) -> AcpMessage {
    build(
        sender,
        receiver,
        Performative::Query,
        json!({
            "query_type": query_type,
            "conditions": conditions,
        }),
    )
}

/// CONFIRM: acknowledge a fact, in reply to an earlier message.
pub fn confirm(sender: &str, receiver: &str, fact: Value, reply_to: &str) -> AcpMessage {
    build(
        sender,
        receiver,
        Performative::Confirm,
        json!({"confirmed": fact}),
    )
    .replying_to(reply_to)
}

/// PROPOSE: put forward a proposal.
pub fn propose(sender: &str, receiver: &str, proposal: Value) -> AcpMessage {
    build(
        sender,
        receiver,
        Performative::Propose,
        json!({"proposal": proposal}),
    )
}

/// Check an inbound wire value against the ACP schema.
pub fn validate(message: &Value) -> bool {
    if !wire::has_fields(message, &REQUIRED_FIELDS) {
        return false;
    }
    if message["protocol"] != "ACP" {
        return false;
    }
    message["performative"]
        .as_str()
        .is_some_and(|p| p.parse::<Performative>().is_ok())
}
