//! A2A (agent-to-agent) protocol
//!
//! The loosest of the five protocols: direct messages between any pair of
//! agents, with a free-form `message_type` and an open content payload.
//! Suited to notifications and lightweight coordination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;
use crate::protocol::Protocol;
use crate::{PROTOCOL_VERSION, wire};

/// Fields every A2A envelope must carry on the wire.
const REQUIRED_FIELDS: [&str; 7] = [
    "protocol",
    "message_id",
    "timestamp",
    "sender",
    "receiver",
    "message_type",
    "content",
];

/// A general-purpose agent-to-agent message.
///
/// # Example
///
/// ```
/// use finagent_protocol::a2a;
/// use serde_json::json;
///
/// let message = a2a::create_message(
///     "Ejecutor",
///     "Notificador",
///     "notification",
///     json!({"detalle": "presupuesto excedido"}),
/// );
/// assert!(a2a::validate(&message.to_value().unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2aMessage {
    pub protocol: Protocol,
    pub version: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub receiver: String,
    pub message_type: String,
    pub priority: String,
    pub content: Value,
}

impl A2aMessage {
    /// Override the default `normal` priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Build an A2A message with a fresh id and current timestamp.
///
/// `message_type` is deliberately unconstrained; A2A carries anything from
/// `notification` to ad-hoc coordination types.
pub fn create_message(
    sender: &str,
    receiver: &str,
    message_type: &str,
    content: Value,
) -> A2aMessage {
    A2aMessage {
        protocol: Protocol::A2a,
        version: PROTOCOL_VERSION.to_string(),
        message_id: wire::message_id(),
        timestamp: wire::timestamp(),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        message_type: message_type.to_string(),
        priority: "normal".to_string(),
        content,
    }
}

/// Notification message: `content` wraps a notification type and its data.
pub fn create_notification(
    sender: &str,
    receiver: &str,
    notification_type: &str,
    data: Value,
) -> A2aMessage {
    create_message(
        sender,
        receiver,
        "notification",
        json!({
            "notification_type": notification_type,
            "data": data,
        }),
    )
}

/// Request message asking the receiver to perform an action.
pub fn create_request(sender: &str, receiver: &str, action: &str, parameters: Value) -> A2aMessage {
    create_message(
        sender,
        receiver,
        "request",
        json!({
            "action": action,
            "parameters": parameters,
        }),
    )
}

/// Response message referring back to an earlier request.
pub fn create_response(
    sender: &str,
    receiver: &str,
    request_id: &str,
    status: &str,
    result: Value,
) -> A2aMessage {
    create_message(
        sender,
        receiver,
        "response",
        json!({
            "request_id": request_id,
            "status": status,
            "result": result,
        }),
    )
}

/// Check an inbound wire value against the A2A schema.
pub fn validate(message: &Value) -> bool {
    if !wire::has_fields(message, &REQUIRED_FIELDS) {
        return false;
    }
    message["protocol"] == "A2A"
}
