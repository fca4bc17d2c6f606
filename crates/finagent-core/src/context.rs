//! Agent execution context
//!
//! [`AgentContext`] holds the state every agent carries: its registered
//! name, the model it generates with, a message history, and a weak handle
//! to the bus for outbound sends. Agent structs embed one context each and
//! expose it through [`crate::Agent::context`].

use crate::agent::Delivery;
use crate::envelope::Envelope;
use chrono::{DateTime, Utc};
use finagent_llm::{GenerationRequest, TextGenerator};
use finagent_protocol::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, error, warn};

/// One send or receive recorded in an agent's message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the message passed through the agent
    pub timestamp: DateTime<Utc>,
    /// Protocol the message used
    pub protocol: Protocol,
    /// Direction-tagged message type, e.g. `SEND-EXECUTE_TASK` or
    /// `RECEIVE-ALERT_REQUIRED`
    #[serde(rename = "type")]
    pub message_type: String,
    /// The message content as it crossed the boundary
    pub content: Value,
}

/// Shared state and services for a single agent.
///
/// The context is cheap to share behind the agent itself: history uses an
/// interior mutex and the nesting counter is atomic, so all methods take
/// `&self`.
///
/// # Example
///
/// ```
/// use finagent_core::AgentContext;
/// use finagent_llm::{GenerationRequest, TextGenerator};
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// #[async_trait::async_trait]
/// impl TextGenerator for Fixed {
///     async fn generate(&self, _request: GenerationRequest) -> finagent_llm::Result<String> {
///         Ok("listo".to_string())
///     }
///
///     fn name(&self) -> &str {
///         "fixed"
///     }
/// }
///
/// let context = AgentContext::new("Planificador", "gemini-2.0-flash", Arc::new(Fixed));
/// assert_eq!(context.name(), "Planificador");
/// assert!(context.history().is_empty());
/// ```
pub struct AgentContext {
    name: String,
    model: String,
    generator: Arc<dyn TextGenerator>,
    bus: Option<Weak<dyn Delivery>>,
    history: Mutex<Vec<HistoryEntry>>,
    nesting: AtomicU32,
}

impl AgentContext {
    /// Create a detached context with no bus attached.
    ///
    /// Sends from a detached context degrade to returning the envelope
    /// itself, see [`AgentContext::send`].
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            generator,
            bus: None,
            history: Mutex::new(Vec::new()),
            nesting: AtomicU32::new(0),
        }
    }

    /// Attach the context to a bus.
    ///
    /// The handle is weak: the bus owns the agents, so a strong reference
    /// here would form a cycle and leak the whole system.
    pub fn with_bus(mut self, bus: &Arc<dyn Delivery>) -> Self {
        self.bus = Some(Arc::downgrade(bus));
        self
    }

    /// The agent's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The model identifier used for generation.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append an entry to the message history.
    pub fn record(&self, protocol: Protocol, message_type: impl Into<String>, content: &Value) {
        let mut history = self.history.lock().unwrap();
        history.push(HistoryEntry {
            timestamp: Utc::now(),
            protocol,
            message_type: message_type.into(),
            content: content.clone(),
        });
    }

    /// Snapshot of the message history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    /// Clear the message history.
    pub fn clear_history(&self) {
        self.history.lock().unwrap().clear();
    }

    /// Current receive-nesting level: how many `receive` calls are live on
    /// this agent right now.
    pub fn nesting(&self) -> u32 {
        self.nesting.load(Ordering::Relaxed)
    }

    /// Enter one receive level. The guard restores the level on drop.
    #[must_use = "dropping the guard immediately undoes the nesting bump"]
    pub fn enter(&self) -> NestingGuard<'_> {
        self.nesting.fetch_add(1, Ordering::Relaxed);
        NestingGuard {
            nesting: &self.nesting,
        }
    }

    /// Send a message to another agent over the bus and return the reply.
    ///
    /// The envelope is stamped with the current nesting level so the bus
    /// can cut re-entrant cycles. This method never fails the caller: when
    /// no bus is attached, or the bus has been dropped, the constructed
    /// envelope itself comes back tagged `status: "sent"` and
    /// `delivered: false`, which keeps it distinguishable from a real
    /// reply.
    pub async fn send(
        &self,
        receiver: impl Into<String>,
        protocol: Protocol,
        kind: impl Into<String>,
        content: Value,
    ) -> Value {
        let envelope = Envelope::new(self.name.clone(), receiver, protocol, kind, content)
            .with_depth(self.nesting());
        self.record(
            protocol,
            format!("SEND-{}", envelope.kind),
            &envelope.content,
        );
        debug!(
            agent = %self.name,
            to = %envelope.receiver,
            protocol = %protocol,
            kind = %envelope.kind,
            depth = envelope.depth,
            "message sent"
        );

        match self.bus.as_ref().and_then(Weak::upgrade) {
            Some(bus) => bus.deliver(envelope).await,
            None => {
                warn!(
                    agent = %self.name,
                    to = %envelope.receiver,
                    kind = %envelope.kind,
                    "no bus attached, message not delivered"
                );
                let mut value = envelope.to_value();
                if let Some(object) = value.as_object_mut() {
                    object.insert("status".to_string(), Value::String("sent".to_string()));
                    object.insert("delivered".to_string(), Value::Bool(false));
                }
                value
            }
        }
    }

    /// Generate text from the agent's model.
    ///
    /// Generator failures degrade to an `"Error: ..."` string rather than
    /// propagating. Agents treat unusable model output as a signal to fall
    /// back to deterministic content, so a failed call must not abort the
    /// exchange that triggered it.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> String {
        let request = GenerationRequest::builder(self.model.clone())
            .prompt(prompt)
            .temperature(temperature)
            .build();

        match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                error!(
                    agent = %self.name,
                    model = %self.model,
                    "text generation failed: {e}"
                );
                format!("Error: {e}")
            }
        }
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("generator", &self.generator.name())
            .field("attached", &self.bus.is_some())
            .field("nesting", &self.nesting())
            .finish_non_exhaustive()
    }
}

/// Guard returned by [`AgentContext::enter`]; restores the nesting level
/// when dropped.
pub struct NestingGuard<'a> {
    nesting: &'a AtomicU32,
}

impl Drop for NestingGuard<'_> {
    fn drop(&mut self) {
        self.nesting.fetch_sub(1, Ordering::Relaxed);
    }
}
