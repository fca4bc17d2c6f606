//! Message bus and agent registry
//!
//! The [`MessageBus`] owns every registered agent and implements the
//! [`Delivery`] seam from finagent-core. Delivery is synchronous: the
//! sender awaits the receiver's reply. A depth guard cuts re-entrant
//! send cycles that would otherwise recurse without bound.

use async_trait::async_trait;
use finagent_core::{Agent, Delivery, Envelope};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{error, info, instrument, warn};

/// Default re-entrancy limit for [`MessageBus`].
///
/// Ordinary fan-out (one agent dispatching to many) stays at depth 1, so
/// the limit only matters for genuine cycles. Eight levels is far beyond
/// anything the finance agents do on purpose.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Registry and router for all agents in the system.
///
/// Agents are keyed by their registered name. Registering a second agent
/// under an existing name replaces the first, which makes re-wiring in
/// tests straightforward.
pub struct MessageBus {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
    max_depth: u32,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MessageBus {
    /// Create a bus with the default depth limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the re-entrancy limit. Envelopes stamped with a depth greater
    /// than this are rejected instead of delivered.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured re-entrancy limit.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Register an agent under its own name.
    pub fn register(&self, agent: Arc<dyn Agent>) {
        let name = agent.name().to_string();
        let mut agents = self.agents.write().unwrap();
        if agents.insert(name.clone(), agent).is_some() {
            warn!(agent = %name, "replacing previously registered agent");
        } else {
            info!(agent = %name, "agent registered");
        }
    }

    /// Look up an agent by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Agent>> {
        let agents = self.agents.read().unwrap();
        agents.get(name).cloned()
    }

    /// Names of all registered agents, sorted.
    pub fn agent_names(&self) -> Vec<String> {
        let agents = self.agents.read().unwrap();
        let mut names: Vec<String> = agents.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        let agents = self.agents.read().unwrap();
        agents.len()
    }

    /// Check if no agents are registered.
    pub fn is_empty(&self) -> bool {
        let agents = self.agents.read().unwrap();
        agents.is_empty()
    }
}

#[async_trait]
impl Delivery for MessageBus {
    /// Route an envelope to its receiver and return the receiver's reply.
    ///
    /// Failures come back as structured values rather than errors, so a
    /// sending agent can always inspect the outcome:
    ///
    /// - empty receiver: `{"status": "error", "error": "no_recipient"}`
    /// - unknown receiver: `{"status": "error", "error": "agent_not_found",
    ///   "agent": name}`
    /// - depth limit hit: `{"status": "error", "error":
    ///   "depth_limit_exceeded", "agent": name, "depth": n}`
    /// - receiver's `process` failed: `{"status": "error", "error":
    ///   description}`
    ///
    /// A `null` response from the receiver maps to
    /// `{"status": "delivered"}`.
    #[instrument(skip(self, envelope), fields(
        from = %envelope.sender,
        to = %envelope.receiver,
        kind = %envelope.kind,
        depth = envelope.depth,
    ))]
    async fn deliver(&self, envelope: Envelope) -> Value {
        if envelope.receiver.is_empty() {
            warn!("envelope has no recipient");
            return json!({"status": "error", "error": "no_recipient"});
        }

        let Some(agent) = self.resolve(&envelope.receiver) else {
            warn!(agent = %envelope.receiver, "recipient not registered");
            return json!({
                "status": "error",
                "error": "agent_not_found",
                "agent": envelope.receiver,
            });
        };

        if envelope.depth > self.max_depth {
            warn!(
                agent = %envelope.receiver,
                depth = envelope.depth,
                max_depth = self.max_depth,
                "re-entrancy limit reached, message dropped"
            );
            return json!({
                "status": "error",
                "error": "depth_limit_exceeded",
                "agent": envelope.receiver,
                "depth": envelope.depth,
            });
        }

        let receiver = envelope.receiver.clone();
        match agent.receive(envelope).await {
            Ok(Value::Null) => json!({"status": "delivered"}),
            Ok(value) => value,
            Err(e) => {
                error!(agent = %receiver, "agent failed to process message: {e}");
                json!({"status": "error", "error": e.to_string()})
            }
        }
    }
}
