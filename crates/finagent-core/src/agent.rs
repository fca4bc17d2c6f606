//! Agent and delivery traits

use crate::context::AgentContext;
use crate::envelope::Envelope;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Delivery seam between agents and the message bus.
///
/// Agents hold a weak handle to a `Delivery` implementation and never see
/// the bus type itself, which keeps the core crate free of any runtime
/// dependency. Delivery is synchronous request/reply: the returned value is
/// the receiver's response (or a structured error object from the bus).
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Route an envelope to its receiver and return the receiver's reply.
    async fn deliver(&self, envelope: Envelope) -> Value;
}

/// The core trait that all agents implement.
///
/// Implementors provide [`Agent::process`] with their message handling and
/// expose their shared state through [`Agent::context`]. Message intake
/// goes through the provided [`Agent::receive`], which records the message
/// and tracks re-entrancy before delegating to `process`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Shared state for this agent: name, history, and bus handle.
    fn context(&self) -> &AgentContext;

    /// Handle one incoming envelope and produce a response value.
    async fn process(&self, envelope: Envelope) -> Result<Value>;

    /// The agent's registered name.
    fn name(&self) -> &str {
        self.context().name()
    }

    /// Receive an envelope: record it, bump the nesting level for the
    /// duration of processing, and delegate to [`Agent::process`].
    async fn receive(&self, envelope: Envelope) -> Result<Value> {
        let context = self.context();
        context.record(
            envelope.protocol,
            format!("RECEIVE-{}", envelope.kind),
            &envelope.content,
        );
        debug!(
            agent = %context.name(),
            from = %envelope.sender,
            protocol = %envelope.protocol,
            kind = %envelope.kind,
            "message received"
        );

        let _guard = context.enter();
        self.process(envelope).await
    }
}
