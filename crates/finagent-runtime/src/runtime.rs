//! Runtime wiring for the agent system
//!
//! The [`FinanceRuntime`] owns the shared resources every agent needs, the
//! text generator and the message bus, and hands out wired
//! [`AgentContext`] values for agent construction. Agents built from the
//! same runtime can reach each other through the bus by name.

use crate::bus::{DEFAULT_MAX_DEPTH, MessageBus};
use finagent_core::{Agent, AgentContext, AgentError, Delivery, Envelope, Result};
use finagent_llm::TextGenerator;
use serde_json::Value;
use std::sync::Arc;

/// Configuration for the finance runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Re-entrancy limit enforced by the message bus
    pub max_depth: u32,

    /// Model used when an agent has no explicit assignment
    pub default_model: String,

    /// System name reported in overviews
    pub app_name: String,

    /// System version reported in overviews
    pub app_version: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_model: "gemini-2.0-flash".to_string(),
            app_name: "Sistema Multiagente de Finanzas Personales".to_string(),
            app_version: "1.0.0".to_string(),
        }
    }
}

/// Shared-resource container and wiring point for the agent system.
///
/// # Example
///
/// ```
/// use finagent_runtime::FinanceRuntime;
/// use std::sync::Arc;
/// # use finagent_llm::{GenerationRequest, TextGenerator};
/// # struct Fixed;
/// # #[async_trait::async_trait]
/// # impl TextGenerator for Fixed {
/// #     async fn generate(&self, _request: GenerationRequest) -> finagent_llm::Result<String> {
/// #         Ok(String::new())
/// #     }
/// #     fn name(&self) -> &str {
/// #         "fixed"
/// #     }
/// # }
/// let runtime = FinanceRuntime::builder()
///     .generator(Arc::new(Fixed))
///     .max_depth(4)
///     .build()
///     .unwrap();
///
/// let context = runtime.context("Planificador", "gemini-2.0-flash");
/// assert_eq!(context.name(), "Planificador");
/// assert!(runtime.bus().is_empty());
/// ```
pub struct FinanceRuntime {
    generator: Arc<dyn TextGenerator>,
    bus: Arc<MessageBus>,
    config: RuntimeConfig,
}

impl FinanceRuntime {
    /// Create a runtime from parts.
    pub fn new(generator: Arc<dyn TextGenerator>, config: RuntimeConfig) -> Self {
        let bus = Arc::new(MessageBus::new().with_max_depth(config.max_depth));
        Self {
            generator,
            bus,
            config,
        }
    }

    /// Create a new runtime builder.
    pub fn builder() -> FinanceRuntimeBuilder {
        FinanceRuntimeBuilder::new()
    }

    /// The message bus owning all registered agents.
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// The shared text generator.
    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create an agent context wired to this runtime's bus and generator.
    pub fn context(&self, name: impl Into<String>, model: impl Into<String>) -> AgentContext {
        let delivery: Arc<dyn Delivery> = self.bus.clone();
        AgentContext::new(name, model, self.generator.clone()).with_bus(&delivery)
    }

    /// Register an agent on the bus under its own name.
    pub fn register(&self, agent: Arc<dyn Agent>) {
        self.bus.register(agent);
    }

    /// Deliver an envelope from outside the agent graph, e.g. a user
    /// request entering the system.
    pub async fn dispatch(&self, envelope: Envelope) -> Value {
        self.bus.deliver(envelope).await
    }
}

/// Builder for [`FinanceRuntime`]
pub struct FinanceRuntimeBuilder {
    generator: Option<Arc<dyn TextGenerator>>,
    config: RuntimeConfig,
}

impl Default for FinanceRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceRuntimeBuilder {
    /// Create a new runtime builder.
    pub fn new() -> Self {
        Self {
            generator: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the text generator shared by all agents.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bus re-entrancy limit.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the default model.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Build the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator is not set.
    pub fn build(self) -> Result<FinanceRuntime> {
        let generator = self
            .generator
            .ok_or_else(|| AgentError::InitializationFailed("Generator not set".to_string()))?;

        Ok(FinanceRuntime::new(generator, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finagent_llm::GenerationRequest;
    use finagent_protocol::Protocol;
    use serde_json::json;

    struct SilentGenerator;

    #[async_trait]
    impl TextGenerator for SilentGenerator {
        async fn generate(&self, _request: GenerationRequest) -> finagent_llm::Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    struct EchoAgent {
        context: AgentContext,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn context(&self) -> &AgentContext {
            &self.context
        }

        async fn process(&self, envelope: Envelope) -> Result<Value> {
            Ok(json!({"status": "ok", "echo": envelope.kind}))
        }
    }

    fn runtime() -> FinanceRuntime {
        FinanceRuntime::builder()
            .generator(Arc::new(SilentGenerator))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_generator() {
        let result = FinanceRuntime::builder().build();
        assert!(matches!(
            result,
            Err(AgentError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.app_version, "1.0.0");
    }

    #[test]
    fn test_builder_overrides() {
        let runtime = FinanceRuntime::builder()
            .generator(Arc::new(SilentGenerator))
            .max_depth(2)
            .default_model("gemini-2.5-flash")
            .build()
            .unwrap();

        assert_eq!(runtime.bus().max_depth(), 2);
        assert_eq!(runtime.config().default_model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_context_is_wired_to_bus() {
        let runtime = runtime();
        runtime.register(Arc::new(EchoAgent {
            context: runtime.context("Monitor", "test-model"),
        }));

        let sender = runtime.context("Interfaz", "test-model");
        let reply = sender
            .send("Monitor", Protocol::Mcp, "AGENT_STATUS", json!({}))
            .await;

        assert_eq!(reply["status"], "ok");
        assert_eq!(reply["echo"], "AGENT_STATUS");
    }

    #[tokio::test]
    async fn test_dispatch_routes_through_bus() {
        let runtime = runtime();
        runtime.register(Arc::new(EchoAgent {
            context: runtime.context("Planificador", "test-model"),
        }));

        let envelope = Envelope::new(
            "Usuario",
            "Planificador",
            Protocol::A2a,
            "REQUEST_PLAN",
            json!({"solicitud": "analiza mis finanzas"}),
        );
        let reply = runtime.dispatch(envelope).await;
        assert_eq!(reply["echo"], "REQUEST_PLAN");

        let missing = Envelope::new("Usuario", "Contador", Protocol::A2a, "PING", json!({}));
        let reply = runtime.dispatch(missing).await;
        assert_eq!(reply["error"], "agent_not_found");
    }
}
