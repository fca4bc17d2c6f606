//! System assembly
//!
//! Builds the six agents on one runtime, registers them on the bus, and
//! exposes the entry points the outer application calls. Entry points
//! that belong to a single agent go through the bus like any other
//! message; the planner's full analysis is invoked directly since it is
//! itself the coordinator.

use std::sync::Arc;

use chrono::Utc;
use finagent_core::{Agent, Envelope, Result};
use finagent_protocol::Protocol;
use finagent_runtime::FinanceRuntime;
use serde_json::{Value, json};
use tracing::info;

use crate::agents::{Executor, Interface, KnowledgeBase, Monitor, Notifier, Planner};
use crate::config::{AgentModels, FinanceConfig};

/// Sender stamped on envelopes entering the system from outside the
/// agent graph.
pub const SYSTEM_SENDER: &str = "Sistema";

/// The assembled multi-agent finance system.
pub struct FinanceSystem {
    runtime: Arc<FinanceRuntime>,
    planner: Arc<Planner>,
    executor: Arc<Executor>,
    notifier: Arc<Notifier>,
    interface: Arc<Interface>,
    knowledge_base: Arc<KnowledgeBase>,
    monitor: Arc<Monitor>,
}

impl FinanceSystem {
    /// Build and register the six agents on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        runtime: Arc<FinanceRuntime>,
        config: FinanceConfig,
        models: AgentModels,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let planner = Arc::new(Planner::new(runtime.context(Planner::NAME, &models.planner)));
        let executor = Arc::new(Executor::new(
            runtime.context(Executor::NAME, &models.executor),
            Arc::clone(&config),
        ));
        let notifier = Arc::new(Notifier::new(
            runtime.context(Notifier::NAME, &models.notifier),
            Arc::clone(&config),
        ));
        let interface = Arc::new(Interface::new(
            runtime.context(Interface::NAME, &models.interface),
        ));
        let knowledge_base = Arc::new(KnowledgeBase::new(
            runtime.context(KnowledgeBase::NAME, &models.knowledge_base),
        ));
        let monitor = Arc::new(Monitor::new(runtime.context(Monitor::NAME, &models.monitor)));

        runtime.register(planner.clone());
        runtime.register(executor.clone());
        runtime.register(notifier.clone());
        runtime.register(interface.clone());
        runtime.register(knowledge_base.clone());
        runtime.register(monitor.clone());
        info!(agents = 6, "finance system assembled");

        Ok(Self {
            runtime,
            planner,
            executor,
            notifier,
            interface,
            knowledge_base,
            monitor,
        })
    }

    /// Full financial analysis coordinated by the planner over ANP.
    pub async fn analyze(&self, usuario_id: i64) -> Result<Value> {
        let plan = self
            .planner
            .create_financial_plan(&json!({
                "usuario_id": usuario_id,
                "objetivo": "analisis_financiero_completo",
            }))
            .await?;

        Ok(json!({
            "status": "success",
            "plan": plan,
            "protocol_used": "ANP",
            "agent": Planner::NAME,
            "message": "Plan de análisis creado. Las subtareas serán ejecutadas por los agentes correspondientes.",
        }))
    }

    /// Balance analysis by the executor over ACP.
    pub async fn balance_analysis(&self, usuario_id: i64, periodo_dias: i64) -> Value {
        let analisis = self
            .runtime
            .dispatch(Envelope::new(
                SYSTEM_SENDER,
                Executor::NAME,
                Protocol::Acp,
                "EXECUTE_TASK",
                json!({
                    "tipo": "calcular_balance",
                    "usuario_id": usuario_id,
                    "periodo_dias": periodo_dias,
                }),
            ))
            .await;

        json!({
            "status": "success",
            "analisis": analisis,
            "protocol_used": "ACP",
            "agent": Executor::NAME,
        })
    }

    /// Budget verification by the executor over ACP.
    pub async fn budget_analysis(&self, usuario_id: i64) -> Value {
        let analisis = self
            .runtime
            .dispatch(Envelope::new(
                SYSTEM_SENDER,
                Executor::NAME,
                Protocol::Acp,
                "EXECUTE_TASK",
                json!({
                    "tipo": "verificar_presupuestos",
                    "usuario_id": usuario_id,
                }),
            ))
            .await;

        json!({
            "status": "success",
            "analisis": analisis,
            "protocol_used": "ACP",
            "agent": Executor::NAME,
        })
    }

    /// Spending insights plus a three-month expense forecast, over MCP.
    pub async fn recommendations(&self, usuario_id: i64) -> Value {
        let usuario = json!(usuario_id);
        let insights = self.knowledge_base.get_spending_insights(&usuario, None).await;
        let prediccion = self.knowledge_base.predict_future_expenses(&usuario, 3).await;

        json!({
            "status": "success",
            "insights": insights,
            "prediccion": prediccion,
            "protocol_used": "MCP",
            "agent": KnowledgeBase::NAME,
        })
    }

    /// Dashboard view composed by the interface agent over AGUI.
    pub async fn dashboard(&self, usuario_id: i64, datos: Value) -> Value {
        let dashboard = self
            .runtime
            .dispatch(Envelope::new(
                SYSTEM_SENDER,
                Interface::NAME,
                Protocol::Agui,
                "DISPLAY_DASHBOARD",
                json!({"usuario_id": usuario_id, "datos": datos}),
            ))
            .await;

        json!({
            "status": "success",
            "dashboard": dashboard,
            "protocol_used": "AGUI",
            "agent": Interface::NAME,
        })
    }

    /// Health evaluation and traffic metrics from the monitor.
    pub async fn monitor_status(&self) -> Value {
        let health = self.monitor.check_system_health().await;
        let metrics = self.monitor.metrics();

        json!({
            "health": health,
            "metrics": metrics,
            "timestamp": Utc::now(),
        })
    }

    /// Per-agent registration state and received-message counts.
    pub fn agent_status(&self) -> Value {
        json!({
            "agentes": {
                "planificador": agent_entry(self.planner.as_ref()),
                "ejecutor": agent_entry(self.executor.as_ref()),
                "notificador": agent_entry(self.notifier.as_ref()),
                "interfaz": agent_entry(self.interface.as_ref()),
                "knowledge_base": agent_entry(self.knowledge_base.as_ref()),
                "monitor": agent_entry(self.monitor.as_ref()),
            },
        })
    }

    /// Static description of the running system.
    pub fn overview(&self) -> Value {
        let config = self.runtime.config();
        json!({
            "app": config.app_name,
            "version": config.app_version,
            "status": "online",
            "agentes": {
                "planificador": "activo",
                "ejecutor": "activo",
                "notificador": "activo",
                "interfaz": "activo",
                "knowledge_base": "activo",
                "monitor": "activo",
            },
            "protocolos": ["A2A", "ACP", "ANP", "AGUI", "MCP"],
        })
    }

    pub fn runtime(&self) -> &Arc<FinanceRuntime> {
        &self.runtime
    }

    pub fn planner(&self) -> &Arc<Planner> {
        &self.planner
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.interface
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge_base
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }
}

fn agent_entry(agent: &dyn Agent) -> Value {
    json!({
        "activo": true,
        "historial": agent.context().history().len(),
    })
}
