//! Monitor agent
//!
//! Tracks agent status reports and plan distributions, and answers
//! system health checks. State lives behind mutexes; guards are never
//! held across an await.

use async_trait::async_trait;
use chrono::Utc;
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::prompts;

/// Supervises agent traffic and overall system state.
pub struct Monitor {
    context: AgentContext,
    agent_status: Mutex<Map<String, Value>>,
    activity: Mutex<Vec<Value>>,
}

impl Monitor {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "Monitor";

    pub fn new(context: AgentContext) -> Self {
        Self {
            context,
            agent_status: Mutex::new(Map::new()),
            activity: Mutex::new(Vec::new()),
        }
    }

    /// Log a plan distribution and review its workload balance.
    async fn monitor_task_distribution(&self, distribution: &Value) -> Value {
        let subtareas = distribution
            .get("subtareas")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let estrategia = distribution.get("estrategia").cloned().unwrap_or(Value::Null);
        let agentes: BTreeSet<String> = subtareas
            .iter()
            .filter_map(|tarea| tarea.get("agente").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let log_entry = json!({
            "timestamp": Utc::now(),
            "tipo": "task_distribution",
            "total_tareas": subtareas.len(),
            "estrategia": estrategia,
            "agentes_involucrados": agentes,
        });
        self.activity.lock().unwrap().push(log_entry.clone());

        let response = self
            .context
            .generate(&prompts::distribution_prompt(distribution), 0.4)
            .await;
        let analisis = Interpreted::from_text(&response, |_| {
            json!({
                "balanceada": true,
                "cuellos_botella": [],
                "orden_sugerido": subtareas,
                "estimacion_minutos": 5,
            })
        })
        .into_value();

        json!({
            "status": "distribution_monitored",
            "analisis": analisis,
            "log_entry": log_entry,
        })
    }

    /// Record a status report from another agent.
    fn update_agent_status(&self, status: &Value) -> Value {
        let agent_name = status
            .get("agent_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let estado = status.get("estado").cloned().unwrap_or(Value::Null);
        let metadata = status.get("metadata").cloned().unwrap_or_else(|| json!({}));

        self.agent_status.lock().unwrap().insert(
            agent_name.clone(),
            json!({
                "estado": estado,
                "ultima_actualizacion": Utc::now(),
                "metadata": metadata,
            }),
        );

        json!({
            "status": "agent_status_updated",
            "agent": agent_name,
            "estado": estado,
        })
    }

    /// Evaluate overall system health from the current snapshot.
    pub async fn check_system_health(&self) -> Value {
        let estados = Value::Object(self.agent_status.lock().unwrap().clone());
        let queue_len = self.activity.lock().unwrap().len();

        let response = self
            .context
            .generate(&prompts::health_prompt(&estados, queue_len), 0.3)
            .await;
        let health = Interpreted::from_text(&response, |_| {
            json!({
                "estado_general": "healthy",
                "agentes_problema": [],
                "recomendaciones": ["Sistema operando normalmente"],
                "alertas": [],
            })
        })
        .into_value();

        json!({
            "status": "health_check_completed",
            "health": health,
            "timestamp": Utc::now(),
        })
    }

    /// Plan subtasks addressed to the monitor fold into a health check.
    async fn execute_monitor_task(&self, content: &Value) -> Value {
        let task = content.get("task").cloned().unwrap_or(Value::Null);
        let tipo = task.get("tipo").and_then(Value::as_str).unwrap_or_default();

        if matches!(tipo, "registrar_actividad" | "monitorear_sistema") {
            self.check_system_health().await
        } else {
            json!({"status": "task_executed", "task": task})
        }
    }

    /// Current traffic counters and the most recent activity entries.
    pub fn metrics(&self) -> Value {
        let status = self.agent_status.lock().unwrap();
        let activity = self.activity.lock().unwrap();

        let agentes_activos = status
            .values()
            .filter(|entry| entry["estado"] == "active")
            .count();
        let start = activity.len().saturating_sub(10);

        json!({
            "total_mensajes": activity.len(),
            "agentes_activos": agentes_activos,
            "agentes_total": status.len(),
            "ultima_actividad": Utc::now(),
            "cola_mensajes": activity[start..].to_vec(),
        })
    }

    /// Free-form review of the communication patterns seen so far.
    pub async fn analyze_communication_flow(&self) -> Value {
        let total_messages = self.activity.lock().unwrap().len();
        let tracked_agents = self.agent_status.lock().unwrap().len();

        let analisis = self
            .context
            .generate(&prompts::flow_prompt(total_messages, tracked_agents), 0.5)
            .await;

        json!({
            "status": "flow_analyzed",
            "analisis": analisis,
        })
    }

    /// Drop the activity log and report how many entries were cleared.
    pub fn clear_activity(&self) -> Value {
        let mut activity = self.activity.lock().unwrap();
        let cleared = activity.len();
        activity.clear();

        json!({
            "status": "queue_cleared",
            "messages_cleared": cleared,
        })
    }
}

#[async_trait]
impl Agent for Monitor {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "TASK_DISTRIBUTION" => Ok(self.monitor_task_distribution(&envelope.content).await),
            "AGENT_STATUS" => Ok(self.update_agent_status(&envelope.content)),
            "SYSTEM_HEALTH_CHECK" => Ok(self.check_system_health().await),
            "EXECUTE_TASK" => Ok(self.execute_monitor_task(&envelope.content).await),
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}
