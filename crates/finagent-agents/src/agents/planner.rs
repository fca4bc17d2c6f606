//! Planner agent
//!
//! Decomposes a financial objective into per-agent subtasks and drives
//! their execution over ANP.

use async_trait::async_trait;
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use finagent_protocol::Protocol;
use serde_json::{Value, json};

use super::Monitor;
use crate::prompts;
use crate::task::Plan;

/// Turns analysis requests into plans and coordinates the other agents.
pub struct Planner {
    context: AgentContext,
}

impl Planner {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "Planificador";

    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    /// Build a plan for `request` and run it task by task.
    ///
    /// The model is asked for a JSON plan; when the answer does not parse
    /// the standard three-task plan is substituted with the raw text
    /// attached. Tasks with an assigned agent are dispatched over ANP in
    /// plan order, collecting each reply. The monitor is told about the
    /// distribution once the tasks are out; its reply is not part of the
    /// aggregate.
    pub async fn create_financial_plan(&self, request: &Value) -> Result<Value> {
        let usuario_id = request.get("usuario_id").cloned().unwrap_or(Value::Null);
        let objetivo = request
            .get("objetivo")
            .and_then(Value::as_str)
            .unwrap_or("analizar_finanzas");

        let response = self
            .context
            .generate(&prompts::plan_prompt(objetivo, &usuario_id), 0.5)
            .await;
        let plan = Interpreted::from_text(&response, |raw| Plan::fallback(raw)).into_value();

        let mut task_results = Vec::with_capacity(plan.subtareas.len());
        for tarea in &plan.subtareas {
            if tarea.agente.is_empty() {
                continue;
            }
            let reply = self
                .context
                .send(
                    tarea.agente.clone(),
                    Protocol::Anp,
                    "EXECUTE_TASK",
                    json!({
                        "task": tarea,
                        "plan_estrategia": plan.estrategia,
                        "context": request,
                    }),
                )
                .await;
            task_results.push(json!({"tarea": tarea, "response": reply}));
        }

        let plan = serde_json::to_value(&plan)?;
        self.context
            .send(
                Monitor::NAME,
                Protocol::Anp,
                "TASK_DISTRIBUTION",
                plan.clone(),
            )
            .await;

        Ok(json!({
            "status": "plan_created",
            "plan": plan,
            "task_results": task_results,
            "protocol_used": "ANP",
        }))
    }

    /// Acknowledge a finished subtask.
    fn handle_task_completion(completion: &Value) -> Value {
        json!({
            "status": "task_completion_acknowledged",
            "task_id": completion.get("task_id").cloned().unwrap_or(Value::Null),
            "next_step": "continue_execution",
        })
    }

    /// Plan a review of one month's budgets.
    pub async fn plan_budget_analysis(&self, usuario_id: i64, mes: u32, anio: i32) -> Result<Value> {
        self.create_financial_plan(&json!({
            "usuario_id": usuario_id,
            "objetivo": format!("analizar_presupuesto_mensual_{mes}_{anio}"),
        }))
        .await
    }

    /// Plan a savings strategy toward a target amount.
    pub async fn plan_savings_strategy(&self, usuario_id: i64, objetivo_ahorro: f64) -> Result<Value> {
        self.create_financial_plan(&json!({
            "usuario_id": usuario_id,
            "objetivo": format!("crear_estrategia_ahorro_{objetivo_ahorro}"),
        }))
        .await
    }
}

#[async_trait]
impl Agent for Planner {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "REQUEST_PLAN" => self.create_financial_plan(&envelope.content).await,
            "TASK_COMPLETED" => Ok(Self::handle_task_completion(&envelope.content)),
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}
