//! Knowledge base agent
//!
//! Answers data queries and stores analyses, shaping every response as a
//! validated MCP message. No persistence layer is wired in: query result
//! sets are empty but carry the full query frame, so callers and tests
//! exercise the real message shapes.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use finagent_protocol::mcp;
use serde_json::{Value, json};

use crate::prompts;

/// Provides historical financial data and analysis storage over MCP.
pub struct KnowledgeBase {
    context: AgentContext,
}

impl KnowledgeBase {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "KnowledgeBase";

    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    /// Answer a transaction query with an MCP query result.
    async fn query_transactions(&self, query: &Value) -> Result<Value> {
        let usuario_id = query.get("usuario_id").cloned().unwrap_or(Value::Null);
        let periodo_dias = query
            .get("periodo_dias")
            .and_then(Value::as_i64)
            .unwrap_or(30);
        let categoria = query.get("categoria").cloned().unwrap_or(Value::Null);
        let tipo = query.get("tipo").cloned().unwrap_or(Value::Null);

        let mut message = mcp::create_query_result(
            Self::NAME,
            "transactions",
            Vec::new(),
            0,
            Some(json!({"categoria": categoria, "tipo": tipo})),
        );
        if let Some(data) = message.data.as_object_mut() {
            data.insert("usuario_id".to_string(), usuario_id);
            data.insert(
                "periodo".to_string(),
                json!({
                    "inicio": Utc::now() - Duration::days(periodo_dias),
                    "fin": Utc::now(),
                }),
            );
        }

        Ok(json!({
            "status": "query_completed",
            "result": message.to_value()?,
            "protocol_used": "MCP",
        }))
    }

    /// Answer a budget query, defaulting to the current month.
    async fn query_budgets(&self, query: &Value) -> Result<Value> {
        use chrono::Datelike;

        let now = Utc::now();
        let usuario_id = query.get("usuario_id").cloned().unwrap_or(Value::Null);
        let mes = query
            .get("mes")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| u64::from(now.month()));
        let anio = query
            .get("anio")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| i64::from(now.year()));

        let mut message = mcp::create_query_result(Self::NAME, "budgets", Vec::new(), 0, None);
        if let Some(data) = message.data.as_object_mut() {
            data.insert("usuario_id".to_string(), usuario_id);
            data.insert("periodo".to_string(), json!({"mes": mes, "anio": anio}));
            data.insert("total_asignado".to_string(), json!(0.0));
            data.insert("total_gastado".to_string(), json!(0.0));
        }

        Ok(json!({
            "status": "query_completed",
            "result": message.to_value()?,
            "protocol_used": "MCP",
        }))
    }

    /// Analyze historical patterns and wrap the outcome as an MCP
    /// analysis message.
    async fn query_historical_data(&self, query: &Value) -> Result<Value> {
        let usuario_id = query.get("usuario_id").cloned().unwrap_or(Value::Null);
        let meses_atras = query
            .get("meses_atras")
            .and_then(Value::as_i64)
            .unwrap_or(6);

        let response = self
            .context
            .generate(&prompts::historical_prompt(&usuario_id, meses_atras), 0.4)
            .await;
        let analisis = Interpreted::from_text(&response, |raw| {
            json!({
                "patrones_gasto": {},
                "tendencias_ingreso": {},
                "anomalias": [],
                "predicciones": {},
                "analisis_ia": raw,
            })
        })
        .into_value();

        let message = mcp::create_analysis(
            Self::NAME,
            "historical",
            json!({"meses_atras": meses_atras}),
            analisis,
            None,
        );

        Ok(json!({
            "status": "historical_analysis_completed",
            "result": message.to_value()?,
            "protocol_used": "MCP",
        }))
    }

    /// Acknowledge an analysis for storage with a stamped receipt.
    async fn store_analysis(&self, analysis: &Value) -> Result<Value> {
        let usuario_id = analysis.get("usuario_id").cloned().unwrap_or(Value::Null);
        let tipo = analysis.get("tipo").cloned().unwrap_or(Value::Null);

        let message = mcp::create_message(
            Self::NAME,
            "status_update",
            json!({
                "stored": true,
                "usuario_id": usuario_id,
                "tipo": tipo,
                "stored_at": Utc::now(),
            }),
        )?;

        Ok(json!({
            "status": "analysis_stored",
            "result": message.to_value()?,
            "protocol_used": "MCP",
        }))
    }

    /// Spending insights for a user, optionally narrowed to a category.
    pub async fn get_spending_insights(&self, usuario_id: &Value, categoria: Option<&str>) -> Value {
        let response = self
            .context
            .generate(&prompts::insights_prompt(usuario_id, categoria), 0.5)
            .await;
        let insights = Interpreted::from_text(&response, |_| {
            json!({
                "insights": ["Mantener registro regular de gastos"],
                "comparaciones": {},
                "sugerencias": ["Revisar gastos mensuales"],
                "alertas": [],
            })
        })
        .into_value();

        json!({
            "status": "insights_generated",
            "insights": insights,
        })
    }

    /// Forecast expenses over the coming months; free-form model text.
    pub async fn predict_future_expenses(&self, usuario_id: &Value, meses_futuros: i64) -> Value {
        let prediccion = self
            .context
            .generate(&prompts::prediction_prompt(usuario_id, meses_futuros), 0.3)
            .await;

        json!({
            "status": "prediction_completed",
            "prediccion": prediccion,
            "meses_futuros": meses_futuros,
        })
    }
}

#[async_trait]
impl Agent for KnowledgeBase {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "QUERY_TRANSACTIONS" => self.query_transactions(&envelope.content).await,
            "QUERY_BUDGETS" => self.query_budgets(&envelope.content).await,
            "QUERY_HISTORICAL" => self.query_historical_data(&envelope.content).await,
            "STORE_ANALYSIS" => self.store_analysis(&envelope.content).await,
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}
