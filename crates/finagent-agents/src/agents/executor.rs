//! Executor agent
//!
//! Runs the financial calculations: balances, budget verification, and
//! expense analysis. Exchanges structured payloads over ACP and raises
//! A2A alerts for budgets past the configured threshold.

use std::sync::Arc;

use async_trait::async_trait;
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use finagent_protocol::Protocol;
use serde_json::{Value, json};

use super::{KnowledgeBase, Notifier};
use crate::config::FinanceConfig;
use crate::prompts;

/// Generic task kinds the planner may emit that map onto the three
/// concrete handlers by keyword.
const GENERIC_TASKS: [&str; 9] = [
    "obtener_ingresos",
    "obtener_gastos",
    "calcular_total_ingresos",
    "calcular_total_gastos",
    "calcular_balance_final",
    "comparar_gastos_presupuesto",
    "calcular_ratio_endeudamiento",
    "calcular_ingresos_netos",
    "calcular_porcentaje_ahorro",
];

/// Runs calculations and budget checks against the data in the request.
pub struct Executor {
    context: AgentContext,
    config: Arc<FinanceConfig>,
}

impl Executor {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "Ejecutor";

    pub fn new(context: AgentContext, config: Arc<FinanceConfig>) -> Self {
        Self { context, config }
    }

    /// Route a task to its handler.
    ///
    /// Accepts either a bare task record or the planner's
    /// `{task, context}` wrapper; the context's real-data keys are merged
    /// into the task so handlers see one flat record.
    async fn execute_financial_task(&self, content: Value) -> Value {
        let (mut task, context) = match content {
            Value::Object(mut map) if map.contains_key("task") => {
                let task = map.remove("task").unwrap_or(Value::Null);
                (task, map.remove("context"))
            }
            other => (other, None),
        };

        if let (Some(context), Some(task_map)) = (
            context.as_ref().and_then(Value::as_object),
            task.as_object_mut(),
        ) {
            if let Some(datos) = context.get("datos_reales").filter(|v| v.is_object()) {
                task_map.insert("datos_reales".to_string(), datos.clone());
            }
            if let Some(presupuestos) = context.get("presupuestos_reales") {
                task_map.insert("presupuestos_reales".to_string(), presupuestos.clone());
            }
            if let Some(tiene) = context.get("tiene_datos") {
                task_map.insert("tiene_datos".to_string(), tiene.clone());
            }
        }

        let Some(tipo) = task.get("tipo").and_then(Value::as_str).map(str::to_string) else {
            return json!({"status": "unknown_task_type", "task_type": Value::Null});
        };

        match tipo.as_str() {
            "calcular_balance" => self.calculate_balance(&task).await,
            "verificar_presupuestos" => self.verify_budgets(&task).await,
            "analizar_gastos" => self.analyze_expenses(&task).await,
            t if GENERIC_TASKS.contains(&t) => {
                // Keyword order matters: "comparar_gastos_presupuesto"
                // matches on "gastos" before "presupuesto".
                if t.contains("balance") || t.contains("ingresos") || t.contains("gastos") {
                    self.calculate_balance(&task).await
                } else if t.contains("presupuesto") {
                    self.verify_budgets(&task).await
                } else {
                    self.analyze_expenses(&task).await
                }
            }
            other => json!({"status": "unknown_task_type", "task_type": other}),
        }
    }

    /// Calculate the user's balance over the task's look-back window.
    ///
    /// Without real data the answer is a fixed zero balance with an
    /// onboarding message and no model call. With data, the knowledge base
    /// is queried for the transaction frame (advisory) and the model
    /// analyzes the figures already in hand.
    async fn calculate_balance(&self, task: &Value) -> Value {
        let usuario_id = task.get("usuario_id").cloned().unwrap_or(Value::Null);
        let periodo_dias = task
            .get("periodo_dias")
            .and_then(Value::as_i64)
            .unwrap_or(self.config.analysis_period_days);
        let datos_reales = task
            .get("datos_reales")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let tiene_datos = task
            .get("tiene_datos")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !tiene_datos {
            return json!({
                "status": "balance_calculated",
                "resultado": {
                    "ingresos_totales": 0.0,
                    "gastos_totales": 0.0,
                    "balance": 0.0,
                    "total_transacciones": 0,
                    "analisis": format!(
                        "No hay transacciones registradas en los últimos {periodo_dias} días. \
                         Comienza a registrar tus ingresos y gastos para obtener análisis personalizados."
                    ),
                },
                "protocol_used": "ACP",
            });
        }

        self.context
            .send(
                KnowledgeBase::NAME,
                Protocol::Acp,
                "QUERY_TRANSACTIONS",
                json!({
                    "usuario_id": usuario_id,
                    "periodo_dias": periodo_dias,
                    "context": {"datos_reales": datos_reales, "tiene_datos": tiene_datos},
                }),
            )
            .await;

        let response = self
            .context
            .generate(
                &prompts::balance_prompt(&usuario_id, periodo_dias, &datos_reales),
                0.3,
            )
            .await;
        let analisis_ia = Interpreted::from_text(&response, |raw| {
            json!({
                "evaluacion_general": raw,
                "puntos_criticos": [],
                "recomendaciones": ["Continúa monitoreando tus finanzas regularmente"],
                "tendencia": "estable",
            })
        })
        .into_value();

        json!({
            "status": "balance_calculated",
            "resultado": {
                "ingresos_totales": field(&datos_reales, "ingresos_totales", json!(0.0)),
                "gastos_totales": field(&datos_reales, "gastos_totales", json!(0.0)),
                "balance": field(&datos_reales, "balance", json!(0.0)),
                "total_transacciones": field(&datos_reales, "total_transacciones", json!(0)),
                "gastos_por_categoria": field(&datos_reales, "gastos_por_categoria", json!({})),
                "analisis_ia": analisis_ia,
            },
            "protocol_used": "ACP",
        })
    }

    /// Classify each budget by utilization and alert on the critical ones.
    async fn verify_budgets(&self, task: &Value) -> Value {
        let usuario_id = task.get("usuario_id").cloned().unwrap_or(Value::Null);
        let presupuestos_reales = task
            .get("presupuestos_reales")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let tiene_datos = task
            .get("tiene_datos")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !tiene_datos || presupuestos_reales.is_empty() {
            return json!({
                "status": "budgets_verified",
                "resultado": {
                    "presupuestos": [],
                    "recomendaciones": [
                        "No hay presupuestos configurados para este mes.",
                        "Crea presupuestos para empezar a controlar tus gastos."
                    ],
                    "mensaje": "Usuario sin presupuestos activos",
                },
                "protocol_used": "ACP",
            });
        }

        let presupuestos_analizados: Vec<Value> = presupuestos_reales
            .iter()
            .map(|p| {
                let porcentaje = p.get("porcentaje").and_then(Value::as_f64).unwrap_or(0.0);
                let estado = if porcentaje <= 75.0 {
                    "dentro"
                } else if porcentaje <= 100.0 {
                    "cerca"
                } else {
                    "excedido"
                };
                json!({
                    "categoria": field(p, "categoria", Value::Null),
                    "limite": field(p, "limite", Value::Null),
                    "gastado": field(p, "gastado", Value::Null),
                    "porcentaje": porcentaje,
                    "estado": estado,
                })
            })
            .collect();

        let response = self
            .context
            .generate(
                &prompts::budgets_prompt(&usuario_id, &json!(presupuestos_analizados)),
                0.4,
            )
            .await;
        let analisis_ia = Interpreted::from_text(&response, |raw| {
            json!({
                "analisis_detallado": raw,
                "recomendaciones": ["Mantén un seguimiento regular de tus gastos"],
            })
        })
        .into_value();

        for presupuesto in &presupuestos_analizados {
            let porcentaje = presupuesto["porcentaje"].as_f64().unwrap_or(0.0);
            if porcentaje >= self.config.alert_threshold_percentage {
                self.context
                    .send(
                        Notifier::NAME,
                        Protocol::A2a,
                        "ALERT_REQUIRED",
                        json!({
                            "usuario_id": usuario_id,
                            "tipo": "presupuesto_excedido",
                            "datos": presupuesto,
                        }),
                    )
                    .await;
            }
        }

        json!({
            "status": "budgets_verified",
            "resultado": {
                "presupuestos": presupuestos_analizados,
                "analisis_ia": field(&analisis_ia, "analisis_detallado", json!("")),
                "recomendaciones": field(&analisis_ia, "recomendaciones", json!([])),
            },
            "protocol_used": "ACP",
        })
    }

    /// Free-form expense pattern analysis; the model text passes through.
    async fn analyze_expenses(&self, task: &Value) -> Value {
        let usuario_id = task.get("usuario_id").cloned().unwrap_or(Value::Null);
        let analisis = self
            .context
            .generate(&prompts::expenses_prompt(&usuario_id), 0.5)
            .await;

        json!({
            "status": "expenses_analyzed",
            "analisis": analisis,
            "protocol_used": "ACP",
        })
    }

    /// Run one ad-hoc calculation at low temperature.
    async fn perform_calculation(&self, calc: &Value) -> Value {
        let calc_type = calc.get("type").cloned().unwrap_or(Value::Null);
        let data = calc.get("data").cloned().unwrap_or(Value::Null);

        let resultado = self
            .context
            .generate(&prompts::calculation_prompt(&calc_type, &data), 0.2)
            .await;

        json!({
            "status": "calculation_completed",
            "resultado": resultado,
        })
    }
}

/// Clone a field out of a JSON object with a default.
fn field(value: &Value, key: &str, default: Value) -> Value {
    value.get(key).cloned().unwrap_or(default)
}

#[async_trait]
impl Agent for Executor {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "EXECUTE_TASK" => Ok(self.execute_financial_task(envelope.content).await),
            "CALCULATE" => Ok(self.perform_calculation(&envelope.content).await),
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CapturingBus, ScriptedGenerator, wired};

    fn executor_with(
        config: FinanceConfig,
        generator: Arc<ScriptedGenerator>,
        bus: &Arc<CapturingBus>,
    ) -> Executor {
        Executor::new(
            wired(Executor::NAME, generator, bus),
            Arc::new(config),
        )
    }

    fn execute(content: Value) -> Envelope {
        Envelope::new(
            "Planificador",
            Executor::NAME,
            Protocol::Anp,
            "EXECUTE_TASK",
            content,
        )
    }

    #[tokio::test]
    async fn test_balance_without_data_skips_model_and_bus() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("no debería llamarse");
        let executor = executor_with(FinanceConfig::default(), generator.clone(), &bus);

        let result = executor
            .receive(execute(json!({"tipo": "calcular_balance", "usuario_id": 1})))
            .await
            .unwrap();

        assert_eq!(result["status"], "balance_calculated");
        assert_eq!(result["protocol_used"], "ACP");
        assert_eq!(result["resultado"]["balance"], 0.0);
        assert!(result["resultado"]["analisis"]
            .as_str()
            .unwrap()
            .contains("los últimos 30 días"));
        assert!(bus.envelopes().is_empty());
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_balance_window_comes_from_config() {
        let bus = CapturingBus::new();
        let config = FinanceConfig::default().with_analysis_period_days(7);
        let executor = executor_with(config, ScriptedGenerator::plain(""), &bus);

        let result = executor
            .execute_financial_task(json!({"tipo": "calcular_balance"}))
            .await;
        assert!(result["resultado"]["analisis"]
            .as_str()
            .unwrap()
            .contains("los últimos 7 días"));
    }

    #[tokio::test]
    async fn test_balance_with_data_queries_knowledge_base() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain(
            r#"{"evaluacion_general": "sano", "puntos_criticos": [], "recomendaciones": [], "tendencia": "positiva"}"#,
        );
        let executor = executor_with(FinanceConfig::default(), generator.clone(), &bus);

        let content = json!({
            "task": {"tipo": "calcular_balance", "usuario_id": 2, "periodo_dias": 15},
            "context": {
                "datos_reales": {"ingresos_totales": 1200.0, "gastos_totales": 800.0, "balance": 400.0},
                "tiene_datos": true,
            },
        });
        let result = executor.receive(execute(content)).await.unwrap();

        assert_eq!(result["resultado"]["ingresos_totales"], 1200.0);
        assert_eq!(result["resultado"]["analisis_ia"]["evaluacion_general"], "sano");
        assert_eq!(result["resultado"]["gastos_por_categoria"], json!({}));

        let queries = bus.sent_to(KnowledgeBase::NAME);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].kind, "QUERY_TRANSACTIONS");
        assert_eq!(queries[0].protocol, Protocol::Acp);
        assert_eq!(queries[0].content["usuario_id"], 2);
        assert_eq!(queries[0].content["periodo_dias"], 15);

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert!((requests[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_balance_analysis_degrades_to_raw_text() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("el modelo se cayó");
        let executor = executor_with(FinanceConfig::default(), generator, &bus);

        let result = executor
            .execute_financial_task(json!({
                "tipo": "calcular_balance",
                "datos_reales": {"balance": 1.0},
                "tiene_datos": true,
            }))
            .await;

        let analisis = &result["resultado"]["analisis_ia"];
        assert_eq!(analisis["evaluacion_general"], "el modelo se cayó");
        assert_eq!(analisis["tendencia"], "estable");
        assert_eq!(
            analisis["recomendaciones"][0],
            "Continúa monitoreando tus finanzas regularmente"
        );
    }

    #[tokio::test]
    async fn test_budget_states_at_the_boundaries() {
        let bus = CapturingBus::new();
        let executor = executor_with(FinanceConfig::default(), ScriptedGenerator::plain(""), &bus);

        let presupuestos = json!([
            {"categoria": "a", "porcentaje": 75.0},
            {"categoria": "b", "porcentaje": 76.0},
            {"categoria": "c", "porcentaje": 100.0},
            {"categoria": "d", "porcentaje": 101.0},
        ]);
        let result = executor
            .execute_financial_task(json!({
                "tipo": "verificar_presupuestos",
                "presupuestos_reales": presupuestos,
                "tiene_datos": true,
            }))
            .await;

        let estados: Vec<&str> = result["resultado"]["presupuestos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["estado"].as_str().unwrap())
            .collect();
        assert_eq!(estados, ["dentro", "cerca", "cerca", "excedido"]);

        // 100 and 101 are at or past the 80% alert threshold.
        let alerts = bus.sent_to(Notifier::NAME);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| {
            a.kind == "ALERT_REQUIRED"
                && a.protocol == Protocol::A2a
                && a.content["tipo"] == "presupuesto_excedido"
        }));
    }

    #[tokio::test]
    async fn test_alert_fires_at_threshold_not_below() {
        let bus = CapturingBus::new();
        let executor = executor_with(FinanceConfig::default(), ScriptedGenerator::plain(""), &bus);

        executor
            .execute_financial_task(json!({
                "tipo": "verificar_presupuestos",
                "presupuestos_reales": [
                    {"categoria": "a", "porcentaje": 79.0},
                    {"categoria": "b", "porcentaje": 80.0},
                ],
                "tiene_datos": true,
            }))
            .await;

        let alerts = bus.sent_to(Notifier::NAME);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].content["datos"]["categoria"], "b");
    }

    #[tokio::test]
    async fn test_no_budgets_yields_guidance_without_sends() {
        let bus = CapturingBus::new();
        let executor = executor_with(FinanceConfig::default(), ScriptedGenerator::plain(""), &bus);

        let result = executor
            .execute_financial_task(json!({
                "tipo": "verificar_presupuestos",
                "presupuestos_reales": [],
                "tiene_datos": true,
            }))
            .await;

        assert_eq!(result["status"], "budgets_verified");
        assert_eq!(result["resultado"]["mensaje"], "Usuario sin presupuestos activos");
        assert_eq!(
            result["resultado"]["recomendaciones"].as_array().unwrap().len(),
            2
        );
        assert!(bus.envelopes().is_empty());
    }

    #[tokio::test]
    async fn test_generic_kinds_route_by_keyword() {
        let bus = CapturingBus::new();
        let executor = executor_with(FinanceConfig::default(), ScriptedGenerator::plain(""), &bus);

        // "gastos" wins over "presupuesto" for this kind.
        let result = executor
            .execute_financial_task(json!({"tipo": "comparar_gastos_presupuesto"}))
            .await;
        assert_eq!(result["status"], "balance_calculated");

        let result = executor
            .execute_financial_task(json!({"tipo": "calcular_ratio_endeudamiento"}))
            .await;
        assert_eq!(result["status"], "expenses_analyzed");

        let result = executor
            .execute_financial_task(json!({"tipo": "calcular_porcentaje_ahorro"}))
            .await;
        assert_eq!(result["status"], "expenses_analyzed");
    }

    #[tokio::test]
    async fn test_unknown_task_types() {
        let bus = CapturingBus::new();
        let executor = executor_with(FinanceConfig::default(), ScriptedGenerator::plain(""), &bus);

        let result = executor
            .execute_financial_task(json!({"tipo": "bailar"}))
            .await;
        assert_eq!(result["status"], "unknown_task_type");
        assert_eq!(result["task_type"], "bailar");

        let result = executor.execute_financial_task(json!("no es objeto")).await;
        assert_eq!(result["status"], "unknown_task_type");
        assert_eq!(result["task_type"], Value::Null);
    }

    #[tokio::test]
    async fn test_calculate_runs_at_low_temperature() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("1050.00, interés compuesto a un año");
        let executor = executor_with(FinanceConfig::default(), generator.clone(), &bus);

        let envelope = Envelope::new(
            "Interfaz",
            Executor::NAME,
            Protocol::Acp,
            "CALCULATE",
            json!({"type": "interes_compuesto", "data": {"capital": 1000, "tasa": 0.05}}),
        );
        let result = executor.receive(envelope).await.unwrap();

        assert_eq!(result["status"], "calculation_completed");
        assert_eq!(result["resultado"], "1050.00, interés compuesto a un año");
        assert!(result.get("protocol_used").is_none());

        let requests = generator.requests();
        assert!((requests[0].temperature - 0.2).abs() < f32::EPSILON);
        assert!(requests[0].prompt.contains("interes_compuesto"));
    }
}
