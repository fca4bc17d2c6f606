//! User interface agent
//!
//! Formats agent output for presentation over AGUI. Alert formatting is
//! deterministic; analysis and dashboard views go through the model with
//! neutral fallbacks.

use async_trait::async_trait;
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use serde_json::{Value, json};

use crate::prompts;

/// Presentation styling for an alert severity level.
fn alert_style(nivel: &str) -> Value {
    match nivel {
        "warning" => json!({"color": "orange", "icon": "⚠️", "priority": "medium"}),
        "critical" => json!({"color": "red", "icon": "🚨", "priority": "high"}),
        _ => json!({"color": "blue", "icon": "ℹ️", "priority": "low"}),
    }
}

/// Follow-up the UI should propose for an alert severity level.
fn suggested_action(nivel: &str) -> &'static str {
    match nivel {
        "info" => "Revisar cuando sea conveniente",
        "warning" => "Revisar pronto",
        "critical" => "Requiere atención inmediata",
        _ => "Revisar",
    }
}

/// Renders alerts, analyses, and dashboards into UI-ready payloads.
pub struct Interface {
    context: AgentContext,
}

impl Interface {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "Interfaz";

    pub fn new(context: AgentContext) -> Self {
        Self { context }
    }

    /// Shape an alert for display. No model call: alerts must render
    /// even when generation is down.
    fn format_alert_for_ui(alert_data: &Value) -> Value {
        let alerta = alert_data.get("alerta").cloned().unwrap_or_else(|| json!({}));
        let nivel = alerta
            .get("nivel")
            .and_then(Value::as_str)
            .unwrap_or("info");

        let ui_data = json!({
            "tipo": "alerta",
            "nivel": nivel,
            "titulo": alerta.get("titulo").cloned().unwrap_or_else(|| json!("Notificación")),
            "mensaje": alerta.get("mensaje").cloned().unwrap_or_else(|| json!("")),
            "recomendacion": alerta.get("recomendacion").cloned().unwrap_or(Value::Null),
            "timestamp": alert_data.get("timestamp").cloned().unwrap_or(Value::Null),
            "estilo": alert_style(nivel),
            "accion_sugerida": suggested_action(nivel),
        });

        json!({
            "status": "alert_formatted",
            "ui_data": ui_data,
            "protocol_used": "AGUI",
        })
    }

    /// Reshape an analysis into summary sections for the UI.
    async fn format_analysis_for_ui(&self, content: &Value) -> Value {
        let analisis = content.get("analisis").cloned().unwrap_or_else(|| json!({}));

        let response = self
            .context
            .generate(&prompts::analysis_format_prompt(&analisis), 0.6)
            .await;
        let ui_data = Interpreted::from_text(&response, |_| {
            json!({
                "resumen": "Análisis financiero completado",
                "puntos_clave": ["Revisar resultados"],
                "metricas": analisis,
                "sugerencias": ["Mantener seguimiento regular"],
            })
        })
        .into_value();

        json!({
            "status": "analysis_formatted",
            "ui_data": ui_data,
            "protocol_used": "AGUI",
        })
    }

    /// Compose a dashboard view from whatever data is available.
    async fn create_dashboard(&self, content: &Value) -> Value {
        let datos = content.get("datos").cloned().unwrap_or_else(|| json!({}));

        let response = self
            .context
            .generate(&prompts::dashboard_prompt(&datos), 0.5)
            .await;
        let ui_data = Interpreted::from_text(&response, |_| {
            json!({
                "resumen": {"balance": 0, "ingresos": 0, "gastos": 0},
                "presupuestos": [],
                "alertas": [],
                "tendencias": "Sin datos suficientes",
                "recomendaciones": [],
            })
        })
        .into_value();

        json!({
            "status": "dashboard_created",
            "ui_data": ui_data,
            "protocol_used": "AGUI",
        })
    }

    /// Organize a transaction list for display; free-form model text.
    pub async fn format_transaction_list(&self, transacciones: &[Value]) -> Value {
        let ui_data = self
            .context
            .generate(&prompts::transactions_format_prompt(transacciones.len()), 0.4)
            .await;

        json!({
            "status": "transactions_formatted",
            "ui_data": ui_data,
            "total": transacciones.len(),
        })
    }
}

#[async_trait]
impl Agent for Interface {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "DISPLAY_ALERT" => Ok(Self::format_alert_for_ui(&envelope.content)),
            "DISPLAY_ANALYSIS" => Ok(self.format_analysis_for_ui(&envelope.content).await),
            "DISPLAY_DASHBOARD" => Ok(self.create_dashboard(&envelope.content).await),
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use finagent_protocol::Protocol;

    fn interface(generator: std::sync::Arc<ScriptedGenerator>) -> Interface {
        Interface::new(crate::testing::detached(Interface::NAME, generator))
    }

    fn display(kind: &str, content: Value) -> Envelope {
        Envelope::new("Notificador", Interface::NAME, Protocol::Agui, kind, content)
    }

    #[tokio::test]
    async fn test_alert_formatting_is_deterministic() {
        let generator = ScriptedGenerator::plain("should not be called");
        let ui = interface(generator.clone());

        let result = ui
            .receive(display(
                "DISPLAY_ALERT",
                json!({
                    "usuario_id": 1,
                    "alerta": {
                        "titulo": "Presupuesto excedido",
                        "mensaje": "Comida al 110%",
                        "nivel": "critical",
                        "recomendacion": "Reducir gastos",
                    },
                    "timestamp": "2025-01-01T00:00:00Z",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(result["status"], "alert_formatted");
        assert_eq!(result["protocol_used"], "AGUI");

        let ui_data = &result["ui_data"];
        assert_eq!(ui_data["tipo"], "alerta");
        assert_eq!(ui_data["nivel"], "critical");
        assert_eq!(ui_data["titulo"], "Presupuesto excedido");
        assert_eq!(ui_data["estilo"]["color"], "red");
        assert_eq!(ui_data["estilo"]["priority"], "high");
        assert_eq!(ui_data["accion_sugerida"], "Requiere atención inmediata");
        assert_eq!(ui_data["timestamp"], "2025-01-01T00:00:00Z");

        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_alert_defaults_for_missing_fields() {
        let ui = interface(ScriptedGenerator::plain(""));

        let result = ui
            .receive(display("DISPLAY_ALERT", json!({})))
            .await
            .unwrap();

        let ui_data = &result["ui_data"];
        assert_eq!(ui_data["nivel"], "info");
        assert_eq!(ui_data["titulo"], "Notificación");
        assert_eq!(ui_data["mensaje"], "");
        assert_eq!(ui_data["recomendacion"], Value::Null);
        assert_eq!(ui_data["estilo"]["color"], "blue");
        assert_eq!(ui_data["accion_sugerida"], "Revisar cuando sea conveniente");
    }

    #[tokio::test]
    async fn test_unrecognized_level_gets_info_style_generic_action() {
        let ui = interface(ScriptedGenerator::plain(""));

        let result = ui
            .receive(display(
                "DISPLAY_ALERT",
                json!({"alerta": {"nivel": "urgente"}}),
            ))
            .await
            .unwrap();

        let ui_data = &result["ui_data"];
        assert_eq!(ui_data["nivel"], "urgente");
        assert_eq!(ui_data["estilo"]["color"], "blue");
        assert_eq!(ui_data["accion_sugerida"], "Revisar");
    }

    #[tokio::test]
    async fn test_analysis_formatting_parses_model_output() {
        let generator = ScriptedGenerator::plain(
            r#"{"resumen": "Mes positivo", "puntos_clave": ["Balance al alza"], "metricas": {"balance": 420.0}, "sugerencias": []}"#,
        );
        let ui = interface(generator.clone());

        let result = ui
            .receive(display(
                "DISPLAY_ANALYSIS",
                json!({"analisis": {"balance": 420.0}}),
            ))
            .await
            .unwrap();

        assert_eq!(result["status"], "analysis_formatted");
        assert_eq!(result["ui_data"]["resumen"], "Mes positivo");
        assert_eq!(result["ui_data"]["metricas"]["balance"], 420.0);

        let requests = generator.requests();
        assert!((requests[0].temperature - 0.6).abs() < f32::EPSILON);
        assert!(requests[0].prompt.contains("formato amigable"));
    }

    #[tokio::test]
    async fn test_analysis_fallback_keeps_original_metrics() {
        let ui = interface(ScriptedGenerator::plain("texto sin estructura"));

        let result = ui
            .receive(display(
                "DISPLAY_ANALYSIS",
                json!({"analisis": {"gasto_total": 950.0}}),
            ))
            .await
            .unwrap();

        let ui_data = &result["ui_data"];
        assert_eq!(ui_data["resumen"], "Análisis financiero completado");
        assert_eq!(ui_data["metricas"]["gasto_total"], 950.0);
        assert_eq!(ui_data["puntos_clave"][0], "Revisar resultados");
    }

    #[tokio::test]
    async fn test_dashboard_fallback_when_output_is_prose() {
        let ui = interface(ScriptedGenerator::plain("aquí tienes tu dashboard"));

        let result = ui
            .receive(display("DISPLAY_DASHBOARD", json!({"datos": {"balance": 100}})))
            .await
            .unwrap();

        assert_eq!(result["status"], "dashboard_created");
        assert_eq!(result["ui_data"]["tendencias"], "Sin datos suficientes");
        assert_eq!(result["ui_data"]["resumen"]["balance"], 0);
    }

    #[tokio::test]
    async fn test_transaction_list_reports_total() {
        let generator = ScriptedGenerator::plain("lista ordenada");
        let ui = interface(generator.clone());

        let transacciones = vec![json!({"monto": 10.0}), json!({"monto": 20.0})];
        let result = ui.format_transaction_list(&transacciones).await;

        assert_eq!(result["status"], "transactions_formatted");
        assert_eq!(result["ui_data"], "lista ordenada");
        assert_eq!(result["total"], 2);
        assert!(
            generator.requests()[0]
                .prompt
                .contains("Total de transacciones: 2")
        );
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let ui = interface(ScriptedGenerator::plain(""));
        let result = ui
            .receive(display("RENDER_3D", json!({})))
            .await
            .unwrap();
        assert_eq!(result["status"], "unknown_message_type");
        assert_eq!(result["type"], "RENDER_3D");
    }
}
