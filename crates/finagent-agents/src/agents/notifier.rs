//! Notifier agent
//!
//! Turns alert conditions into user-facing alerts and notifications,
//! forwarding display-ready alerts to the interface agent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use finagent_core::{Agent, AgentContext, Envelope, Result};
use finagent_llm::Interpreted;
use finagent_protocol::Protocol;
use serde_json::{Value, json};

use super::Interface;
use crate::config::FinanceConfig;
use crate::prompts;

/// Generates alerts and notifications about the user's finances.
pub struct Notifier {
    context: AgentContext,
    config: Arc<FinanceConfig>,
}

impl Notifier {
    /// Wire name other agents address this one by.
    pub const NAME: &'static str = "Notificador";

    pub fn new(context: AgentContext, config: Arc<FinanceConfig>) -> Self {
        Self { context, config }
    }

    /// Build an alert for a detected condition and hand it to the
    /// interface for display.
    ///
    /// The fallback alert keeps the first 300 characters of whatever the
    /// model said as the message, at warning level.
    async fn create_alert(&self, alert_data: &Value) -> Value {
        let usuario_id = alert_data.get("usuario_id").cloned().unwrap_or(Value::Null);
        let tipo = alert_data.get("tipo").cloned().unwrap_or(Value::Null);
        let datos = alert_data.get("datos").cloned().unwrap_or_else(|| json!({}));

        let response = self
            .context
            .generate(&prompts::alert_prompt(&tipo, &datos), 0.6)
            .await;
        let alerta = Interpreted::from_text(&response, |raw| {
            json!({
                "titulo": format!("Alerta: {}", prompts::scalar(&tipo)),
                "mensaje": raw.chars().take(300).collect::<String>(),
                "nivel": "warning",
                "recomendacion": "Revisar situación financiera",
            })
        })
        .into_value();

        self.context
            .send(
                Interface::NAME,
                Protocol::Agui,
                "DISPLAY_ALERT",
                json!({
                    "usuario_id": usuario_id,
                    "alerta": alerta,
                    "timestamp": Utc::now(),
                }),
            )
            .await;

        json!({
            "status": "alert_created",
            "alerta": alerta,
            "protocol_used": "A2A",
        })
    }

    /// Build a short informative notification for an event.
    async fn generate_notification(&self, notif_data: &Value) -> Value {
        let evento = notif_data.get("evento").cloned().unwrap_or(Value::Null);
        let contexto = notif_data
            .get("contexto")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let mensaje = self
            .context
            .generate(&prompts::notification_prompt(&evento, &contexto), 0.7)
            .await;

        json!({
            "status": "notification_generated",
            "notificacion": {
                "tipo": "info",
                "mensaje": mensaje,
                "timestamp": Utc::now(),
            },
        })
    }

    /// Raise an alert for every budget at or past the configured
    /// threshold, returning the alerts created.
    pub async fn check_budget_alerts(&self, presupuestos: &[Value], usuario_id: &Value) -> Vec<Value> {
        let mut alertas = Vec::new();
        for presupuesto in presupuestos {
            let gastado = presupuesto
                .get("gastado")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let limite = presupuesto
                .get("limite")
                .and_then(Value::as_f64)
                .unwrap_or(1.0);
            let porcentaje = (gastado / limite) * 100.0;

            if porcentaje >= self.config.alert_threshold_percentage {
                let alerta = self
                    .create_alert(&json!({
                        "usuario_id": usuario_id,
                        "tipo": "presupuesto_cerca_limite",
                        "datos": {
                            "categoria": presupuesto.get("categoria").cloned().unwrap_or(Value::Null),
                            "porcentaje": porcentaje,
                            "gastado": presupuesto.get("gastado").cloned().unwrap_or(Value::Null),
                            "limite": presupuesto.get("limite").cloned().unwrap_or(Value::Null),
                        },
                    }))
                    .await;
                alertas.push(alerta);
            }
        }
        alertas
    }

    /// Turn a finished analysis into a savings recommendation, delivered
    /// as a notification.
    pub async fn send_savings_recommendation(&self, usuario_id: &Value, analisis: &Value) -> Value {
        let mensaje = self
            .context
            .generate(&prompts::savings_prompt(analisis), 0.7)
            .await;

        self.generate_notification(&json!({
            "usuario_id": usuario_id,
            "evento": "recomendacion_ahorro",
            "contexto": {"mensaje": mensaje},
        }))
        .await
    }
}

#[async_trait]
impl Agent for Notifier {
    fn context(&self) -> &AgentContext {
        &self.context
    }

    async fn process(&self, envelope: Envelope) -> Result<Value> {
        match envelope.kind.as_str() {
            "ALERT_REQUIRED" => Ok(self.create_alert(&envelope.content).await),
            "GENERATE_NOTIFICATION" => Ok(self.generate_notification(&envelope.content).await),
            other => Ok(json!({"status": "unknown_message_type", "type": other})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CapturingBus, ScriptedGenerator, wired};

    fn notifier_with(generator: Arc<ScriptedGenerator>, bus: &Arc<CapturingBus>) -> Notifier {
        Notifier::new(
            wired(Notifier::NAME, generator, bus),
            Arc::new(FinanceConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_alert_parses_and_forwards_to_interface() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain(
            r#"{"titulo": "Presupuesto excedido", "mensaje": "Comida al 105%", "nivel": "critical", "recomendacion": "Reducir gastos"}"#,
        );
        let notifier = notifier_with(generator.clone(), &bus);

        let envelope = Envelope::new(
            "Ejecutor",
            Notifier::NAME,
            Protocol::A2a,
            "ALERT_REQUIRED",
            json!({"usuario_id": 5, "tipo": "presupuesto_excedido", "datos": {"categoria": "comida"}}),
        );
        let result = notifier.receive(envelope).await.unwrap();

        assert_eq!(result["status"], "alert_created");
        assert_eq!(result["protocol_used"], "A2A");
        assert_eq!(result["alerta"]["titulo"], "Presupuesto excedido");
        assert_eq!(result["alerta"]["nivel"], "critical");

        let forwarded = bus.sent_to(Interface::NAME);
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].kind, "DISPLAY_ALERT");
        assert_eq!(forwarded[0].protocol, Protocol::Agui);
        assert_eq!(forwarded[0].content["usuario_id"], 5);
        assert_eq!(forwarded[0].content["alerta"]["titulo"], "Presupuesto excedido");
        assert!(forwarded[0].content["timestamp"].is_string());

        let requests = generator.requests();
        assert!((requests[0].temperature - 0.6).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_alert_fallback_truncates_message() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("y".repeat(400));
        let notifier = notifier_with(generator, &bus);

        let result = notifier
            .create_alert(&json!({"usuario_id": 1, "tipo": "presupuesto_excedido", "datos": {}}))
            .await;

        let alerta = &result["alerta"];
        assert_eq!(alerta["titulo"], "Alerta: presupuesto_excedido");
        assert_eq!(alerta["mensaje"].as_str().unwrap().chars().count(), 300);
        assert_eq!(alerta["nivel"], "warning");
        assert_eq!(alerta["recomendacion"], "Revisar situación financiera");
    }

    #[tokio::test]
    async fn test_notification_wraps_model_text() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("¡Vas muy bien este mes!");
        let notifier = notifier_with(generator.clone(), &bus);

        let envelope = Envelope::new(
            "Monitor",
            Notifier::NAME,
            Protocol::A2a,
            "GENERATE_NOTIFICATION",
            json!({"usuario_id": 1, "evento": "meta_cumplida", "contexto": {"meta": "ahorro"}}),
        );
        let result = notifier.receive(envelope).await.unwrap();

        assert_eq!(result["status"], "notification_generated");
        assert_eq!(result["notificacion"]["tipo"], "info");
        assert_eq!(result["notificacion"]["mensaje"], "¡Vas muy bien este mes!");
        assert!(result["notificacion"]["timestamp"].is_string());
        assert!(bus.envelopes().is_empty());

        let requests = generator.requests();
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!(requests[0].prompt.contains("meta_cumplida"));
    }

    #[tokio::test]
    async fn test_budget_alerts_only_past_threshold() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::plain("alerta generada");
        let notifier = notifier_with(generator, &bus);

        let presupuestos = [
            json!({"categoria": "comida", "gastado": 90.0, "limite": 100.0}),
            json!({"categoria": "ocio", "gastado": 10.0, "limite": 100.0}),
        ];
        let alertas = notifier
            .check_budget_alerts(&presupuestos, &json!(3))
            .await;

        assert_eq!(alertas.len(), 1);
        assert_eq!(alertas[0]["status"], "alert_created");

        // The created alert went out for display as well.
        let forwarded = bus.sent_to(Interface::NAME);
        assert_eq!(forwarded.len(), 1);
    }

    #[tokio::test]
    async fn test_savings_recommendation_becomes_notification() {
        let bus = CapturingBus::new();
        let generator = ScriptedGenerator::new(["Ahorra el 10% de tu ingreso", "¡Puedes lograrlo!"]);
        let notifier = notifier_with(generator.clone(), &bus);

        let result = notifier
            .send_savings_recommendation(&json!(4), &json!({"balance": 500.0}))
            .await;

        assert_eq!(result["status"], "notification_generated");
        assert_eq!(result["notificacion"]["mensaje"], "¡Puedes lograrlo!");

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].prompt.contains("recomendación de ahorro"));
        assert!(requests[1].prompt.contains("recomendacion_ahorro"));
        assert!(requests[1].prompt.contains("Ahorra el 10% de tu ingreso"));
    }
}
