//! Plan and task model shared by the planner and the workers.
//!
//! Field names follow the wire vocabulary the agents exchange, so a
//! plan produced by the language model deserializes directly.

use serde::{Deserialize, Serialize};

/// A single unit of work the planner assigns to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: u32,
    pub tipo: String,
    pub descripcion: String,
    pub agente: String,
    pub prioridad: String,
}

impl Task {
    pub fn new(
        id: u32,
        tipo: impl Into<String>,
        descripcion: impl Into<String>,
        agente: impl Into<String>,
        prioridad: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tipo: tipo.into(),
            descripcion: descripcion.into(),
            agente: agente.into(),
            prioridad: prioridad.into(),
        }
    }
}

/// An ordered set of tasks plus the strategy behind it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub subtareas: Vec<Task>,

    #[serde(default)]
    pub estrategia: String,

    /// Raw model output, kept when the structured parse failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respuesta_ia: Option<String>,
}

impl Plan {
    /// Standard plan used when the model did not return valid JSON.
    ///
    /// The raw model text is preserved in `respuesta_ia` so nothing
    /// is silently discarded.
    pub fn fallback(raw: impl Into<String>) -> Self {
        Self {
            subtareas: vec![
                Task::new(1, "calcular_balance", "Calcular balance actual", "Ejecutor", "alta"),
                Task::new(
                    2,
                    "verificar_presupuestos",
                    "Verificar estado de presupuestos",
                    "Ejecutor",
                    "media",
                ),
                Task::new(
                    3,
                    "generar_alertas",
                    "Generar alertas si es necesario",
                    "Notificador",
                    "media",
                ),
            ],
            estrategia: "Análisis financiero estándar".to_string(),
            respuesta_ia: Some(raw.into()),
        }
    }
}
