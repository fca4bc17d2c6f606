//! Prompt builders for the finance agents
//!
//! One function per model call, grouped by agent. The agents address
//! users in Spanish, so the prompt text is Spanish throughout; the
//! JSON shapes requested here match the fallback shapes the agents
//! build when a response does not parse.

use serde_json::Value;

/// Render a JSON value for embedding in a prompt.
fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render a scalar without the quotes `Value`'s `Display` adds to strings.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Decompose a financial objective into per-agent subtasks.
pub fn plan_prompt(objetivo: &str, usuario_id: &Value) -> String {
    format!(
        r#"Eres un planificador financiero experto. Descompón la siguiente tarea en subtareas específicas:

Objetivo: {objetivo}
Usuario ID: {usuario}

AGENTES DISPONIBLES (usa EXACTAMENTE estos nombres):
- Ejecutor: Realiza cálculos financieros, balances, verificación de presupuestos
- KnowledgeBase: Consulta datos históricos, transacciones, patrones de gasto
- Notificador: Genera alertas y notificaciones al usuario
- Interfaz: Formatea datos para presentación al usuario
- Monitor: Supervisa el sistema y métricas

TIPOS DE TAREAS VÁLIDOS:
Para Ejecutor: calcular_balance, verificar_presupuestos, analizar_gastos
Para KnowledgeBase: recopilar_transacciones, analizar_patrones, consultar_historico
Para Notificador: generar_alertas, enviar_notificaciones
Para Interfaz: formatear_reporte, crear_dashboard
Para Monitor: registrar_actividad, monitorear_sistema

IMPORTANTE:
1. Usa SOLO los nombres de agentes listados arriba (exactamente como aparecen)
2. Cada subtarea debe asignarse a UN agente existente
3. Responde SOLO con un objeto JSON válido, sin markdown, sin ```json

Formato JSON requerido:
{{
    "subtareas": [
        {{"id": 1, "tipo": "calcular_balance", "descripcion": "Calcular balance financiero del usuario", "agente": "Ejecutor", "prioridad": "alta"}},
        {{"id": 2, "tipo": "recopilar_transacciones", "descripcion": "Obtener historial de transacciones", "agente": "KnowledgeBase", "prioridad": "alta"}},
        {{"id": 3, "tipo": "generar_alertas", "descripcion": "Generar alertas si hay anomalías", "agente": "Notificador", "prioridad": "media"}}
    ],
    "estrategia": "descripción de la estrategia general"
}}"#,
        usuario = scalar(usuario_id),
    )
}

// ============================================================================
// Executor
// ============================================================================

/// Analyze a user's real balance data over a look-back window.
pub fn balance_prompt(usuario_id: &Value, periodo_dias: i64, datos_reales: &Value) -> String {
    format!(
        r#"Analiza el balance financiero REAL del usuario {usuario} en los últimos {periodo_dias} días:

DATOS REALES:
{datos}

Proporciona un análisis detallado que incluya:
1. Evaluación del balance (positivo/negativo/equilibrado)
2. Análisis de los gastos por categoría
3. Comparación con el ingreso mensual declarado
4. Identificación de categorías problemáticas
5. Recomendaciones específicas para mejorar
6. Tendencia financiera (ahorrando/gastando más de lo necesario)

IMPORTANTE: Responde SOLO con un objeto JSON válido, sin formato markdown, sin bloques de código, sin ```json ni ```. Solo el JSON puro.

Formato JSON requerido:
{{
    "evaluacion_general": "descripción del estado financiero",
    "puntos_criticos": ["punto 1", "punto 2"],
    "recomendaciones": ["recomendación 1", "recomendación 2"],
    "tendencia": "positiva/negativa/estable"
}}"#,
        usuario = scalar(usuario_id),
        datos = pretty(datos_reales),
    )
}

/// Analyze classified budgets and produce recommendations.
pub fn budgets_prompt(usuario_id: &Value, presupuestos: &Value) -> String {
    format!(
        r#"Analiza los siguientes presupuestos REALES del usuario {usuario}:

{datos}

Estados:
- "dentro": <= 75% del presupuesto
- "cerca": 76-100% del presupuesto
- "excedido": > 100% del presupuesto

Proporciona:
1. Análisis detallado de cada categoría
2. Recomendaciones específicas basadas en los datos reales
3. Consejos para optimizar gastos

IMPORTANTE: Responde SOLO con un objeto JSON válido, sin formato markdown, sin bloques de código, sin ```json ni ```. Solo el JSON puro.

Formato JSON requerido:
{{
    "analisis_detallado": "análisis completo basado en datos reales",
    "recomendaciones": ["recomendación 1", "recomendación 2", "recomendación 3"]
}}"#,
        usuario = scalar(usuario_id),
        datos = pretty(presupuestos),
    )
}

/// Free-form expense pattern analysis.
pub fn expenses_prompt(usuario_id: &Value) -> String {
    format!(
        r#"Analiza los patrones de gasto del usuario {usuario}.

Identifica:
1. Categorías con mayor gasto
2. Tendencias de gasto
3. Gastos inusuales o atípicos
4. Oportunidades de ahorro

Devuelve JSON con análisis detallado."#,
        usuario = scalar(usuario_id),
    )
}

/// Ad-hoc financial calculation with explanation.
pub fn calculation_prompt(calc_type: &Value, data: &Value) -> String {
    format!(
        r#"Realiza el siguiente cálculo financiero:
Tipo: {tipo}
Datos: {datos}

Proporciona resultado numérico y explicación."#,
        tipo = scalar(calc_type),
        datos = data,
    )
}

// ============================================================================
// Notifier
// ============================================================================

/// Turn an alert condition into user-facing alert content.
pub fn alert_prompt(tipo: &Value, datos: &Value) -> String {
    format!(
        r#"Genera una alerta financiera clara y concisa:

Tipo de alerta: {tipo}
Datos: {datos}

La alerta debe:
1. Tener un título claro (máximo 100 caracteres)
2. Un mensaje explicativo (máximo 300 caracteres)
3. Determinar nivel de severidad: "info", "warning", o "critical"
4. Incluir recomendación de acción

Devuelve JSON:
{{
    "titulo": "título de la alerta",
    "mensaje": "mensaje detallado",
    "nivel": "warning",
    "recomendacion": "acción sugerida"
}}"#,
        tipo = scalar(tipo),
        datos = pretty(datos),
    )
}

/// Short informative notification for an event.
pub fn notification_prompt(evento: &Value, contexto: &Value) -> String {
    format!(
        r#"Genera una notificación amigable para el usuario:

Evento: {evento}
Contexto: {contexto}

La notificación debe ser positiva, motivadora y útil.
Máximo 200 caracteres."#,
        evento = scalar(evento),
        contexto = contexto,
    )
}

/// Savings recommendation derived from a finished analysis.
pub fn savings_prompt(analisis: &Value) -> String {
    format!(
        r#"Basado en el siguiente análisis financiero, genera una recomendación de ahorro:

{analisis}

La recomendación debe:
1. Ser específica y accionable
2. Considerar el contexto del usuario
3. Ser motivadora
4. Incluir metas realistas

Devuelve mensaje de máximo 250 caracteres."#,
        analisis = pretty(analisis),
    )
}

// ============================================================================
// Knowledge base
// ============================================================================

/// Historical spending pattern analysis.
pub fn historical_prompt(usuario_id: &Value, meses_atras: i64) -> String {
    format!(
        r#"Analiza los patrones históricos financieros del usuario {usuario}:

Período: últimos {meses_atras} meses

Identifica:
1. Patrones de gasto recurrentes
2. Tendencias de ingreso
3. Cambios significativos
4. Predicciones para próximo período

Devuelve JSON:
{{
    "patrones_gasto": {{}},
    "tendencias_ingreso": {{}},
    "anomalias": [],
    "predicciones": {{}}
}}"#,
        usuario = scalar(usuario_id),
    )
}

/// Spending insights, optionally narrowed to one category.
pub fn insights_prompt(usuario_id: &Value, categoria: Option<&str>) -> String {
    let enfoque = match categoria {
        Some(categoria) => format!("Enfocado en categoría: {categoria}"),
        None => "Todas las categorías".to_string(),
    };

    format!(
        r#"Proporciona insights inteligentes sobre los gastos del usuario {usuario}:

{enfoque}

Genera:
1. Top 3 insights más importantes
2. Comparación con promedios
3. Sugerencias de optimización
4. Alertas tempranas

Formato JSON."#,
        usuario = scalar(usuario_id),
    )
}

/// Expense forecast for the coming months.
pub fn prediction_prompt(usuario_id: &Value, meses_futuros: i64) -> String {
    format!(
        r#"Predice los gastos futuros del usuario {usuario} para los próximos {meses_futuros} meses.

Basado en:
- Patrones históricos
- Estacionalidad
- Tendencias recientes

Devuelve predicciones con intervalos de confianza.
Formato JSON."#,
        usuario = scalar(usuario_id),
    )
}

// ============================================================================
// Interface
// ============================================================================

/// Reshape an analysis payload into user-friendly sections.
pub fn analysis_format_prompt(analisis: &Value) -> String {
    format!(
        r#"Transforma el siguiente análisis financiero en un formato amigable para el usuario:

{analisis}

Crea:
1. Un resumen ejecutivo (2-3 líneas)
2. Puntos clave (3-5 bullets)
3. Métricas destacadas (números importantes)
4. Sugerencias de acción

Devuelve JSON:
{{
    "resumen": "texto del resumen",
    "puntos_clave": ["punto 1", "punto 2"],
    "metricas": {{"ingreso_total": 10000, "gasto_total": 7000}},
    "sugerencias": ["sugerencia 1", "sugerencia 2"]
}}"#,
        analisis = pretty(analisis),
    )
}

/// Build a full dashboard view from the available data.
pub fn dashboard_prompt(datos: &Value) -> String {
    format!(
        r#"Crea un dashboard financiero completo para el usuario:

Datos disponibles:
{datos}

El dashboard debe incluir:
1. Resumen financiero general
2. Estado de presupuestos
3. Alertas activas
4. Tendencias recientes
5. Recomendaciones principales

Formato JSON estructurado para visualización."#,
        datos = pretty(datos),
    )
}

/// Organize a transaction list for display.
pub fn transactions_format_prompt(total: usize) -> String {
    format!(
        r#"Formatea estas transacciones de manera clara y organizada:

Total de transacciones: {total}

Organiza por:
1. Fecha (más recientes primero)
2. Agrupa por categoría
3. Destaca montos importantes
4. Calcula totales por categoría

Devuelve JSON estructurado para visualización."#,
    )
}

// ============================================================================
// Monitor
// ============================================================================

/// Workload review of a freshly distributed plan.
pub fn distribution_prompt(distribution: &Value) -> String {
    format!(
        r#"Analiza la distribución de tareas:

{distribution}

Determina:
1. Está balanceada la carga?
2. Hay cuellos de botella potenciales?
3. Orden óptimo de ejecución
4. Estimación de tiempo total

Devuelve JSON con análisis y recomendaciones."#,
        distribution = pretty(distribution),
    )
}

/// System-wide health evaluation from agent state.
pub fn health_prompt(agent_status: &Value, queue_len: usize) -> String {
    format!(
        r#"Evalúa la salud del sistema multiagente:

Estados de agentes:
{estados}

Cola de mensajes: {queue_len} mensajes

Determina:
1. Estado general del sistema (healthy/degraded/critical)
2. Agentes con problemas
3. Recomendaciones de optimización
4. Alertas necesarias

Devuelve JSON."#,
        estados = pretty(agent_status),
    )
}

/// Review of inter-agent communication patterns.
pub fn flow_prompt(total_messages: usize, active_agents: usize) -> String {
    format!(
        r#"Analiza el flujo de comunicación del sistema:

Total de mensajes: {total_messages}
Agentes activos: {active_agents}

Identifica:
1. Patrones de comunicación
2. Eficiencia del flujo
3. Posibles mejoras
4. Protocolos más utilizados

Devuelve análisis en JSON."#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_prompt_interpolates_objective() {
        let prompt = plan_prompt("analizar_finanzas", &json!(7));
        assert!(prompt.contains("Objetivo: analizar_finanzas"));
        assert!(prompt.contains("Usuario ID: 7"));
        assert!(prompt.contains("\"subtareas\""));
        assert!(prompt.contains("sin markdown"));
    }

    #[test]
    fn test_scalar_strings_render_unquoted() {
        let prompt = balance_prompt(&json!("demo"), 30, &json!({"balance": 10.0}));
        assert!(prompt.contains("usuario demo"));
        assert!(!prompt.contains("usuario \"demo\""));
        assert!(prompt.contains("últimos 30 días"));
    }

    #[test]
    fn test_embedded_json_is_pretty_printed() {
        let prompt = alert_prompt(
            &json!("presupuesto_excedido"),
            &json!({"categoria": "comida", "porcentaje": 105.0}),
        );
        assert!(prompt.contains("Tipo de alerta: presupuesto_excedido"));
        assert!(prompt.contains("\"categoria\": \"comida\""));
    }

    #[test]
    fn test_insights_prompt_category_focus() {
        let with = insights_prompt(&json!(1), Some("transporte"));
        assert!(with.contains("Enfocado en categoría: transporte"));

        let without = insights_prompt(&json!(1), None);
        assert!(without.contains("Todas las categorías"));
    }
}
