//! AGUI (agent-to-user-interface) protocol
//!
//! Messages from agents to the presentation layer, shaped for direct
//! consumption by a frontend: which component to render, what action to
//! take on it, and the data to show. Out-of-set action types or
//! components are a construction-time failure, not a post-hoc one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ProtocolError, Result};
use crate::protocol::Protocol;
use crate::{PROTOCOL_VERSION, wire};

const REQUIRED_FIELDS: [&str; 7] = [
    "protocol",
    "message_id",
    "timestamp",
    "agent",
    "action_type",
    "component",
    "data",
];

/// What the UI should do with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Render new information
    Display,
    /// Refresh an existing component
    Update,
    /// Ask the user for input
    RequestInput,
    /// Ask the user to confirm
    Confirm,
    /// Move to another view
    Navigate,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Display,
        ActionType::Update,
        ActionType::RequestInput,
        ActionType::Confirm,
        ActionType::Navigate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Display => "display",
            ActionType::Update => "update",
            ActionType::RequestInput => "request_input",
            ActionType::Confirm => "confirm",
            ActionType::Navigate => "navigate",
        }
    }

    /// Whether this action blocks on a user response.
    pub fn requires_interaction(self) -> bool {
        matches!(self, ActionType::RequestInput | ActionType::Confirm)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid action type: {s}")))
    }
}

/// The UI component a message targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiComponent {
    Alert,
    Dashboard,
    Chart,
    Table,
    Form,
    Card,
    List,
    Progress,
}

impl UiComponent {
    pub const ALL: [UiComponent; 8] = [
        UiComponent::Alert,
        UiComponent::Dashboard,
        UiComponent::Chart,
        UiComponent::Table,
        UiComponent::Form,
        UiComponent::Card,
        UiComponent::List,
        UiComponent::Progress,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UiComponent::Alert => "alert",
            UiComponent::Dashboard => "dashboard",
            UiComponent::Chart => "chart",
            UiComponent::Table => "table",
            UiComponent::Form => "form",
            UiComponent::Card => "card",
            UiComponent::List => "list",
            UiComponent::Progress => "progress",
        }
    }
}

impl fmt::Display for UiComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiComponent {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        UiComponent::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid UI component: {s}")))
    }
}

/// Frontend-facing metadata stamped onto every UI message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMetadata {
    pub generated_by: String,
    pub requires_interaction: bool,
}

/// A message addressed to the user interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    pub protocol: Protocol,
    pub version: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub user_id: Option<i64>,
    pub action_type: ActionType,
    pub component: UiComponent,
    pub priority: String,
    pub data: Value,
    pub metadata: UiMetadata,
}

impl UiMessage {
    /// Address the message to a specific user.
    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Override the default `normal` priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn build(agent: &str, action_type: ActionType, component: UiComponent, data: Value) -> UiMessage {
    UiMessage {
        protocol: Protocol::Agui,
        version: PROTOCOL_VERSION.to_string(),
        message_id: wire::message_id(),
        timestamp: wire::timestamp(),
        agent: agent.to_string(),
        user_id: None,
        action_type,
        component,
        priority: "normal".to_string(),
        data,
        metadata: UiMetadata {
            generated_by: agent.to_string(),
            requires_interaction: action_type.requires_interaction(),
        },
    }
}

/// Build a UI message, failing when either discriminator is out of set.
///
/// `request_input` and `confirm` actions are stamped with
/// `metadata.requires_interaction = true`.
pub fn create_ui_message(
    agent: &str,
    action_type: &str,
    component: &str,
    data: Value,
) -> Result<UiMessage> {
    let action_type = action_type.parse::<ActionType>()?;
    let component = component.parse::<UiComponent>()?;
    Ok(build(agent, action_type, component, data))
}

/// Show an alert; `critical` alerts go out with high priority.
pub fn display_alert(
    agent: &str,
    user_id: i64,
    level: &str,
    title: &str,
    message: &str,
    actions: Vec<Value>,
) -> UiMessage {
    let priority = if level == "critical" { "high" } else { "normal" };
    build(
        agent,
        ActionType::Display,
        UiComponent::Alert,
        json!({
            "level": level,
            "title": title,
            "message": message,
            "actions": actions,
            "dismissible": true,
        }),
    )
    .with_priority(priority)
    .for_user(user_id)
}

/// Show a dashboard made of the given sections.
pub fn display_dashboard(agent: &str, user_id: i64, sections: Vec<Value>) -> UiMessage {
    build(
        agent,
        ActionType::Display,
        UiComponent::Dashboard,
        json!({
            "sections": sections,
            "refresh_interval": 30,
            "last_updated": wire::timestamp(),
        }),
    )
    .for_user(user_id)
}

/// Show a chart of the given type.
pub fn display_chart(
    agent: &str,
    user_id: i64,
    chart_type: &str,
    title: &str,
    data: Value,
    options: Option<Value>,
) -> UiMessage {
    build(
        agent,
        ActionType::Display,
        UiComponent::Chart,
        json!({
            "chart_type": chart_type,
            "title": title,
            "data": data,
            "options": options.unwrap_or_else(|| json!({})),
        }),
    )
    .for_user(user_id)
}

/// Show a sortable, filterable data table.
pub fn display_table(
    agent: &str,
    user_id: i64,
    title: &str,
    columns: Vec<Value>,
    rows: Vec<Value>,
    pagination: Option<Value>,
) -> UiMessage {
    build(
        agent,
        ActionType::Display,
        UiComponent::Table,
        json!({
            "title": title,
            "columns": columns,
            "rows": rows,
            "pagination": pagination,
            "sortable": true,
            "filterable": true,
        }),
    )
    .for_user(user_id)
}

/// Ask the user to fill in a form; always high priority.
pub fn request_user_input(
    agent: &str,
    user_id: i64,
    form_fields: Vec<Value>,
    title: &str,
    description: Option<&str>,
) -> UiMessage {
    build(
        agent,
        ActionType::RequestInput,
        UiComponent::Form,
        json!({
            "title": title,
            "description": description,
            "fields": form_fields,
            "submit_label": "Enviar",
            "cancel_label": "Cancelar",
        }),
    )
    .with_priority("high")
    .for_user(user_id)
}

/// Patch an already-rendered component in place.
///
/// The component arrives as a string from callers that track rendered
/// component kinds dynamically, so this constructor can fail.
pub fn update_component(
    agent: &str,
    user_id: i64,
    component: &str,
    component_id: &str,
    updates: Value,
) -> Result<UiMessage> {
    let component = component.parse::<UiComponent>()?;
    Ok(build(
        agent,
        ActionType::Update,
        component,
        json!({
            "component_id": component_id,
            "updates": updates,
            "animate": true,
        }),
    )
    .for_user(user_id))
}

/// Check an inbound wire value against the AGUI schema.
pub fn validate(message: &Value) -> bool {
    if !wire::has_fields(message, &REQUIRED_FIELDS) {
        return false;
    }
    if message["protocol"] != "AGUI" {
        return false;
    }
    let action_ok = message["action_type"]
        .as_str()
        .is_some_and(|a| a.parse::<ActionType>().is_ok());
    let component_ok = message["component"]
        .as_str()
        .is_some_and(|c| c.parse::<UiComponent>().is_ok());
    action_ok && component_ok
}
