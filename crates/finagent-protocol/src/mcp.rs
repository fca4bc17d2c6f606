//! MCP (message content protocol)
//!
//! Standardizes the semantics of message payloads: every message names a
//! content type from a closed set, and the four structured content types
//! carry a required-field schema. Validation reports every problem it
//! finds, not just the first.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ProtocolError, Result};
use crate::protocol::Protocol;
use crate::{PROTOCOL_VERSION, wire};

const REQUIRED_FIELDS: [&str; 6] = [
    "protocol",
    "message_id",
    "timestamp",
    "sender",
    "content_type",
    "data",
];

/// What kind of payload a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    FinancialData,
    Transaction,
    Budget,
    Analysis,
    Recommendation,
    Alert,
    QueryResult,
    StatusUpdate,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::FinancialData,
        ContentType::Transaction,
        ContentType::Budget,
        ContentType::Analysis,
        ContentType::Recommendation,
        ContentType::Alert,
        ContentType::QueryResult,
        ContentType::StatusUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::FinancialData => "financial_data",
            ContentType::Transaction => "transaction",
            ContentType::Budget => "budget",
            ContentType::Analysis => "analysis",
            ContentType::Recommendation => "recommendation",
            ContentType::Alert => "alert",
            ContentType::QueryResult => "query_result",
            ContentType::StatusUpdate => "status_update",
        }
    }

    /// Fields the payload must carry for this content type.
    ///
    /// Content types without a schema impose no payload requirements.
    pub fn required_data_fields(self) -> &'static [&'static str] {
        match self {
            ContentType::FinancialData => &["amount", "currency", "date"],
            ContentType::Transaction => &["id", "type", "amount", "date"],
            ContentType::Budget => &["category", "limit", "period"],
            ContentType::Analysis => &["type", "period", "results"],
            _ => &[],
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid content type: {s}")))
    }
}

/// Validation stamp carried by every constructed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStamp {
    pub validated: bool,
    pub validation_timestamp: DateTime<Utc>,
}

/// Outcome of validating a wire value, listing every problem found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// A content-typed message.
///
/// MCP describes what a payload means, not where it goes: messages carry
/// a sender but no receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpMessage {
    pub protocol: Protocol,
    pub version: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub content_type: ContentType,
    pub schema_version: String,
    pub data: Value,
    pub metadata: Map<String, Value>,
    pub validation: ValidationStamp,
}

impl McpMessage {
    /// Attach free-form metadata.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn build(sender: &str, content_type: ContentType, data: Value) -> McpMessage {
    McpMessage {
        protocol: Protocol::Mcp,
        version: PROTOCOL_VERSION.to_string(),
        message_id: wire::message_id(),
        timestamp: wire::timestamp(),
        sender: sender.to_string(),
        content_type,
        schema_version: PROTOCOL_VERSION.to_string(),
        data,
        metadata: Map::new(),
        validation: ValidationStamp {
            validated: true,
            validation_timestamp: wire::timestamp(),
        },
    }
}

/// Build an MCP message, failing when the content type is out of set.
pub fn create_message(sender: &str, content_type: &str, data: Value) -> Result<McpMessage> {
    let content_type = content_type.parse::<ContentType>()?;
    Ok(build(sender, content_type, data))
}

/// A single financial figure.
pub fn create_financial_data(
    sender: &str,
    amount: f64,
    currency: &str,
    date: &str,
    category: Option<&str>,
    description: Option<&str>,
) -> McpMessage {
    build(
        sender,
        ContentType::FinancialData,
        json!({
            "amount": amount,
            "currency": currency,
            "date": date,
            "category": category,
            "description": description,
        }),
    )
}

/// One transaction record.
pub fn create_transaction(
    sender: &str,
    transaction_id: i64,
    transaction_type: &str,
    amount: f64,
    date: &str,
    category: Option<&str>,
    description: Option<&str>,
) -> McpMessage {
    build(
        sender,
        ContentType::Transaction,
        json!({
            "id": transaction_id,
            "type": transaction_type,
            "amount": amount,
            "date": date,
            "category": category,
            "description": description,
        }),
    )
}

/// A budget with its limit and current standing.
///
/// `remaining` defaults to the full limit when not provided.
pub fn create_budget(
    sender: &str,
    category: &str,
    limit: f64,
    period: Value,
    spent: Option<f64>,
    remaining: Option<f64>,
) -> McpMessage {
    build(
        sender,
        ContentType::Budget,
        json!({
            "category": category,
            "limit": limit,
            "period": period,
            "spent": spent.unwrap_or(0.0),
            "remaining": remaining.unwrap_or(limit),
        }),
    )
}

/// An analysis over a period, with optional recommendations.
pub fn create_analysis(
    sender: &str,
    analysis_type: &str,
    period: Value,
    results: Value,
    recommendations: Option<Vec<String>>,
) -> McpMessage {
    build(
        sender,
        ContentType::Analysis,
        json!({
            "type": analysis_type,
            "period": period,
            "results": results,
            "recommendations": recommendations.unwrap_or_default(),
        }),
    )
}

/// Result set for a query, stamped with the retrieval time.
pub fn create_query_result(
    sender: &str,
    query_type: &str,
    results: Vec<Value>,
    total_count: usize,
    filters: Option<Value>,
) -> McpMessage {
    build(
        sender,
        ContentType::QueryResult,
        json!({
            "query_type": query_type,
            "results": results,
            "total_count": total_count,
            "filters": filters.unwrap_or_else(|| json!({})),
            "retrieved_at": wire::timestamp(),
        }),
    )
}

/// Validate a wire value, reporting every missing field.
///
/// When top-level protocol fields are absent the report stops there;
/// otherwise tag, content type, and the per-content-type data schema are
/// all checked and every failure is collected.
pub fn validate(message: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if message.get(field).is_none() {
            errors.push(format!("missing required field: {field}"));
        }
    }
    if !errors.is_empty() {
        return ValidationReport::from_errors(errors);
    }

    if message["protocol"] != "MCP" {
        errors.push(format!("wrong protocol tag: {}", message["protocol"]));
    }

    let content_type = message["content_type"]
        .as_str()
        .and_then(|c| c.parse::<ContentType>().ok());
    if content_type.is_none() {
        errors.push(format!("invalid content type: {}", message["content_type"]));
    }

    if let Some(content_type) = content_type {
        if errors.is_empty() {
            let data = &message["data"];
            for field in content_type.required_data_fields() {
                if data.get(field).is_none() {
                    errors.push(format!("missing required data field: {field}"));
                }
            }
        }
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_messages_validate() {
        let message = create_message("KnowledgeBase", "status_update", json!({"estado": "ok"}))
            .expect("valid content type");
        let report = validate(&message.to_value().expect("serialize"));
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(message.validation.validated);
    }

    #[test]
    fn out_of_set_content_types_fail_construction() {
        for bad in ["invoice", "FINANCIAL_DATA", ""] {
            let result = create_message("a", bad, json!({}));
            assert!(result.is_err(), "content type {bad:?} should be rejected");
        }
    }

    #[test]
    fn typed_helpers_satisfy_their_schemas() {
        let messages = [
            create_financial_data("a", 120.5, "MXN", "2025-01-15", Some("comida"), None),
            create_transaction("a", 42, "gasto", 99.0, "2025-01-16", None, None),
            create_budget("a", "comida", 500.0, json!({"month": 1}), Some(150.0), None),
            create_analysis("a", "mensual", json!({"month": 1}), json!({"total": 1}), None),
            create_query_result("a", "transacciones", vec![json!({"id": 1})], 1, None),
        ];
        for message in messages {
            let report = validate(&message.to_value().expect("serialize"));
            assert!(report.valid, "errors: {:?}", report.errors);
        }
    }

    #[test]
    fn budget_remaining_defaults_to_limit() {
        let message = create_budget("a", "comida", 500.0, json!({"month": 1}), None, None);
        assert_eq!(message.data["spent"], 0.0);
        assert_eq!(message.data["remaining"], 500.0);
    }

    #[test]
    fn validation_reports_every_missing_data_field() {
        let mut message = create_transaction("a", 1, "gasto", 10.0, "2025-01-01", None, None)
            .to_value()
            .expect("serialize");
        message["data"] = json!({"amount": 10.0});
        let report = validate(&message);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        for field in ["id", "type", "date"] {
            assert!(
                report
                    .errors
                    .iter()
                    .any(|e| e.contains(&format!("data field: {field}"))),
                "expected an error for {field}, got {:?}",
                report.errors
            );
        }
    }

    #[test]
    fn validation_reports_every_missing_top_level_field() {
        let report = validate(&json!({"protocol": "MCP"}));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 5);
    }

    #[test]
    fn unknown_content_type_on_wire_is_reported() {
        let mut message = create_financial_data("a", 1.0, "MXN", "2025-01-01", None, None)
            .to_value()
            .expect("serialize");
        message["content_type"] = json!("bill");
        let report = validate(&message);
        assert!(!report.valid);
        assert!(report.errors[0].contains("invalid content type"));
    }

    #[test]
    fn schemaless_content_types_need_no_data_fields() {
        let message = create_message("a", "recommendation", json!({}))
            .expect("valid content type");
        assert!(validate(&message.to_value().expect("serialize")).valid);
    }
}
