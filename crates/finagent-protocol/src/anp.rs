//! ANP (agent negotiation protocol)
//!
//! Negotiations distribute tasks and resources and resolve conflicts
//! between agents. A negotiation starts `proposed` with an empty round
//! list; appending a response is the only way its status moves.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ProtocolError, Result};
use crate::protocol::Protocol;
use crate::{PROTOCOL_VERSION, wire};

const REQUIRED_FIELDS: [&str; 9] = [
    "protocol",
    "negotiation_id",
    "timestamp",
    "initiator",
    "participants",
    "negotiation_type",
    "status",
    "subject",
    "terms",
];

/// What a negotiation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationType {
    /// Distribute tasks among executors
    TaskAllocation,
    /// Share a limited resource
    ResourceSharing,
    /// Settle a disagreement between agents
    ConflictResolution,
    /// Re-rank competing priorities
    PriorityNegotiation,
}

impl NegotiationType {
    pub const ALL: [NegotiationType; 4] = [
        NegotiationType::TaskAllocation,
        NegotiationType::ResourceSharing,
        NegotiationType::ConflictResolution,
        NegotiationType::PriorityNegotiation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NegotiationType::TaskAllocation => "task_allocation",
            NegotiationType::ResourceSharing => "resource_sharing",
            NegotiationType::ConflictResolution => "conflict_resolution",
            NegotiationType::PriorityNegotiation => "priority_negotiation",
        }
    }
}

impl fmt::Display for NegotiationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NegotiationType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NegotiationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid negotiation type: {s}")))
    }
}

/// Where a negotiation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    /// Initial proposal, no responses yet
    Proposed,
    /// Last responder accepted
    Accepted,
    /// Last responder rejected
    Rejected,
    /// Last responder countered with new terms
    Counter,
    /// All parties committed
    Committed,
}

impl NegotiationStatus {
    pub const ALL: [NegotiationStatus; 5] = [
        NegotiationStatus::Proposed,
        NegotiationStatus::Accepted,
        NegotiationStatus::Rejected,
        NegotiationStatus::Counter,
        NegotiationStatus::Committed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NegotiationStatus::Proposed => "proposed",
            NegotiationStatus::Accepted => "accepted",
            NegotiationStatus::Rejected => "rejected",
            NegotiationStatus::Counter => "counter",
            NegotiationStatus::Committed => "committed",
        }
    }
}

impl fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NegotiationStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NegotiationStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ProtocolError::Validation(format!("invalid negotiation status: {s}")))
    }
}

/// One recorded response within a negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationRound {
    pub round_id: String,
    pub timestamp: DateTime<Utc>,
    pub responder: String,
    pub status: NegotiationStatus,
    pub response: Value,
    pub counter_terms: Option<Value>,
}

/// A multi-party negotiation with an append-only round history.
///
/// Invariant: `status` always mirrors the status of the most recently
/// appended round, or stays `proposed` while `rounds` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Negotiation {
    pub protocol: Protocol,
    pub version: String,
    pub negotiation_id: String,
    pub timestamp: DateTime<Utc>,
    pub initiator: String,
    pub participants: Vec<String>,
    pub negotiation_type: NegotiationType,
    pub status: NegotiationStatus,
    pub subject: Value,
    pub terms: Value,
    pub deadline: Option<String>,
    pub rounds: Vec<NegotiationRound>,
}

impl Negotiation {
    /// Set a response deadline.
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Append one response round and move the negotiation to its status.
    ///
    /// This is the only state-transition path; rounds are never removed
    /// or reordered. Fails when `status` is out of set, leaving the
    /// negotiation untouched.
    pub fn add_response(
        &mut self,
        responder: &str,
        status: &str,
        response: Value,
        counter_terms: Option<Value>,
    ) -> Result<()> {
        let status = status.parse::<NegotiationStatus>()?;
        self.rounds.push(NegotiationRound {
            round_id: wire::message_id(),
            timestamp: wire::timestamp(),
            responder: responder.to_string(),
            status,
            response,
            counter_terms,
        });
        self.status = status;
        Ok(())
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn build(
    initiator: &str,
    participants: Vec<String>,
    negotiation_type: NegotiationType,
    subject: Value,
    terms: Value,
) -> Negotiation {
    Negotiation {
        protocol: Protocol::Anp,
        version: PROTOCOL_VERSION.to_string(),
        negotiation_id: wire::message_id(),
        timestamp: wire::timestamp(),
        initiator: initiator.to_string(),
        participants,
        negotiation_type,
        status: NegotiationStatus::Proposed,
        subject,
        terms,
        deadline: None,
        rounds: Vec::new(),
    }
}

/// Open a negotiation, failing when the type is out of set.
///
/// The negotiation starts with `status="proposed"` and no rounds.
pub fn create_negotiation(
    initiator: &str,
    participants: Vec<String>,
    negotiation_type: &str,
    subject: Value,
    terms: Value,
) -> Result<Negotiation> {
    let negotiation_type = negotiation_type.parse::<NegotiationType>()?;
    Ok(build(
        initiator,
        participants,
        negotiation_type,
        subject,
        terms,
    ))
}

/// Task-allocation negotiation distributing `tasks` among executors.
pub fn allocate_tasks(coordinator: &str, executors: Vec<String>, tasks: &[Value]) -> Negotiation {
    build(
        coordinator,
        executors,
        NegotiationType::TaskAllocation,
        json!({
            "description": "Asignación de tareas financieras",
            "total_tasks": tasks.len(),
        }),
        json!({
            "tasks": tasks,
            "distribution_strategy": "balanced",
            "priority_order": "sequential",
        }),
    )
}

/// Conflict-resolution negotiation mediated by `mediator`.
pub fn resolve_conflict(
    mediator: &str,
    conflicting_agents: Vec<String>,
    conflict_description: &str,
    proposed_solution: Value,
) -> Negotiation {
    let subject = json!({
        "conflict": conflict_description,
        "agents_involved": conflicting_agents,
    });
    build(
        mediator,
        conflicting_agents.clone(),
        NegotiationType::ConflictResolution,
        subject,
        json!({
            "proposed_solution": proposed_solution,
            "requires_consensus": true,
        }),
    )
}

/// Resource-sharing negotiation asking holders for `amount_needed`.
pub fn negotiate_resources(
    requester: &str,
    resource_holders: Vec<String>,
    resource_type: &str,
    amount_needed: f64,
) -> Negotiation {
    build(
        requester,
        resource_holders,
        NegotiationType::ResourceSharing,
        json!({
            "resource_type": resource_type,
            "amount_needed": amount_needed,
        }),
        json!({
            "distribution": "fair_share",
            "return_policy": "not_required",
        }),
    )
}

/// Check an inbound wire value against the ANP schema.
pub fn validate(negotiation: &Value) -> bool {
    if !wire::has_fields(negotiation, &REQUIRED_FIELDS) {
        return false;
    }
    if negotiation["protocol"] != "ANP" {
        return false;
    }
    let type_ok = negotiation["negotiation_type"]
        .as_str()
        .is_some_and(|t| t.parse::<NegotiationType>().is_ok());
    let status_ok = negotiation["status"]
        .as_str()
        .is_some_and(|s| s.parse::<NegotiationStatus>().is_ok());
    type_ok && status_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants() -> Vec<String> {
        vec!["Ejecutor".to_string(), "KnowledgeBase".to_string()]
    }

    #[test]
    fn created_negotiations_validate() {
        let negotiation = create_negotiation(
            "Planificador",
            participants(),
            "task_allocation",
            json!({"description": "reparto"}),
            json!({"tasks": []}),
        )
        .expect("valid type");
        assert!(validate(&negotiation.to_value().expect("serialize")));
        assert_eq!(negotiation.status, NegotiationStatus::Proposed);
        assert!(negotiation.rounds.is_empty());
    }

    #[test]
    fn out_of_set_types_fail_construction() {
        for bad in ["bidding", "TASK_ALLOCATION", ""] {
            let result = create_negotiation("a", participants(), bad, json!({}), json!({}));
            assert!(result.is_err(), "type {bad:?} should be rejected");
        }
    }

    #[test]
    fn add_response_appends_round_and_moves_status() {
        let mut negotiation = allocate_tasks("Planificador", participants(), &[json!({"id": 1})]);
        negotiation
            .add_response("Ejecutor", "accepted", json!({"nota": "ok"}), None)
            .expect("valid status");
        assert_eq!(negotiation.rounds.len(), 1);
        assert_eq!(negotiation.status, NegotiationStatus::Accepted);
        assert_eq!(negotiation.rounds[0].responder, "Ejecutor");

        negotiation
            .add_response(
                "KnowledgeBase",
                "counter",
                json!({"nota": "más tiempo"}),
                Some(json!({"deadline": "mañana"})),
            )
            .expect("valid status");
        assert_eq!(negotiation.rounds.len(), 2);
        assert_eq!(negotiation.status, NegotiationStatus::Counter);
        assert!(negotiation.rounds[1].counter_terms.is_some());
    }

    #[test]
    fn status_always_mirrors_last_round() {
        let mut negotiation = negotiate_resources("Ejecutor", participants(), "memoria", 2.0);
        for (responder, status) in [("a", "rejected"), ("b", "counter"), ("c", "committed")] {
            negotiation
                .add_response(responder, status, json!({}), None)
                .expect("valid status");
            let last = negotiation.rounds.last().expect("round appended");
            assert_eq!(negotiation.status, last.status);
        }
    }

    #[test]
    fn invalid_round_status_leaves_negotiation_untouched() {
        let mut negotiation = allocate_tasks("Planificador", participants(), &[]);
        let result = negotiation.add_response("Ejecutor", "maybe", json!({}), None);
        assert!(result.is_err());
        assert!(negotiation.rounds.is_empty());
        assert_eq!(negotiation.status, NegotiationStatus::Proposed);
    }

    #[test]
    fn allocate_tasks_counts_tasks_in_subject() {
        let tasks = vec![json!({"id": 1}), json!({"id": 2})];
        let negotiation = allocate_tasks("Planificador", participants(), &tasks);
        assert_eq!(negotiation.subject["total_tasks"], 2);
        assert_eq!(negotiation.terms["priority_order"], "sequential");
        assert_eq!(
            negotiation.negotiation_type,
            NegotiationType::TaskAllocation
        );
    }

    #[test]
    fn validate_rejects_unknown_status_on_wire() {
        let mut value = allocate_tasks("a", participants(), &[])
            .to_value()
            .expect("serialize");
        value["status"] = json!("stalled");
        assert!(!validate(&value));
    }
}
