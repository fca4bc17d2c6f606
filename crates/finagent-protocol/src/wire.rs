//! Shared wire-format helpers: id and timestamp stamping, field checks

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Generate a fresh unique message id.
pub(crate) fn message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC timestamp for envelope stamping.
pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Check that `value` is an object containing every named field.
pub(crate) fn has_fields(value: &Value, fields: &[&str]) -> bool {
    match value.as_object() {
        Some(map) => fields.iter().all(|field| map.contains_key(*field)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(message_id(), message_id());
    }

    #[test]
    fn has_fields_checks_presence() {
        let value = json!({"a": 1, "b": null});
        assert!(has_fields(&value, &["a", "b"]));
        assert!(!has_fields(&value, &["a", "c"]));
    }

    #[test]
    fn has_fields_rejects_non_objects() {
        assert!(!has_fields(&json!([1, 2]), &["a"]));
        assert!(!has_fields(&json!("text"), &[]));
    }
}
