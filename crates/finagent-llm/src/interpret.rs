//! Interpretation of generator output as structured records
//!
//! Generators are prompted for JSON but may answer with anything:
//! surrounding prose, markdown fences, or plain refusal text. The
//! [`Interpreted`] type keeps both outcomes honest - a parsed record, or
//! a deterministic fallback carrying the raw text for traceability.

use serde::de::DeserializeOwned;

/// Result of interpreting generator output as a typed record.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted<T> {
    /// The output parsed into the expected record.
    Parsed(T),
    /// The output could not be parsed; a deterministic fallback was
    /// substituted and the raw text kept for traceability.
    Degraded {
        /// Substitute record built from whatever real inputs were available
        fallback: T,
        /// The generator's verbatim output
        raw: String,
    },
}

impl<T> Interpreted<T> {
    /// Interpret `raw`, building a fallback from it when parsing fails.
    pub fn from_text(raw: &str, fallback: impl FnOnce(&str) -> T) -> Self
    where
        T: DeserializeOwned,
    {
        match parse_json_block::<T>(raw) {
            Some(value) => Interpreted::Parsed(value),
            None => Interpreted::Degraded {
                fallback: fallback(raw),
                raw: raw.to_string(),
            },
        }
    }

    /// Whether a fallback was substituted.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Interpreted::Degraded { .. })
    }

    /// The interpreted record, parsed or fallback.
    pub fn value(&self) -> &T {
        match self {
            Interpreted::Parsed(value) => value,
            Interpreted::Degraded { fallback, .. } => fallback,
        }
    }

    /// Consume into the interpreted record, parsed or fallback.
    pub fn into_value(self) -> T {
        match self {
            Interpreted::Parsed(value) => value,
            Interpreted::Degraded { fallback, .. } => fallback,
        }
    }

    /// The raw generator text, present only on the degraded path.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Interpreted::Parsed(_) => None,
            Interpreted::Degraded { raw, .. } => Some(raw),
        }
    }
}

/// Parse a JSON record out of generator text.
///
/// Tries the text verbatim first, then the span between the first `{`
/// and the last `}` - generators routinely wrap JSON in prose or
/// markdown fences despite instructions not to.
pub fn parse_json_block<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Some(value);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<T>(&trimmed[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Verdict {
        estado: String,
    }

    #[test]
    fn clean_json_parses() {
        let interpreted =
            Interpreted::<Verdict>::from_text(r#"{"estado": "ok"}"#, |_| Verdict {
                estado: "fallback".to_string(),
            });
        assert!(!interpreted.is_degraded());
        assert_eq!(interpreted.value().estado, "ok");
        assert!(interpreted.raw_text().is_none());
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "Claro, aquí está:\n```json\n{\"estado\": \"ok\"}\n```";
        let interpreted = Interpreted::<Verdict>::from_text(raw, |_| Verdict {
            estado: "fallback".to_string(),
        });
        assert!(!interpreted.is_degraded());
        assert_eq!(interpreted.value().estado, "ok");
    }

    #[test]
    fn refusal_text_degrades_with_raw_preserved() {
        let raw = "No puedo generar ese análisis.";
        let interpreted = Interpreted::<Verdict>::from_text(raw, |text| Verdict {
            estado: text.chars().take(5).collect(),
        });
        assert!(interpreted.is_degraded());
        assert_eq!(interpreted.value().estado, "No pu");
        assert_eq!(interpreted.raw_text(), Some(raw));
    }

    #[test]
    fn wrong_shape_degrades() {
        let interpreted = Interpreted::<Verdict>::from_text(r#"{"otro": 1}"#, |_| Verdict {
            estado: "fallback".to_string(),
        });
        assert!(interpreted.is_degraded());
    }

    #[test]
    fn parse_json_block_handles_nested_braces() {
        let raw = "resultado: {\"a\": {\"b\": 2}} fin";
        let value: Option<Value> = parse_json_block(raw);
        assert_eq!(value, Some(serde_json::json!({"a": {"b": 2}})));
    }

    #[test]
    fn parse_json_block_rejects_braceless_text() {
        let value: Option<Value> = parse_json_block("sin json aquí");
        assert!(value.is_none());
    }
}
