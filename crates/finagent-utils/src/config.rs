//! Application-level configuration

use serde::{Deserialize, Serialize};

/// Process-wide settings that are not tied to any one agent.
///
/// Domain thresholds live in `finagent-agents::config`; runtime limits in
/// `finagent-runtime::RuntimeConfig`. This struct only carries what the
/// outer application needs to know about its own environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Environment (development, production, ...)
    pub environment: String,
    /// Verbose diagnostics toggle
    pub debug: bool,
}

impl AppConfig {
    /// Read the configuration from environment variables.
    ///
    /// `FINAGENT_ENV` sets the environment name and `DEBUG` the debug
    /// toggle; both fall back to the defaults when unset.
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var("FINAGENT_ENV")
                .unwrap_or_else(|_| "development".to_string()),
            debug: std::env::var("DEBUG").map_or(true, |raw| parse_debug(&raw)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            debug: true,
        }
    }
}

/// Only the literal string `true` (any casing) enables debug mode.
fn parse_debug(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.environment, "development");
        assert!(config.debug);
    }

    #[test]
    fn test_parse_debug_casings() {
        assert!(parse_debug("true"));
        assert!(parse_debug("True"));
        assert!(parse_debug("TRUE"));
        assert!(!parse_debug("false"));
        assert!(!parse_debug("1"));
        assert!(!parse_debug("yes"));
        assert!(!parse_debug(""));
    }
}
