//! Configuration for the finance agent system

use finagent_core::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Financial thresholds and limits shared by the agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Budget utilization percentage that triggers an alert
    pub alert_threshold_percentage: f64,

    /// Fraction of income the system recommends saving
    pub savings_recommendation_rate: f64,

    /// Upper bound on rows returned by a single query
    pub max_transactions_per_query: usize,

    /// Default look-back window for balance analysis, in days
    pub analysis_period_days: i64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            alert_threshold_percentage: 80.0,
            savings_recommendation_rate: 0.2,
            max_transactions_per_query: 100,
            analysis_period_days: 30,
        }
    }
}

impl FinanceConfig {
    /// Set the alert threshold.
    pub fn with_alert_threshold(mut self, percentage: f64) -> Self {
        self.alert_threshold_percentage = percentage;
        self
    }

    /// Set the analysis look-back window.
    pub fn with_analysis_period_days(mut self, days: i64) -> Self {
        self.analysis_period_days = days;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.alert_threshold_percentage) {
            return Err(AgentError::InitializationFailed(
                "alert_threshold_percentage must be within 0..=100".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.savings_recommendation_rate) {
            return Err(AgentError::InitializationFailed(
                "savings_recommendation_rate must be within 0..=1".to_string(),
            ));
        }

        if self.analysis_period_days <= 0 {
            return Err(AgentError::InitializationFailed(
                "analysis_period_days must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Per-agent model assignments.
///
/// The executor and knowledge base run heavier analyses and get the
/// stronger model; the rest favor latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentModels {
    pub planner: String,
    pub executor: String,
    pub notifier: String,
    pub interface: String,
    pub knowledge_base: String,
    pub monitor: String,
}

impl Default for AgentModels {
    fn default() -> Self {
        Self {
            planner: "gemini-2.0-flash".to_string(),
            executor: "gemini-2.5-flash".to_string(),
            notifier: "gemini-2.0-flash".to_string(),
            interface: "gemini-2.0-flash".to_string(),
            knowledge_base: "gemini-2.5-flash".to_string(),
            monitor: "gemini-2.0-flash".to_string(),
        }
    }
}

impl AgentModels {
    /// Assign the same model to every agent.
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            planner: model.clone(),
            executor: model.clone(),
            notifier: model.clone(),
            interface: model.clone(),
            knowledge_base: model.clone(),
            monitor: model,
        }
    }

    /// Load assignments from the environment, falling back to the
    /// defaults for any variable that is not set.
    pub fn from_env() -> Self {
        let mut models = Self::default();
        if let Ok(model) = std::env::var("FINAGENT_PLANNER_MODEL") {
            models.planner = model;
        }
        if let Ok(model) = std::env::var("FINAGENT_EXECUTOR_MODEL") {
            models.executor = model;
        }
        if let Ok(model) = std::env::var("FINAGENT_NOTIFIER_MODEL") {
            models.notifier = model;
        }
        if let Ok(model) = std::env::var("FINAGENT_INTERFACE_MODEL") {
            models.interface = model;
        }
        if let Ok(model) = std::env::var("FINAGENT_KNOWLEDGE_MODEL") {
            models.knowledge_base = model;
        }
        if let Ok(model) = std::env::var("FINAGENT_MONITOR_MODEL") {
            models.monitor = model;
        }
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FinanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alert_threshold_percentage, 80.0);
        assert_eq!(config.analysis_period_days, 30);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = FinanceConfig::default().with_alert_threshold(140.0);
        assert!(config.validate().is_err());

        let config = FinanceConfig {
            savings_recommendation_rate: 1.5,
            ..FinanceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FinanceConfig::default().with_analysis_period_days(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_models() {
        let models = AgentModels::default();
        assert_eq!(models.executor, "gemini-2.5-flash");
        assert_eq!(models.knowledge_base, "gemini-2.5-flash");
        assert_eq!(models.planner, "gemini-2.0-flash");
    }

    #[test]
    fn test_uniform_models() {
        let models = AgentModels::uniform("test-model");
        assert_eq!(models.planner, "test-model");
        assert_eq!(models.monitor, "test-model");
    }
}
