//! Model endpoint configuration from TOML (`[model]` section)

use agentloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw model configuration from TOML
///
/// ```toml
/// [model]
/// endpoint = "https://api.openai.com/v1"
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_secs = 120
/// ```
///
/// The key itself never lives in the file, only the variable holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl FileModelConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::invalid_value("model.model", "cannot be empty"));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::invalid_value("model.timeout_secs", "must be at least 1"));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FileModelConfig::default().validate().is_empty());
    }

    #[test]
    fn test_empty_model_and_zero_timeout() {
        let config = FileModelConfig {
            model: String::new(),
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_missing_key_env() {
        let config = FileModelConfig {
            api_key_env: "AGENTLOOP_TEST_SURELY_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
