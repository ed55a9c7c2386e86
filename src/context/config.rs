//! Context window configuration

use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Budgets for a single context selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Size of the recent window
    #[serde(default = "default_max_recent_messages")]
    pub max_recent_messages: usize,

    /// Token budget for the selected messages
    #[serde(default = "default_max_total_tokens")]
    pub max_total_tokens: usize,

    /// Earliest messages kept as anchors when truncating
    #[serde(default = "default_keep_first_messages")]
    pub keep_first_messages: usize,

    /// Try the important-plus-recent tier before plain truncation
    #[serde(default = "default_keep_important_messages")]
    pub keep_important_messages: bool,
}

fn default_max_recent_messages() -> usize {
    12
}

fn default_max_total_tokens() -> usize {
    8000
}

fn default_keep_first_messages() -> usize {
    2
}

fn default_keep_important_messages() -> bool {
    true
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_recent_messages: default_max_recent_messages(),
            max_total_tokens: default_max_total_tokens(),
            keep_first_messages: default_keep_first_messages(),
            keep_important_messages: default_keep_important_messages(),
        }
    }
}

impl ContextConfig {
    /// Validate that both budgets are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.max_recent_messages == 0 {
            return Err(ContextError::Configuration(
                "max_recent_messages must be greater than 0".to_string(),
            ));
        }
        if self.max_total_tokens == 0 {
            return Err(ContextError::Configuration(
                "max_total_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_max_recent_messages(mut self, max_recent_messages: usize) -> Self {
        self.max_recent_messages = max_recent_messages;
        self
    }

    pub fn with_max_total_tokens(mut self, max_total_tokens: usize) -> Self {
        self.max_total_tokens = max_total_tokens;
        self
    }

    pub fn with_keep_first_messages(mut self, keep_first_messages: usize) -> Self {
        self.keep_first_messages = keep_first_messages;
        self
    }

    pub fn with_keep_important_messages(mut self, keep_important_messages: bool) -> Self {
        self.keep_important_messages = keep_important_messages;
        self
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(num) = parse_env("DUCK_MAX_RECENT_MESSAGES") {
            config.max_recent_messages = num;
        }

        if let Some(num) = parse_env("DUCK_MAX_TOTAL_TOKENS") {
            config.max_total_tokens = num;
        }

        if let Some(num) = parse_env("DUCK_KEEP_FIRST_MESSAGES") {
            config.keep_first_messages = num;
        }

        if let Some(flag) = parse_env_bool("DUCK_KEEP_IMPORTANT_MESSAGES") {
            config.keep_important_messages = flag;
        }

        config
    }
}

fn parse_env(key: &str) -> Option<usize> {
    let val = std::env::var(key).ok()?;
    match val.trim().parse() {
        Ok(num) => Some(num),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", key, val);
            None
        }
    }
}

fn parse_env_bool(key: &str) -> Option<bool> {
    let val = std::env::var(key).ok()?;
    match val.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            warn!("Ignoring {}={:?}: expected true/false or 1/0", key, val);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContextConfig::default();
        assert_eq!(config.max_recent_messages, 12);
        assert_eq!(config.max_total_tokens, 8000);
        assert_eq!(config.keep_first_messages, 2);
        assert!(config.keep_important_messages);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let config = ContextConfig::default().with_max_recent_messages(0);
        assert!(matches!(
            config.validate(),
            Err(ContextError::Configuration(_))
        ));

        let config = ContextConfig::default().with_max_total_tokens(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_anchors_allowed() {
        let config = ContextConfig::default().with_keep_first_messages(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ContextConfig =
            serde_json::from_str(r#"{"max_total_tokens": 4000}"#).unwrap();
        assert_eq!(config.max_total_tokens, 4000);
        assert_eq!(config.max_recent_messages, 12);
        assert!(config.keep_important_messages);
    }

    #[test]
    fn test_from_env_overlay() {
        // all DUCK_* variables are touched only here
        const KEYS: [&str; 4] = [
            "DUCK_MAX_RECENT_MESSAGES",
            "DUCK_MAX_TOTAL_TOKENS",
            "DUCK_KEEP_FIRST_MESSAGES",
            "DUCK_KEEP_IMPORTANT_MESSAGES",
        ];

        std::env::set_var("DUCK_MAX_RECENT_MESSAGES", "20");
        std::env::set_var("DUCK_MAX_TOTAL_TOKENS", " 4000 ");
        std::env::set_var("DUCK_KEEP_FIRST_MESSAGES", "0");
        std::env::set_var("DUCK_KEEP_IMPORTANT_MESSAGES", "FALSE");
        let config = ContextConfig::from_env();
        assert_eq!(config.max_recent_messages, 20);
        assert_eq!(config.max_total_tokens, 4000);
        assert_eq!(config.keep_first_messages, 0);
        assert!(!config.keep_important_messages);

        std::env::set_var("DUCK_KEEP_IMPORTANT_MESSAGES", "0");
        assert!(!ContextConfig::from_env().keep_important_messages);
        std::env::set_var("DUCK_KEEP_IMPORTANT_MESSAGES", "1");
        assert!(ContextConfig::from_env().keep_important_messages);

        // unparseable values keep the defaults
        std::env::set_var("DUCK_MAX_RECENT_MESSAGES", "twelve");
        std::env::set_var("DUCK_MAX_TOTAL_TOKENS", "-5");
        std::env::set_var("DUCK_KEEP_FIRST_MESSAGES", "2.5");
        std::env::set_var("DUCK_KEEP_IMPORTANT_MESSAGES", "yes");
        let config = ContextConfig::from_env();

        for key in KEYS {
            std::env::remove_var(key);
        }

        assert_eq!(config, ContextConfig::default());
        assert_eq!(ContextConfig::from_env(), ContextConfig::default());
    }
}
