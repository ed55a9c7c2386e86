//! Conversation statistics and verbosity-adaptive configuration

use super::config::ContextConfig;
use super::models::{ContextStats, Message};
use super::selector::ContextSelector;
use super::token_estimator::{CharRatioEstimator, TokenEstimator};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Average tokens per message above which a conversation counts as verbose
pub const VERBOSE_AVERAGE_TOKENS: usize = 200;

/// Average tokens per message below which a conversation counts as terse
pub const TERSE_AVERAGE_TOKENS: usize = 50;

/// Compute message count, token total and rounded average
pub fn context_stats_with(estimator: &dyn TokenEstimator, messages: &[Message]) -> ContextStats {
    let total_messages = messages.len();
    let total_tokens: usize = messages.iter().map(|m| estimator.estimate(&m.content)).sum();
    let average_tokens_per_message = if total_messages == 0 {
        0
    } else {
        // round half up
        (2 * total_tokens + total_messages) / (2 * total_messages)
    };

    ContextStats {
        total_messages,
        total_tokens,
        average_tokens_per_message,
    }
}

/// Derive a configuration from the default based on message verbosity
pub fn adaptive_config_with(estimator: &dyn TokenEstimator, messages: &[Message]) -> ContextConfig {
    let stats = context_stats_with(estimator, messages);
    let config = ContextConfig::default();

    if stats.average_tokens_per_message > VERBOSE_AVERAGE_TOKENS {
        debug!(
            "Verbose conversation ({} tokens/message), tightening window",
            stats.average_tokens_per_message
        );
        config.with_max_recent_messages(8).with_max_total_tokens(6000)
    } else if stats.average_tokens_per_message < TERSE_AVERAGE_TOKENS {
        debug!(
            "Terse conversation ({} tokens/message), widening window",
            stats.average_tokens_per_message
        );
        config.with_max_recent_messages(20).with_max_total_tokens(10000)
    } else {
        config
    }
}

impl ContextSelector {
    /// Statistics measured with this selector's estimator
    pub fn stats(&self, messages: &[Message]) -> ContextStats {
        context_stats_with(self.estimator(), messages)
    }

    /// Selector tuned to the verbosity of `messages`, sharing this estimator
    pub fn adapted_to(&self, messages: &[Message]) -> Result<ContextSelector> {
        let config = adaptive_config_with(self.estimator(), messages);
        ContextSelector::with_estimator(config, Arc::clone(self.estimator_handle()))
    }
}

/// Statistics using the default estimator
pub fn get_context_stats(messages: &[Message]) -> ContextStats {
    context_stats_with(&CharRatioEstimator, messages)
}

/// Adaptive configuration using the default estimator
pub fn get_adaptive_config(messages: &[Message]) -> ContextConfig {
    adaptive_config_with(&CharRatioEstimator, messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(n: usize, chars: usize) -> Vec<Message> {
        (0..n).map(|_| Message::user("x".repeat(chars))).collect()
    }

    #[test]
    fn test_stats_empty() {
        let stats = get_context_stats(&[]);
        assert_eq!(stats, ContextStats::default());
    }

    #[test]
    fn test_stats_rounds_to_nearest() {
        // 1 + 2 = 3 tokens over 2 messages -> 1.5 -> 2
        let list = vec![Message::user("abc"), Message::user("abcd")];
        let stats = get_context_stats(&list);
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.total_tokens, 3);
        assert_eq!(stats.average_tokens_per_message, 2);

        // 1 + 1 + 2 = 4 over 3 -> 1.33 -> 1
        let list = vec![Message::user("a"), Message::user("b"), Message::user("abcd")];
        assert_eq!(get_context_stats(&list).average_tokens_per_message, 1);
    }

    #[test]
    fn test_verbose_conversation_tightens() {
        let config = get_adaptive_config(&messages(6, 1000));
        assert_eq!(config.max_recent_messages, 8);
        assert_eq!(config.max_total_tokens, 6000);
        assert_eq!(config.keep_first_messages, 2);
        assert!(config.keep_important_messages);
    }

    #[test]
    fn test_terse_conversation_loosens() {
        let config = get_adaptive_config(&messages(6, 10));
        assert_eq!(config.max_recent_messages, 20);
        assert_eq!(config.max_total_tokens, 10000);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        // exactly 200 tokens/message: 700 chars
        assert_eq!(get_adaptive_config(&messages(3, 700)), ContextConfig::default());
        // exactly 50 tokens/message: 175 chars
        assert_eq!(get_adaptive_config(&messages(3, 175)), ContextConfig::default());
    }

    #[test]
    fn test_selector_adapts_with_its_estimator() {
        use crate::context::token_estimator::WordBasedEstimator;

        let selector = ContextSelector::with_estimator(
            ContextConfig::default(),
            Arc::new(WordBasedEstimator::default()),
        )
        .unwrap();
        // 1000 chars of one word: terse to the word estimator, verbose by characters
        let list = messages(4, 1000);
        assert_eq!(selector.stats(&list).average_tokens_per_message, 2);
        let adapted = selector.adapted_to(&list).unwrap();
        assert_eq!(adapted.config().max_recent_messages, 20);
        assert_eq!(get_adaptive_config(&list).max_recent_messages, 8);
    }

    #[test]
    fn test_empty_history_is_terse() {
        let config = get_adaptive_config(&[]);
        assert_eq!(config.max_recent_messages, 20);
    }
}
