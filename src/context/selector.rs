//! Tiered context-window selection
//!
//! Picks the subset of a conversation sent to the model. Tiers are tried in
//! order and the first whose output fits the token budget wins:
//! - Full context: every message, when within both the count and token caps
//! - Recent window: the last `max_recent_messages` messages
//! - Important plus recent: anchors and flagged early messages (≤40% of the
//!   budget) followed by the longest fitting suffix of the recent window
//! - Aggressive truncation: newest messages backwards until one does not fit
//!
//! Selection never reorders messages and holds no state between calls.

use super::config::ContextConfig;
use super::importance::is_important;
use super::models::{ContextMessage, ContextResult, Message, SelectionStrategy};
use super::token_estimator::{CharRatioEstimator, TokenEstimator};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Most early important messages admitted alongside the anchors
pub const MAX_IMPORTANT_MESSAGES: usize = 3;

/// Share of the token budget available to anchors and important messages, in percent
pub const IMPORTANT_BUDGET_PERCENT: usize = 40;

/// Context selector bound to a validated configuration
#[derive(Clone)]
pub struct ContextSelector {
    config: ContextConfig,
    estimator: Arc<dyn TokenEstimator>,
}

impl ContextSelector {
    /// Create a selector using the default character-ratio estimator
    pub fn new(config: ContextConfig) -> Result<Self> {
        Self::with_estimator(config, Arc::new(CharRatioEstimator))
    }

    /// Create a selector with a custom token estimator
    pub fn with_estimator(
        config: ContextConfig,
        estimator: Arc<dyn TokenEstimator>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, estimator })
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn estimator(&self) -> &dyn TokenEstimator {
        self.estimator.as_ref()
    }

    pub(crate) fn estimator_handle(&self) -> &Arc<dyn TokenEstimator> {
        &self.estimator
    }

    /// Select the messages to send for this turn
    pub fn select(&self, messages: &[Message]) -> ContextResult {
        if messages.is_empty() {
            return ContextResult::empty();
        }

        let tokens: Vec<usize> = messages
            .iter()
            .map(|m| self.estimator.estimate(&m.content))
            .collect();
        let total = messages.len();
        let max_recent = self.config.max_recent_messages;
        let budget = self.config.max_total_tokens;

        let all_tokens: usize = tokens.iter().sum();
        if total <= max_recent && all_tokens <= budget {
            debug!("Full context fits: {} messages, {} tokens", total, all_tokens);
            return self.build(
                messages,
                &tokens,
                (0..total).collect(),
                SelectionStrategy::FullContext,
            );
        }

        let recent_start = total.saturating_sub(max_recent);
        let recent_tokens: usize = tokens[recent_start..].iter().sum();
        if recent_tokens <= budget {
            debug!(
                "Recent window fits: {} of {} messages, {} tokens",
                total - recent_start,
                total,
                recent_tokens
            );
            return self.build(
                messages,
                &tokens,
                (recent_start..total).collect(),
                SelectionStrategy::RecentWindow,
            );
        }

        if self.config.keep_important_messages && total > max_recent {
            let indices = self.important_plus_recent(messages, &tokens, recent_start);
            return self.build(
                messages,
                &tokens,
                indices,
                SelectionStrategy::ImportantPlusRecent,
            );
        }

        let indices = self.aggressive_truncation(&tokens);
        self.build(messages, &tokens, indices, SelectionStrategy::AggressiveTruncation)
    }

    /// Anchors, up to three important early messages, then the fitting recent suffix
    fn important_plus_recent(
        &self,
        messages: &[Message],
        tokens: &[usize],
        recent_start: usize,
    ) -> Vec<usize> {
        let total = messages.len();
        let budget = self.config.max_total_tokens;

        let anchor_count = self.config.keep_first_messages.min(recent_start);
        let mut selected: Vec<usize> = (0..anchor_count).collect();
        let mut running: usize = tokens[..anchor_count].iter().sum();

        let mut admitted = 0;
        for index in anchor_count..recent_start {
            if admitted == MAX_IMPORTANT_MESSAGES {
                break;
            }
            if !is_important(&messages[index], index, total) {
                continue;
            }
            let candidate = running + tokens[index];
            // candidate <= 40% of budget, in integers
            if candidate * 100 <= budget * IMPORTANT_BUDGET_PERCENT {
                trace!("Admitting important message {} ({} tokens)", index, tokens[index]);
                selected.push(index);
                running = candidate;
                admitted += 1;
            }
        }

        let remaining = budget.saturating_sub(running);
        let suffix_start = fitting_suffix_start(&tokens[recent_start..], remaining) + recent_start;

        debug!(
            "Important plus recent: {} anchors, {} important, {} recent within {} remaining tokens",
            anchor_count,
            admitted,
            total - suffix_start,
            remaining
        );

        selected.extend(suffix_start..total);
        selected
    }

    /// Newest messages backwards, stopping at the first that does not fit
    fn aggressive_truncation(&self, tokens: &[usize]) -> Vec<usize> {
        let start = fitting_suffix_start(tokens, self.config.max_total_tokens);
        debug!(
            "Aggressive truncation kept {} of {} messages",
            tokens.len() - start,
            tokens.len()
        );
        (start..tokens.len()).collect()
    }

    fn build(
        &self,
        messages: &[Message],
        tokens: &[usize],
        indices: Vec<usize>,
        strategy: SelectionStrategy,
    ) -> ContextResult {
        let total_tokens = indices.iter().map(|&i| tokens[i]).sum();
        let selected: Vec<ContextMessage> =
            indices.iter().map(|&i| ContextMessage::from(&messages[i])).collect();

        if selected.is_empty() {
            warn!(
                "No message fits the {} token budget ({} messages offered)",
                self.config.max_total_tokens,
                messages.len()
            );
        }

        ContextResult {
            truncated: selected.len() < messages.len(),
            messages: selected,
            total_tokens,
            strategy,
        }
    }
}

/// Start index of the longest suffix of `tokens` whose sum stays within `budget`
fn fitting_suffix_start(tokens: &[usize], budget: usize) -> usize {
    let mut remaining = budget;
    let mut start = tokens.len();
    for (index, &cost) in tokens.iter().enumerate().rev() {
        if cost > remaining {
            break;
        }
        remaining -= cost;
        start = index;
    }
    start
}

/// Select context with the default estimator.
///
/// `None` uses [`ContextConfig::default`]. Fails only when the configuration
/// has a zero budget.
pub fn select_optimal_context(
    messages: &[Message],
    config: Option<&ContextConfig>,
) -> Result<ContextResult> {
    let config = config.copied().unwrap_or_default();
    Ok(ContextSelector::new(config)?.select(messages))
}
