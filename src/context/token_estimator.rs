//! Token estimation
//!
//! The default estimator divides character length by 3.5 and rounds up, so
//! budgets err on the side of over-counting.

use crate::error::{ContextError, Result};
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Characters per token used by the default estimator
pub const CHARS_PER_TOKEN: f64 = 3.5;

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;

    /// Estimate tokens for multiple texts
    fn estimate_batch(&self, texts: &[&str]) -> Vec<usize> {
        texts.iter().map(|t| self.estimate(t)).collect()
    }
}

/// Character-length estimator: `ceil(len / CHARS_PER_TOKEN)`
///
/// Length is counted in UTF-16 code units, the unit chat clients report
/// string lengths in.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharRatioEstimator;

impl CharRatioEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        let units = text.encode_utf16().count();
        // ceil(units / CHARS_PER_TOKEN) == ceil(2 * units / 7), without float rounding
        (units * 2).div_ceil(7)
    }
}

/// Estimate tokens with the default character-ratio estimator
pub fn estimate_tokens(content: &str) -> usize {
    CharRatioEstimator.estimate(content)
}

/// Tiktoken-based token estimator using cl100k_base (GPT-4, GPT-3.5-turbo)
pub struct TiktokenEstimator {
    bpe: Arc<CoreBPE>,
}

impl TiktokenEstimator {
    /// Create a new tiktoken estimator with cl100k_base encoding
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| ContextError::Estimator(e.to_string()))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Word-based token estimator (~1.3 tokens per word)
#[derive(Debug, Clone, Copy)]
pub struct WordBasedEstimator {
    tokens_per_word: f64,
}

impl WordBasedEstimator {
    pub fn new(tokens_per_word: f64) -> Self {
        Self { tokens_per_word }
    }
}

impl Default for WordBasedEstimator {
    fn default() -> Self {
        Self::new(1.3)
    }
}

impl TokenEstimator for WordBasedEstimator {
    fn estimate(&self, text: &str) -> usize {
        let word_count = text.split_whitespace().count();
        (word_count as f64 * self.tokens_per_word).ceil() as usize
    }
}
