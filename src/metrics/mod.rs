//! Metrics for context selection
//!
//! Selection itself is pure; the chat endpoint records each result here after
//! calling the selector.

use crate::context::{ContextResult, SelectionStrategy};
use crate::error::Result;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Encoder, Histogram, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use tracing::warn;

/// Global metrics registry
pub static CONTEXT_METRICS: Lazy<Arc<ContextMetrics>> = Lazy::new(|| {
    Arc::new(ContextMetrics::new().expect("Failed to initialize context metrics"))
});

/// Metrics collector
pub struct ContextMetrics {
    registry: Registry,

    /// Selections by strategy label
    pub selections: CounterVec,
    /// Selections that dropped at least one message
    pub truncations: Counter,
    /// Non-empty histories that produced an empty selection
    pub empty_selections: Counter,
    /// Estimated tokens per selection
    pub selected_tokens: Histogram,
    /// Messages left out per selection
    pub dropped_messages: Histogram,
}

impl ContextMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let selections = register_counter_vec_with_registry!(
            Opts::new("context_selections_total", "Total context selections by strategy"),
            &["strategy"],
            registry
        )?;

        let truncations = register_counter_with_registry!(
            Opts::new("context_truncations_total", "Total selections that dropped messages"),
            registry
        )?;

        let empty_selections = register_counter_with_registry!(
            Opts::new(
                "context_empty_selections_total",
                "Total non-empty histories where no message fit the budget"
            ),
            registry
        )?;

        let selected_tokens = register_histogram_with_registry!(
            "context_selected_tokens",
            "Estimated tokens per selected context",
            vec![250.0, 500.0, 1000.0, 2000.0, 4000.0, 6000.0, 8000.0, 10000.0],
            registry
        )?;

        let dropped_messages = register_histogram_with_registry!(
            "context_dropped_messages",
            "Messages left out per selection",
            vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0],
            registry
        )?;

        // pre-create every label so exports list all strategies
        for strategy in SelectionStrategy::ALL {
            selections.with_label_values(&[strategy.as_str()]);
        }

        Ok(Self {
            registry,
            selections,
            truncations,
            empty_selections,
            selected_tokens,
            dropped_messages,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the outcome of selecting from `input_len` messages
    pub fn record_selection(&self, result: &ContextResult, input_len: usize) {
        self.selections
            .with_label_values(&[result.strategy.as_str()])
            .inc();
        self.selected_tokens.observe(result.total_tokens as f64);
        self.dropped_messages
            .observe(input_len.saturating_sub(result.len()) as f64);

        if result.truncated {
            self.truncations.inc();
        }
        if input_len > 0 && result.is_empty() {
            self.empty_selections.inc();
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{select_optimal_context, ContextConfig, Message};

    #[test]
    fn test_metrics_initialization() {
        assert!(ContextMetrics::new().is_ok());
    }

    #[test]
    fn test_record_selection() {
        let metrics = ContextMetrics::new().unwrap();
        let history: Vec<Message> = (0..20).map(|_| Message::user("x".repeat(30))).collect();
        let result = select_optimal_context(&history, None).unwrap();
        metrics.record_selection(&result, history.len());

        let label = [SelectionStrategy::RecentWindow.as_str()];
        assert_eq!(metrics.selections.with_label_values(&label).get(), 1.0);
        assert_eq!(metrics.truncations.get(), 1.0);
        assert_eq!(metrics.empty_selections.get(), 0.0);
        assert_eq!(metrics.dropped_messages.get_sample_sum(), 8.0);
    }

    #[test]
    fn test_record_empty_selection() {
        let metrics = ContextMetrics::new().unwrap();
        let history = vec![Message::user("x".repeat(5000))];
        let config = ContextConfig::default().with_max_total_tokens(10);
        let result = select_optimal_context(&history, Some(&config)).unwrap();
        metrics.record_selection(&result, history.len());
        assert_eq!(metrics.empty_selections.get(), 1.0);
    }

    #[test]
    fn test_export_lists_all_strategies() {
        let metrics = ContextMetrics::new().unwrap();
        let text = metrics.export_prometheus();
        for strategy in SelectionStrategy::ALL {
            assert!(text.contains(strategy.as_str()), "missing {}", strategy);
        }
    }

    #[test]
    fn test_global_metrics() {
        CONTEXT_METRICS.record_selection(&ContextResult::empty(), 0);
        assert!(CONTEXT_METRICS.export_prometheus().contains("context_selections_total"));
    }
}
