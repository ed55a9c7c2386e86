//! Context-window selection for the rubber duck chat assistant
//!
//! The chat endpoint hands over the ordered history of a conversation and
//! forwards the returned [`ContextResult`] messages to the model.
//!
//! ```
//! use duck_context::{select_optimal_context, Message, SelectionStrategy};
//!
//! let history = vec![
//!     Message::user("I am working on a parser"),
//!     Message::assistant("Tell me more about the grammar."),
//! ];
//! let result = select_optimal_context(&history, None).unwrap();
//! assert_eq!(result.strategy, SelectionStrategy::FullContext);
//! assert!(!result.truncated);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;

pub use context::{
    estimate_tokens, get_adaptive_config, get_context_stats, is_important,
    select_optimal_context, ContextConfig, ContextMessage, ContextResult, ContextSelector,
    ContextStats, Message, Role, SelectionStrategy, TokenEstimator,
};
pub use error::{ContextError, Result};
