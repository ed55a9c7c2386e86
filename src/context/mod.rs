//! Conversation context-window selection
//!
//! Decides which messages of a chat history are sent to the model under a
//! message-count cap and a token budget, falling back through progressively
//! lossier strategies when the history does not fit.

pub mod adaptive;
pub mod config;
pub mod importance;
pub mod models;
pub mod selector;
pub mod token_estimator;

pub use adaptive::{get_adaptive_config, get_context_stats};
pub use config::ContextConfig;
pub use importance::{is_important, IMPORTANT_KEYWORDS};
pub use models::{ContextMessage, ContextResult, ContextStats, Message, Role, SelectionStrategy};
pub use selector::{select_optimal_context, ContextSelector};
pub use token_estimator::{
    estimate_tokens, CharRatioEstimator, TiktokenEstimator, TokenEstimator, WordBasedEstimator,
};
