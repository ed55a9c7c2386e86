//! Data models for context selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message from the conversation history
///
/// Only `role` and `content` take part in selection; the timestamp is carried
/// through for callers that persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Role/content pair forwarded to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ContextMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Which tier of the fallback ladder produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    Empty,
    FullContext,
    RecentWindow,
    ImportantPlusRecent,
    AggressiveTruncation,
}

impl SelectionStrategy {
    pub const ALL: [SelectionStrategy; 5] = [
        SelectionStrategy::Empty,
        SelectionStrategy::FullContext,
        SelectionStrategy::RecentWindow,
        SelectionStrategy::ImportantPlusRecent,
        SelectionStrategy::AggressiveTruncation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::Empty => "empty",
            SelectionStrategy::FullContext => "full-context",
            SelectionStrategy::RecentWindow => "recent-window",
            SelectionStrategy::ImportantPlusRecent => "important-plus-recent",
            SelectionStrategy::AggressiveTruncation => "aggressive-truncation",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a context selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    /// Selected messages in original order
    pub messages: Vec<ContextMessage>,
    /// Estimated token sum of `messages`
    pub total_tokens: usize,
    /// True when any input message was left out
    pub truncated: bool,
    pub strategy: SelectionStrategy,
}

impl ContextResult {
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            total_tokens: 0,
            truncated: false,
            strategy: SelectionStrategy::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Descriptive statistics over a message list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextStats {
    pub total_messages: usize,
    pub total_tokens: usize,
    /// `total_tokens / total_messages` rounded to the nearest integer, 0 when empty
    pub average_tokens_per_message: usize,
}
