// File: persona-common/src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The message another message replied to, normalized the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedMessage {
    pub content: String,
    pub name: Option<String>,
    pub id: Option<String>,
}

/// Single collected chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub quote: Option<QuotedMessage>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, name: Option<String>, id: Option<String>) -> Self {
        Self {
            content: content.into(),
            name,
            id,
            quote: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_quote(mut self, quote: Option<QuotedMessage>) -> Self {
        self.quote = quote;
        self
    }

    pub fn is_from(&self, user_id: &str) -> bool {
        self.id.as_deref() == Some(user_id)
    }
}
