// File: src/collector/filters.rs
//
// Ready-made predicates for `MessageCollector::add_filter`.

use persona_common::models::{ChatMessage, ConversationEvent};
use persona_common::traits::MessageFilter;

/// Matches messages carrying a mention marker for the given user.
#[derive(Debug, Clone)]
pub struct MentionsUser {
    prefix: String,
}

pub fn mentions_user(user_id: impl AsRef<str>) -> MentionsUser {
    MentionsUser {
        prefix: format!("[at:{},", user_id.as_ref()),
    }
}

impl MessageFilter for MentionsUser {
    fn matches(&self, _event: &ConversationEvent, message: &ChatMessage) -> bool {
        message.content.contains(&self.prefix)
    }
}

/// Matches replies to a message written by the given user.
#[derive(Debug, Clone)]
pub struct QuotesUser {
    user_id: String,
}

pub fn quotes_user(user_id: impl Into<String>) -> QuotesUser {
    QuotesUser { user_id: user_id.into() }
}

impl MessageFilter for QuotesUser {
    fn matches(&self, _event: &ConversationEvent, message: &ChatMessage) -> bool {
        message
            .quote
            .as_ref()
            .and_then(|q| q.id.as_deref())
            .is_some_and(|id| id == self.user_id)
    }
}

/// Case-insensitive keyword match on the normalized content.
#[derive(Debug, Clone)]
pub struct ContainsKeyword {
    keywords: Vec<String>,
}

pub fn contains_keyword<I, S>(keywords: I) -> ContainsKeyword
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ContainsKeyword {
        keywords: keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect(),
    }
}

impl MessageFilter for ContainsKeyword {
    fn matches(&self, _event: &ConversationEvent, message: &ChatMessage) -> bool {
        let content = message.content.to_lowercase();
        self.keywords.iter().any(|k| content.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMessage;

pub fn any_message() -> AnyMessage {
    AnyMessage
}

impl MessageFilter for AnyMessage {
    fn matches(&self, _event: &ConversationEvent, _message: &ChatMessage) -> bool {
        true
    }
}
