use crate::error::Error;
use crate::models::{ChatMessage, ConversationEvent};

/// Predicate deciding whether a freshly collected message should wake the
/// observers. Filters are OR-combined.
pub trait MessageFilter: Send + Sync {
    fn matches(&self, event: &ConversationEvent, message: &ChatMessage) -> bool;
}

impl<F> MessageFilter for F
where
    F: Fn(&ConversationEvent, &ChatMessage) -> bool + Send + Sync,
{
    fn matches(&self, event: &ConversationEvent, message: &ChatMessage) -> bool {
        self(event, message)
    }
}

/// Receives the triggering event together with the group's history at the
/// moment the message was collected (oldest first).
///
/// Called synchronously while the collector is locked, so implementations
/// must not block. Hand the payload off to a task or channel instead.
pub trait CollectObserver: Send + Sync {
    fn on_collect(&self, event: &ConversationEvent, history: &[ChatMessage]) -> Result<(), Error>;
}

impl<F> CollectObserver for F
where
    F: Fn(&ConversationEvent, &[ChatMessage]) -> Result<(), Error> + Send + Sync,
{
    fn on_collect(&self, event: &ConversationEvent, history: &[ChatMessage]) -> Result<(), Error> {
        self(event, history)
    }
}
