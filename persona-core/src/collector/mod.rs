//! src/collector/mod.rs
//!
//! Per-group bounded chat history. Every mutation goes through one
//! collector-wide async mutex, so appends, evictions and the notifications
//! they trigger are never interleaved between concurrent events.

pub mod filters;
pub mod normalize;

use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use persona_common::models::{ChatMessage, ContentNode, ConversationEvent, QuotedEvent, QuotedMessage};
use persona_common::traits::{CollectObserver, MessageFilter};
use persona_common::Error;

pub use normalize::normalize_content;

/// Author id used for the bot's own lines when the platform reports none.
pub const FALLBACK_BOT_ID: &str = "0";

pub struct MessageCollector {
    max_messages: usize,
    histories: Mutex<HashMap<String, VecDeque<ChatMessage>>>,
    filters: RwLock<Vec<Arc<dyn MessageFilter>>>,
    observers: RwLock<Vec<Arc<dyn CollectObserver>>>,
}

impl MessageCollector {
    pub fn new(max_messages: usize) -> Self {
        info!("MessageCollector::new() max_messages={}", max_messages);
        Self {
            max_messages,
            histories: Mutex::new(HashMap::new()),
            filters: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Register a predicate closure. Filters are never de-duplicated.
    pub fn register_filter<F>(&self, filter: F)
    where
        F: Fn(&ConversationEvent, &ChatMessage) -> bool + Send + Sync + 'static,
    {
        self.add_filter(Arc::new(filter));
    }

    pub fn add_filter(&self, filter: Arc<dyn MessageFilter>) {
        self.filters.write().push(filter);
    }

    /// Register an observer closure, called once per notification.
    pub fn on_collect<F>(&self, observer: F)
    where
        F: Fn(&ConversationEvent, &[ChatMessage]) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.add_observer(Arc::new(observer));
    }

    pub fn add_observer(&self, observer: Arc<dyn CollectObserver>) {
        self.observers.write().push(observer);
    }

    /// Records a message written by someone else and notifies the observers
    /// if any filter accepts it.
    pub async fn record_incoming(&self, event: &ConversationEvent) {
        let Some(group_id) = event.group() else {
            debug!("record_incoming: not a group event, skipping");
            return;
        };

        let content = normalize_content(&event.content, &event.nodes());
        if content.is_empty() {
            debug!("record_incoming: empty content in group '{}', skipping", group_id);
            return;
        }

        let author = event.author.as_ref();
        let message = ChatMessage::new(
            content,
            author.and_then(|a| a.username.clone()),
            author.and_then(|a| a.id.clone()),
        )
        .with_quote(event.quote.as_ref().map(quoted_message));

        let mut histories = self.histories.lock().await;
        let history = histories.entry(group_id.to_string()).or_default();
        push_bounded(history, message.clone(), self.max_messages);
        debug!(
            "record_incoming: group='{}' author={:?} len={}",
            group_id,
            message.id,
            history.len()
        );

        if !self.any_filter_matches(event, &message) {
            return;
        }

        let snapshot: Vec<ChatMessage> = history.iter().cloned().collect();
        self.notify(event, &snapshot);
    }

    /// Records a line the bot itself sent. Never notifies.
    pub async fn record_outgoing(&self, event: &ConversationEvent, elements: &[ContentNode]) {
        let Some(group_id) = event.group() else {
            debug!("record_outgoing: not a group event, skipping");
            return;
        };

        let content = normalize_content(&event.content, elements);
        if content.is_empty() {
            debug!("record_outgoing: empty content in group '{}', skipping", group_id);
            return;
        }

        let message = ChatMessage::new(
            content,
            Some(event.bot.username.clone()),
            Some(event.bot.id.clone().unwrap_or_else(|| FALLBACK_BOT_ID.to_string())),
        );

        let mut histories = self.histories.lock().await;
        let history = histories.entry(group_id.to_string()).or_default();
        push_bounded(history, message, self.max_messages);
        debug!("record_outgoing: group='{}' len={}", group_id, history.len());
    }

    /// Snapshot of a group's history, oldest first. `None` until the group
    /// has seen its first message (or after a global `clear`).
    pub async fn get_history(&self, group_id: &str) -> Option<Vec<ChatMessage>> {
        let histories = self.histories.lock().await;
        histories
            .get(group_id)
            .map(|history| history.iter().cloned().collect())
    }

    /// Empties one group's history, or every group's when `group_id` is `None`.
    pub async fn clear(&self, group_id: Option<&str>) {
        let mut histories = self.histories.lock().await;
        match group_id {
            Some(id) => {
                info!("Clearing history of group '{}'", id);
                histories.insert(id.to_string(), VecDeque::new());
            }
            None => {
                info!("Clearing history of all {} groups", histories.len());
                histories.clear();
            }
        }
    }

    fn any_filter_matches(&self, event: &ConversationEvent, message: &ChatMessage) -> bool {
        let filters = self.filters.read().clone();
        filters.iter().enumerate().any(|(idx, filter)| {
            match catch_unwind(AssertUnwindSafe(|| filter.matches(event, message))) {
                Ok(matched) => matched,
                Err(_) => {
                    error!("Filter #{} panicked; treating it as not matching", idx);
                    false
                }
            }
        })
    }

    fn notify(&self, event: &ConversationEvent, history: &[ChatMessage]) {
        let observers = self.observers.read().clone();
        for (idx, observer) in observers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| observer.on_collect(event, history))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Collect observer #{} failed: {}", idx, e),
                Err(_) => error!("Collect observer #{} panicked", idx),
            }
        }
    }
}

fn quoted_message(quote: &QuotedEvent) -> QuotedMessage {
    let author = quote.author.as_ref();
    QuotedMessage {
        content: normalize_content(&quote.content, &quote.nodes()),
        name: author.and_then(|a| a.username.clone()),
        id: author.and_then(|a| a.id.clone()),
    }
}

fn push_bounded(history: &mut VecDeque<ChatMessage>, message: ChatMessage, max_messages: usize) {
    history.push_back(message);
    while history.len() > max_messages {
        history.pop_front();
    }
}
