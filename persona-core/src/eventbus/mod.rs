//! src/eventbus/mod.rs
//!
//! Fans collect notifications out to async consumers (the reply generator)
//! through bounded MPSC queues, one per subscriber.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use persona_common::models::{ChatMessage, ConversationEvent};
use persona_common::traits::CollectObserver;
use persona_common::Error;

/// One collect notification, detached from the collector.
#[derive(Debug, Clone, Serialize)]
pub struct CollectedMessages {
    pub group_id: String,
    pub event: ConversationEvent,
    pub history: Vec<ChatMessage>,
    pub timestamp: DateTime<Utc>,
}

/// Each subscriber gets its own `mpsc::Sender<CollectedMessages>`.
///
/// - Publishing never waits: the collector calls it while locked. If a
///   subscriber's buffer is full the event is dropped for that subscriber.
/// - If the subscriber has dropped the `Receiver`, its sender is pruned.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<CollectedMessages>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 256;

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which collect notifications will be delivered.
    pub fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<CollectedMessages> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Publish to every live subscriber without waiting.
    pub fn publish(&self, collected: CollectedMessages) {
        let mut subs = self.subscribers.lock();
        subs.retain(|s| match s.try_send(collected.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Subscriber queue full; dropping collect event for group '{}'",
                    collected.group_id
                );
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Subscriber went away, removing it");
                false
            }
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectObserver for EventBus {
    fn on_collect(&self, event: &ConversationEvent, history: &[ChatMessage]) -> Result<(), Error> {
        if self.is_shutdown() {
            return Err(Error::Observer("event bus is shut down".to_string()));
        }
        let group_id = event
            .group()
            .ok_or_else(|| Error::Observer("collect event without a group".to_string()))?;
        self.publish(CollectedMessages {
            group_id: group_id.to_string(),
            event: event.clone(),
            history: history.to_vec(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
