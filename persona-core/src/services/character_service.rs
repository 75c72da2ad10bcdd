use std::sync::Arc;

use tracing::{debug, info};

use persona_common::models::{CharacterConfig, ContentNode, ConversationEvent};
use persona_common::Error;

use crate::collector::MessageCollector;
use crate::eventbus::EventBus;

/// Entry point the host platform feeds chat events into.
///
/// Owns the collector for the lifetime of the process and wires the event
/// bus in as its first observer.
pub struct CharacterService {
    config: CharacterConfig,
    collector: Arc<MessageCollector>,
    event_bus: EventBus,
}

impl CharacterService {
    pub fn new(config: CharacterConfig) -> Result<Self, Error> {
        config.validate()?;
        info!(
            "CharacterService::new() groups={:?} max_messages={}",
            config.apply_group, config.max_messages
        );

        let collector = Arc::new(MessageCollector::new(config.max_messages));
        let event_bus = EventBus::new();
        collector.add_observer(Arc::new(event_bus.clone()));

        Ok(Self {
            config,
            collector,
            event_bus,
        })
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    pub fn collector(&self) -> Arc<MessageCollector> {
        self.collector.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Forwards a third-party message to the collector when it comes from
    /// one of the configured groups. Returns whether it was forwarded.
    pub async fn handle_message(&self, event: &ConversationEvent) -> bool {
        let Some(group_id) = event.group() else {
            return false;
        };
        if !self.config.applies_to(group_id) {
            debug!("Group '{}' is not in applyGroup, ignoring", group_id);
            return false;
        }
        self.collector.record_incoming(event).await;
        true
    }

    /// Records a line the bot sent in reply to `event`.
    pub async fn handle_outgoing(&self, event: &ConversationEvent, elements: &[ContentNode]) {
        self.collector.record_outgoing(event, elements).await;
    }
}
