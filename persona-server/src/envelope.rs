// File: persona-server/src/envelope.rs

use serde::Deserialize;
use tracing::debug;

use persona_common::models::{ContentNode, ConversationEvent};
use persona_core::CharacterService;

/// One line of the stdin protocol.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Envelope {
    /// A message someone else posted.
    Incoming { event: ConversationEvent },
    /// A line the bot sent; `elements` default to the event's own nodes.
    Outgoing {
        event: ConversationEvent,
        #[serde(default)]
        elements: Option<Vec<ContentNode>>,
    },
}

impl Envelope {
    pub async fn dispatch(self, service: &CharacterService) {
        match self {
            Envelope::Incoming { event } => {
                if !service.handle_message(&event).await {
                    debug!("Incoming event not collected (group={:?})", event.group_id);
                }
            }
            Envelope::Outgoing { event, elements } => {
                let elements = match elements {
                    Some(elements) => elements,
                    None => event.nodes().into_owned(),
                };
                service.handle_outgoing(&event, &elements).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_common::models::CharacterConfig;

    fn service() -> CharacterService {
        CharacterService::new(CharacterConfig {
            apply_group: vec!["g1".into()],
            ..CharacterConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_incoming_line_is_collected() {
        let line = r#"{"kind":"incoming","event":{"groupId":"g1","author":{"id":"1","username":"a"},"content":"hi"}}"#;
        let envelope: Envelope = serde_json::from_str(line).unwrap();
        let service = service();
        envelope.dispatch(&service).await;

        let history = service.collector().get_history("g1").await.unwrap();
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[0].name.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_outgoing_line_without_elements_uses_event_nodes() {
        let line = r#"{"kind":"outgoing","event":{"groupId":"g9","content":"on my way","bot":{"username":"persona"}}}"#;
        let envelope: Envelope = serde_json::from_str(line).unwrap();
        let service = service();
        envelope.dispatch(&service).await;

        // the bot's own lines are recorded outside applyGroup too
        let history = service.collector().get_history("g9").await.unwrap();
        assert_eq!(history[0].content, "on my way");
        assert_eq!(history[0].id.as_deref(), Some("0"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let line = r#"{"kind":"typing","event":{}}"#;
        assert!(serde_json::from_str::<Envelope>(line).is_err());
    }
}
