// File: persona-common/src/models/event.rs

use std::borrow::Cow;
use serde::{Deserialize, Serialize};

/// One structured piece of an inbound or rendered message.
///
/// Only text and mentions carry meaning for the history; everything else a
/// platform can send (images, faces, files) decodes into `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    Text {
        content: String,
    },
    At {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl ContentNode {
    pub fn text(content: impl Into<String>) -> Self {
        ContentNode::Text { content: content.into() }
    }

    pub fn at(id: impl Into<String>, name: impl Into<String>) -> Self {
        ContentNode::At {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// Who wrote a message. Platforms are allowed to omit either field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Author {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            username: Some(username.into()),
        }
    }
}

/// The bot account the event was received on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
}

/// A message referenced (replied to) by an inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedEvent {
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub elements: Option<Vec<ContentNode>>,
}

/// A conversation event as delivered by the host chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEvent {
    #[serde(default)]
    pub is_direct: bool,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub elements: Option<Vec<ContentNode>>,
    #[serde(default)]
    pub quote: Option<QuotedEvent>,
    #[serde(default)]
    pub bot: BotIdentity,
}

impl ConversationEvent {
    /// A plain-text group message, with the text mirrored as a single node.
    pub fn group_message(
        group_id: impl Into<String>,
        author: Author,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            is_direct: false,
            group_id: Some(group_id.into()),
            author: Some(author),
            elements: Some(vec![ContentNode::text(text.clone())]),
            content: text,
            quote: None,
            bot: BotIdentity::default(),
        }
    }

    /// A plain-text direct (one-to-one) message.
    pub fn direct_message(author: Author, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            is_direct: true,
            group_id: None,
            author: Some(author),
            elements: Some(vec![ContentNode::text(text.clone())]),
            content: text,
            quote: None,
            bot: BotIdentity::default(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<ContentNode>) -> Self {
        self.elements = Some(elements);
        self
    }

    pub fn with_quote(mut self, quote: QuotedEvent) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_bot(mut self, bot: BotIdentity) -> Self {
        self.bot = bot;
        self
    }

    /// The group this event belongs to, or `None` for direct messages and
    /// events that arrived without a group id.
    pub fn group(&self) -> Option<&str> {
        if self.is_direct {
            return None;
        }
        self.group_id.as_deref()
    }

    /// Structured nodes of the event; the raw text stands in as one text node
    /// when the platform sent none.
    pub fn nodes(&self) -> Cow<'_, [ContentNode]> {
        match &self.elements {
            Some(elements) => Cow::Borrowed(elements.as_slice()),
            None => Cow::Owned(vec![ContentNode::text(self.content.clone())]),
        }
    }
}

impl QuotedEvent {
    pub fn nodes(&self) -> Cow<'_, [ContentNode]> {
        match &self.elements {
            Some(elements) => Cow::Borrowed(elements.as_slice()),
            None => Cow::Owned(vec![ContentNode::text(self.content.clone())]),
        }
    }
}
