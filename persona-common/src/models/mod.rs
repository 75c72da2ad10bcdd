// File: persona-common/src/models/mod.rs
pub mod config;
pub mod event;
pub mod message;

pub use config::CharacterConfig;
pub use event::{Author, BotIdentity, ContentNode, ConversationEvent, QuotedEvent};
pub use message::{ChatMessage, QuotedMessage};
