// src/lib.rs

pub mod collector;
pub mod eventbus;
pub mod services;

pub use collector::MessageCollector;
pub use eventbus::{CollectedMessages, EventBus};
pub use persona_common::Error;
pub use services::CharacterService;
