pub mod collector_traits;

pub use collector_traits::{CollectObserver, MessageFilter};
