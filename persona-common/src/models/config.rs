// File: persona-common/src/models/config.rs

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const MAX_MESSAGES_RANGE: RangeInclusive<usize> = 7..=40;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1024..=8072;
pub const MESSAGE_INTERVAL_RANGE: RangeInclusive<u32> = 5..=30;
pub const SLEEP_TIME_RANGE: RangeInclusive<u64> = 100..=5000;
pub const MUTE_TIME_RANGE: RangeInclusive<u64> = 1000..=6_000_000;

/// Options of the character plugin, as the host platform stores them.
///
/// Only `apply_group` and `max_messages` are read by the collector side;
/// the remaining fields are carried for the reply generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterConfig {
    /// Groups the persona is active in.
    pub apply_group: Vec<String>,
    /// Messages kept in memory per group.
    pub max_messages: usize,
    pub disable_chat_hub: bool,

    pub model: String,
    pub max_tokens: u32,

    /// Messages between unprompted replies.
    pub message_interval: u32,
    /// Per-character typing delay in milliseconds.
    pub sleep_time: u64,
    /// How long the persona stays quiet when told to, in milliseconds.
    pub mute_time: u64,

    pub check_prompt_inject: bool,
    pub default_prompt: String,
    pub history_prompt: String,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            apply_group: Vec::new(),
            max_messages: 10,
            disable_chat_hub: true,
            model: String::new(),
            max_tokens: 2048,
            message_interval: 14,
            sleep_time: 440,
            mute_time: 60_000,
            check_prompt_inject: false,
            default_prompt: String::new(),
            history_prompt: String::new(),
        }
    }
}

impl CharacterConfig {
    /// Parse a JSON document; keys that are missing take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let config: CharacterConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), Error> {
        check_range("maxMessages", self.max_messages, &MAX_MESSAGES_RANGE)?;
        check_range("maxTokens", self.max_tokens, &MAX_TOKENS_RANGE)?;
        check_range("messageInterval", self.message_interval, &MESSAGE_INTERVAL_RANGE)?;
        check_range("sleepTime", self.sleep_time, &SLEEP_TIME_RANGE)?;
        check_range("muteTime", self.mute_time, &MUTE_TIME_RANGE)?;
        Ok(())
    }

    pub fn applies_to(&self, group_id: &str) -> bool {
        self.apply_group.iter().any(|g| g == group_id)
    }
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> Result<(), Error>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be within {}..={}, got {}",
            key,
            range.start(),
            range.end(),
            value
        )))
    }
}
