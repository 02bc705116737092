//! Configuration management for the game suite

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use crate::error::GameError;

/// Allowed truth-question durations in seconds
pub const QUESTION_SECONDS: RangeInclusive<u32> = 10..=120;
/// Allowed dare durations in seconds
pub const DARE_SECONDS: RangeInclusive<u32> = 15..=180;
/// Allowed speed-challenge durations in seconds
pub const SPEED_SECONDS: RangeInclusive<u32> = 10..=60;

/// Main configuration for the game suite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyConfig {
    /// Round timer durations
    #[serde(default)]
    pub timers: TimerConfig,
    /// Content source configuration
    #[serde(default)]
    pub content: ContentConfig,
}

/// Round timer durations, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Time the target has to answer a truth question
    pub question_seconds: u32,
    /// Time the target has to perform a chosen dare
    pub dare_seconds: u32,
    /// Length of a speed-challenge round
    pub speed_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            question_seconds: 30,
            dare_seconds: 60,
            speed_seconds: 30,
        }
    }
}

impl TimerConfig {
    /// Validate every duration against its allowed range
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("timers.question_seconds", self.question_seconds, &QUESTION_SECONDS)?;
        check_range("timers.dare_seconds", self.dare_seconds, &DARE_SECONDS)?;
        check_range("timers.speed_seconds", self.speed_seconds, &SPEED_SECONDS)?;
        Ok(())
    }
}

/// Content source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Deck file to draw content from; the built-in deck is used when unset
    pub deck_file: Option<PathBuf>,
    /// Seed for content and target draws; entropy is used when unset
    pub seed: Option<u64>,
}

pub(crate) fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), GameError> {
    if range.contains(&value) {
        return Ok(());
    }

    Err(GameError::Configuration {
        message: format!(
            "{} must be between {} and {} seconds, got {}",
            field,
            range.start(),
            range.end(),
            value
        ),
        field: field.to_string(),
    })
}

impl PartyConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let content = fs::read_to_string(path).map_err(|e| {
            GameError::Configuration {
                message: format!("Failed to read config file: {}", e),
                field: "config_file".to_string(),
            }
        })?;

        let config: PartyConfig = toml::from_str(&content).map_err(|e| {
            GameError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                field: "config_format".to_string(),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GameError> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            GameError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                field: "config_serialization".to_string(),
            }
        })?;

        fs::write(path, content).map_err(|e| {
            GameError::Configuration {
                message: format!("Failed to write config file: {}", e),
                field: "config_write".to_string(),
            }
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), GameError> {
        self.timers.validate()?;

        if let Some(deck) = &self.content.deck_file {
            if deck.as_os_str().is_empty() {
                return Err(GameError::Configuration {
                    message: "Deck file path cannot be empty".to_string(),
                    field: "content.deck_file".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Shortest allowed timers, for fast table play
    pub fn quick() -> Self {
        Self {
            timers: TimerConfig {
                question_seconds: *QUESTION_SECONDS.start(),
                dare_seconds: *DARE_SECONDS.start(),
                speed_seconds: *SPEED_SECONDS.start(),
            },
            content: ContentConfig::default(),
        }
    }
}
