//! Error types for the riddle-party game suite

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure to obtain generated round content.
///
/// This is the only error kind a content fetch can surface. Engines catch it
/// at their boundary, record it as a [`RoundError`] and fall back to their
/// last stable state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GenerationError {
    #[error("Content source unreachable: {message}")]
    Network { message: String },

    #[error("Malformed content payload: {message}")]
    Malformed { message: String },

    #[error("Content does not match the expected schema: {message}")]
    SchemaMismatch { message: String },

    #[error("No {pool} content available")]
    EmptyPool { pool: String },
}

impl GenerationError {
    pub fn network(message: impl Into<String>) -> Self {
        GenerationError::Network { message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        GenerationError::Malformed { message: message.into() }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        GenerationError::SchemaMismatch { message: message.into() }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Malformed {
            message: err.to_string(),
        }
    }
}

/// Main error type for the game engines
#[derive(Debug, Clone, Error)]
pub enum GameError {
    #[error("Content generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Intent '{intent}' is not valid while {phase}")]
    InvalidIntent {
        intent: &'static str,
        phase: String,
    },

    #[error("Invalid player count {0}: must be even and between 2 and 10")]
    InvalidPlayerCount(usize),

    #[error("Player name at slot {index} is blank")]
    BlankName { index: usize },

    #[error("Name slot {index} does not exist (roster has {slots} slots)")]
    NameIndexOutOfRange { index: usize, slots: usize },

    #[error("Dare option {0} does not exist")]
    InvalidDareIndex(usize),

    #[error("Roster invariant violated: {asking} has no opponents to target")]
    NoOpponents { asking: String },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: String,
    },

    #[error("Settings store error: {0}")]
    Settings(String),

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Record of the last content failure, kept on engine snapshots so the
/// presentation layer can offer a manual retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundError {
    pub request_id: Uuid,
    pub intent: String,
    pub error: GenerationError,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl RoundError {
    pub fn new(request_id: Uuid, intent: &str, error: GenerationError) -> Self {
        Self {
            request_id,
            intent: intent.to_string(),
            error,
            occurred_at: chrono::Utc::now(),
        }
    }

    /// Human readable message for display
    pub fn message(&self) -> String {
        format!("{} failed: {}", self.intent, self.error)
    }
}

/// Type alias for the main result type used throughout the library
pub type GameResult<T> = Result<T, GameError>;

/// Logging configuration and initialization
pub mod logging {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    use std::env;

    /// Logging output format
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LogFormat {
        Human,
        Json,
    }

    /// Logging output destination
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LogOutput {
        Stdout,
        Stderr,
    }

    /// Logging configuration
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        pub level: Level,
        pub format: LogFormat,
        pub output: LogOutput,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                format: LogFormat::Human,
                output: LogOutput::Stderr,
            }
        }
    }

    impl LoggingConfig {
        /// Build a configuration from `RIDDLE_PARTY_LOG_*` variables
        pub fn from_env() -> Self {
            let level = env::var("RIDDLE_PARTY_LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse::<Level>()
                .unwrap_or(Level::INFO);

            let format = match env::var("RIDDLE_PARTY_LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Human,
            };

            // The REPL owns stdout, so logs default to stderr
            let output = match env::var("RIDDLE_PARTY_LOG_OUTPUT").as_deref() {
                Ok("stdout") => LogOutput::Stdout,
                _ => LogOutput::Stderr,
            };

            Self { level, format, output }
        }
    }

    /// Initialize structured logging with the given configuration
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = EnvFilter::builder()
            .with_default_directive(config.level.into())
            .from_env_lossy()
            .add_directive("tokio=info".parse()?);

        let registry = tracing_subscriber::registry()
            .with(env_filter);

        match config.format {
            LogFormat::Human => {
                let fmt_layer = fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true);

                match config.output {
                    LogOutput::Stdout => registry.with(fmt_layer.with_writer(std::io::stdout)).try_init()?,
                    LogOutput::Stderr => registry.with(fmt_layer.with_writer(std::io::stderr)).try_init()?,
                }
            }
            LogFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(fmt::format::FmtSpan::CLOSE);

                match config.output {
                    LogOutput::Stdout => registry.with(fmt_layer.with_writer(std::io::stdout)).try_init()?,
                    LogOutput::Stderr => registry.with(fmt_layer.with_writer(std::io::stderr)).try_init()?,
                }
            }
        }

        Ok(())
    }

    /// Initialize logging with environment-based configuration
    pub fn init_from_env() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        init_logging(LoggingConfig::from_env())
    }
}
