//! Generated round content and the provider boundary
//!
//! Engines never call a provider directly. They issue a [`FetchTicket`] for
//! each request and sessions run the fetch, then hand the result back
//! together with the ticket. The ticket carries the generation it was issued
//! under so that results arriving after a reset or a newer request are
//! discarded instead of resurrecting an abandoned round.

pub mod deck;
pub mod parse;

pub use deck::{Deck, DeckProvider, RiddlePools};
pub use parse::{clean_category, parse_dares, parse_riddle};

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;
use crate::error::GenerationError;

/// Number of dare options offered per dare round
pub const DARE_OPTION_COUNT: usize = 3;

/// Riddle difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// A riddle and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Riddle {
    pub riddle: String,
    pub answer: String,
}

/// Exactly three dare options, in the order they were generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DareOptions([String; DARE_OPTION_COUNT]);

impl DareOptions {
    /// Build dare options from a generated list.
    ///
    /// Extra options are dropped and short lists are filled by repeating the
    /// options already present. An empty list or a blank option is a schema
    /// mismatch.
    pub fn from_options(options: Vec<String>) -> Result<Self, GenerationError> {
        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();

        if options.is_empty() {
            return Err(GenerationError::schema("expected at least one dare option"));
        }
        if let Some(index) = options.iter().position(|o| o.is_empty()) {
            return Err(GenerationError::schema(format!("dare option {} is blank", index)));
        }

        let slots: [String; DARE_OPTION_COUNT] =
            std::array::from_fn(|i| options[i % options.len()].clone());
        Ok(Self(slots))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Content for the active round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoundContent {
    /// A truth question or a speed-challenge category
    Text(String),
    /// Dare options for a declined question
    Dares(DareOptions),
}

/// What a fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Riddle(Difficulty),
    TruthQuestion,
    DareOptions,
    SpeedCategory,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::Riddle(difficulty) => write!(f, "{} riddle", difficulty),
            FetchKind::TruthQuestion => f.write_str("truth question"),
            FetchKind::DareOptions => f.write_str("dare options"),
            FetchKind::SpeedCategory => f.write_str("speed category"),
        }
    }
}

/// Receipt for an outstanding content request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket {
    pub generation: u64,
    pub request_id: Uuid,
    pub kind: FetchKind,
}

impl FetchTicket {
    pub fn new(generation: u64, kind: FetchKind) -> Self {
        Self {
            generation,
            request_id: Uuid::new_v4(),
            kind,
        }
    }
}

/// Result of feeding an asynchronous outcome back into an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The outcome moved the engine forward
    Accepted,
    /// The outcome was a failure and the engine fell back to its stable state
    Failed,
    /// The outcome belonged to an abandoned request and was ignored
    Stale,
}

/// A finished fetch on its way back to the session that issued it
#[derive(Debug)]
pub struct Delivery<T> {
    pub ticket: FetchTicket,
    pub result: Result<T, GenerationError>,
}

/// Source of generated game content.
///
/// Each operation is independently fallible. Implementations must not retry
/// on their own; a failed fetch surfaces to the player who decides whether
/// to try again.
pub trait ContentProvider: Send + Sync {
    /// Fetch a riddle of the given difficulty
    fn fetch_riddle(&self, difficulty: Difficulty)
        -> impl Future<Output = Result<Riddle, GenerationError>> + Send;

    /// Fetch one truth question
    fn fetch_truth_question(&self) -> impl Future<Output = Result<String, GenerationError>> + Send;

    /// Fetch three dare options
    fn fetch_dare_options(&self) -> impl Future<Output = Result<DareOptions, GenerationError>> + Send;

    /// Fetch a speed-challenge category, without surrounding quotes
    fn fetch_speed_category(&self) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Run a fetch on the runtime and post its result to `tx`
pub(crate) fn spawn_fetch<T, F>(tx: mpsc::UnboundedSender<Delivery<T>>, ticket: FetchTicket, fetch: F)
where
    T: Send + 'static,
    F: Future<Output = Result<T, GenerationError>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = fetch.await;
        if tx.send(Delivery { ticket, result }).is_err() {
            tracing::debug!(request_id = %ticket.request_id, "Session dropped before fetch completed");
        }
    });
}
