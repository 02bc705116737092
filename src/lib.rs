//! Riddle Party - a truth-or-dare, riddle and speed-challenge party game suite
//!
//! The game modes are synchronous state machines driven by player intents:
//! - [`party::TurnEngine`] runs the team truth-or-dare game
//! - [`speed::SpeedEngine`] runs the speed-naming challenge
//! - [`riddle::RiddleEngine`] runs solo riddles
//!
//! Content comes from an injectable [`content::ContentProvider`]. Sessions
//! join an engine with a provider and a [`timer::CountdownTimer`] on the
//! tokio runtime, discarding results that arrive for abandoned rounds.

pub mod config;
pub mod content;
pub mod error;
pub mod party;
pub mod riddle;
pub mod settings;
pub mod speed;
pub mod timer;

// Re-export commonly used types for convenience
pub use error::{GameError, GameResult, GenerationError, RoundError};

pub use config::{ContentConfig, PartyConfig, TimerConfig};

pub use content::{
    Applied, ContentProvider, DareOptions, Deck, DeckProvider, Difficulty, FetchKind, FetchTicket,
    Riddle, RoundContent,
};

pub use party::{PartySession, PartySnapshot, PartyUpdate, PhaseKind, Player, Roster, Score, Team, TurnEngine};

pub use riddle::{GuessOutcome, RiddleEngine, RiddleSession};

pub use speed::{SpeedEngine, SpeedSession, SpeedUpdate};

pub use settings::{FileStore, MemoryStore, Preferences, SettingsStore};

pub use timer::{Countdown, CountdownTimer, Urgency};
