//! Team truth-or-dare party game

pub mod engine;
pub mod roster;
pub mod score;
pub mod session;

pub use engine::{Phase, PhaseKind, PartySnapshot, TimerOutcome, TimerSpec, TurnEngine};
pub use roster::{validate_player_count, Player, Roster, Team, PLAYER_COUNTS};
pub use score::Score;
pub use session::{PartySession, PartyUpdate};
