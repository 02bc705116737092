//! Solo riddle mode

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use crate::content::{spawn_fetch, Applied, ContentProvider, Delivery, Difficulty, FetchKind, FetchTicket, Riddle};
use crate::error::{GameError, GameResult, GenerationError, RoundError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiddleStatus {
    Loading,
    Ready,
    Failed,
}

/// Result of checking a guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
    /// Nothing was typed
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiddleSnapshot {
    pub status: RiddleStatus,
    pub difficulty: Difficulty,
    pub riddle: Option<Riddle>,
    pub revealed: bool,
    pub feedback: Option<GuessOutcome>,
    pub error: Option<RoundError>,
}

#[derive(Debug, Clone)]
pub struct RiddleEngine {
    status: RiddleStatus,
    difficulty: Difficulty,
    riddle: Option<Riddle>,
    revealed: bool,
    feedback: Option<GuessOutcome>,
    pending: Option<FetchTicket>,
    generation: u64,
    last_error: Option<RoundError>,
}

impl Default for RiddleEngine {
    fn default() -> Self {
        Self {
            status: RiddleStatus::Loading,
            difficulty: Difficulty::default(),
            riddle: None,
            revealed: false,
            feedback: None,
            pending: None,
            generation: 0,
            last_error: None,
        }
    }
}

impl RiddleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a new riddle, replacing the current one.
    ///
    /// Any request still in flight is superseded.
    pub fn request(&mut self, difficulty: Difficulty) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket::new(self.generation, FetchKind::Riddle(difficulty));

        self.difficulty = difficulty;
        self.status = RiddleStatus::Loading;
        self.riddle = None;
        self.revealed = false;
        self.feedback = None;
        self.last_error = None;
        self.pending = Some(ticket);
        debug!(request_id = %ticket.request_id, difficulty = %difficulty, "Riddle requested");
        ticket
    }

    pub fn riddle_ready(&mut self, ticket: FetchTicket, riddle: Riddle) -> Applied {
        if !self.take_pending(&ticket) {
            return Applied::Stale;
        }
        self.riddle = Some(riddle);
        self.status = RiddleStatus::Ready;
        Applied::Accepted
    }

    pub fn riddle_failed(&mut self, ticket: FetchTicket, error: GenerationError) -> Applied {
        if !self.take_pending(&ticket) {
            return Applied::Stale;
        }
        warn!(request_id = %ticket.request_id, error = %error, "Riddle fetch failed");
        self.last_error = Some(RoundError::new(ticket.request_id, "request", error));
        self.status = RiddleStatus::Failed;
        Applied::Failed
    }

    /// Compare a guess with the answer, ignoring case and surrounding space
    pub fn check_guess(&mut self, guess: &str) -> GameResult<GuessOutcome> {
        let riddle = match (&self.riddle, self.status) {
            (Some(riddle), RiddleStatus::Ready) => riddle,
            _ => return Err(self.invalid("check_guess")),
        };
        if self.revealed {
            return Err(GameError::InvalidIntent {
                intent: "check_guess",
                phase: "showing the answer".to_string(),
            });
        }

        let guess = guess.trim();
        let outcome = if guess.is_empty() {
            GuessOutcome::Empty
        } else if guess.to_lowercase() == riddle.answer.trim().to_lowercase() {
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        };

        if outcome == GuessOutcome::Correct {
            self.revealed = true;
        }
        self.feedback = Some(outcome);
        Ok(outcome)
    }

    /// Show the answer
    pub fn reveal(&mut self) -> GameResult<&str> {
        if self.status != RiddleStatus::Ready {
            return Err(self.invalid("reveal"));
        }
        self.revealed = true;
        self.riddle
            .as_ref()
            .map(|r| r.answer.as_str())
            .ok_or_else(|| GameError::InvalidIntent {
                intent: "reveal",
                phase: "loading".to_string(),
            })
    }

    /// Text for sharing the current riddle with friends
    pub fn share_text(&self) -> GameResult<String> {
        match &self.riddle {
            Some(riddle) => Ok(format!(
                "Can you solve this riddle? \"{}\" Try it in Riddle Party!",
                riddle.riddle
            )),
            None => Err(self.invalid("share")),
        }
    }

    pub fn status(&self) -> RiddleStatus {
        self.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn riddle(&self) -> Option<&Riddle> {
        self.riddle.as_ref()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn feedback(&self) -> Option<GuessOutcome> {
        self.feedback
    }

    pub fn last_error(&self) -> Option<&RoundError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> RiddleSnapshot {
        RiddleSnapshot {
            status: self.status,
            difficulty: self.difficulty,
            riddle: self.riddle.clone(),
            revealed: self.revealed,
            feedback: self.feedback,
            error: self.last_error.clone(),
        }
    }

    fn take_pending(&mut self, ticket: &FetchTicket) -> bool {
        if self.pending.as_ref() != Some(ticket) || ticket.generation != self.generation {
            debug!(request_id = %ticket.request_id, "Discarding stale riddle result");
            return false;
        }
        self.pending = None;
        true
    }

    fn invalid(&self, intent: &'static str) -> GameError {
        let phase = match self.status {
            RiddleStatus::Loading => "loading",
            RiddleStatus::Ready => "ready",
            RiddleStatus::Failed => "failed",
        };
        GameError::InvalidIntent {
            intent,
            phase: phase.to_string(),
        }
    }
}

/// Riddle mode bound to a content provider
pub struct RiddleSession<P> {
    engine: RiddleEngine,
    provider: P,
    tx: mpsc::UnboundedSender<Delivery<Riddle>>,
    rx: mpsc::UnboundedReceiver<Delivery<Riddle>>,
}

impl<P> RiddleSession<P>
where
    P: ContentProvider + Clone + 'static,
{
    pub fn new(provider: P) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: RiddleEngine::new(),
            provider,
            tx,
            rx,
        }
    }

    pub fn engine(&self) -> &RiddleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RiddleEngine {
        &mut self.engine
    }

    pub fn request(&mut self, difficulty: Difficulty) -> FetchTicket {
        let ticket = self.engine.request(difficulty);
        let provider = self.provider.clone();
        spawn_fetch(self.tx.clone(), ticket, async move {
            provider.fetch_riddle(difficulty).await
        });
        ticket
    }

    /// Wait for the next riddle result and apply it
    pub async fn next_update(&mut self) -> Applied {
        match self.rx.recv().await {
            Some(Delivery { ticket, result: Ok(riddle) }) => self.engine.riddle_ready(ticket, riddle),
            Some(Delivery { ticket, result: Err(error) }) => self.engine.riddle_failed(ticket, error),
            None => Applied::Stale,
        }
    }
}
