//! Speed-naming challenge
//!
//! A category is fetched, then the players race the clock naming things that
//! belong to it. There is no roster and no score.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use crate::config::{check_range, SPEED_SECONDS};
use crate::content::{spawn_fetch, Applied, ContentProvider, Delivery, FetchKind, FetchTicket};
use crate::error::{GameError, GameResult, GenerationError, RoundError};
use crate::timer::{CountdownEvent, CountdownTimer, TimerSignal, Urgency};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedPhase {
    Idle,
    Loading { ticket: FetchTicket },
    Playing { category: String },
    Finished { category: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSnapshot {
    pub phase: SpeedPhase,
    pub duration: u32,
    pub error: Option<RoundError>,
    pub generation: u64,
}

/// Speed challenge state machine
#[derive(Debug, Clone)]
pub struct SpeedEngine {
    phase: SpeedPhase,
    duration: u32,
    generation: u64,
    last_error: Option<RoundError>,
}

impl Default for SpeedEngine {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SpeedEngine {
    pub fn new(duration: u32) -> Self {
        Self {
            phase: SpeedPhase::Idle,
            duration,
            generation: 0,
            last_error: None,
        }
    }

    /// Change the round length, 10 to 60 seconds
    pub fn set_duration(&mut self, seconds: u32) -> GameResult<()> {
        check_range("timers.speed_seconds", seconds, &SPEED_SECONDS)?;
        self.duration = seconds;
        Ok(())
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Request a category
    pub fn start(&mut self) -> GameResult<FetchTicket> {
        if self.phase != SpeedPhase::Idle {
            return Err(self.invalid("start"));
        }

        self.generation += 1;
        let ticket = FetchTicket::new(self.generation, FetchKind::SpeedCategory);
        self.last_error = None;
        self.phase = SpeedPhase::Loading { ticket };
        debug!(request_id = %ticket.request_id, generation = self.generation, "Speed category requested");
        Ok(ticket)
    }

    /// Start playing with the fetched category; the round timer belongs to
    /// the generation current afterwards
    pub fn category_ready(&mut self, ticket: FetchTicket, category: String) -> Applied {
        if !self.is_pending(&ticket) {
            debug!(request_id = %ticket.request_id, "Discarding stale category");
            return Applied::Stale;
        }

        self.generation += 1;
        info!(category = %category, seconds = self.duration, "Speed round started");
        self.phase = SpeedPhase::Playing { category };
        Applied::Accepted
    }

    pub fn category_failed(&mut self, ticket: FetchTicket, error: GenerationError) -> Applied {
        if !self.is_pending(&ticket) {
            return Applied::Stale;
        }

        warn!(request_id = %ticket.request_id, error = %error, "Speed category fetch failed");
        self.last_error = Some(RoundError::new(ticket.request_id, "start", error));
        self.generation += 1;
        self.phase = SpeedPhase::Idle;
        Applied::Failed
    }

    /// The round timer ran out; returns false for a stale timer
    pub fn time_up(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match std::mem::replace(&mut self.phase, SpeedPhase::Idle) {
            SpeedPhase::Playing { category } => {
                self.generation += 1;
                debug!(category = %category, "Speed round finished");
                self.phase = SpeedPhase::Finished { category };
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    pub fn play_again(&mut self) -> GameResult<()> {
        match self.phase {
            SpeedPhase::Finished { .. } => {
                self.phase = SpeedPhase::Idle;
                self.generation += 1;
                Ok(())
            }
            _ => Err(self.invalid("play_again")),
        }
    }

    /// Abandon whatever is in progress
    pub fn reset(&mut self) {
        self.phase = SpeedPhase::Idle;
        self.last_error = None;
        self.generation += 1;
    }

    pub fn phase(&self) -> &SpeedPhase {
        &self.phase
    }

    pub fn category(&self) -> Option<&str> {
        match &self.phase {
            SpeedPhase::Playing { category } | SpeedPhase::Finished { category } => Some(category),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, SpeedPhase::Playing { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&RoundError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> SpeedSnapshot {
        SpeedSnapshot {
            phase: self.phase.clone(),
            duration: self.duration,
            error: self.last_error.clone(),
            generation: self.generation,
        }
    }

    fn is_pending(&self, ticket: &FetchTicket) -> bool {
        matches!(&self.phase, SpeedPhase::Loading { ticket: pending } if pending == ticket)
            && ticket.generation == self.generation
    }

    fn invalid(&self, intent: &'static str) -> GameError {
        let phase = match self.phase {
            SpeedPhase::Idle => "idle",
            SpeedPhase::Loading { .. } => "loading a category",
            SpeedPhase::Playing { .. } => "playing",
            SpeedPhase::Finished { .. } => "finished",
        };
        GameError::InvalidIntent {
            intent,
            phase: phase.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeedUpdate {
    /// The category arrived and the clock is running
    Started(String),
    Failed(String),
    Tick { remaining: u32, duration: u32, urgency: Urgency },
    TimeUp,
    Discarded,
}

/// Speed challenge bound to a content provider and a countdown
pub struct SpeedSession<P> {
    engine: SpeedEngine,
    provider: P,
    timer: CountdownTimer,
    timer_rx: mpsc::UnboundedReceiver<TimerSignal>,
    content_tx: mpsc::UnboundedSender<Delivery<String>>,
    content_rx: mpsc::UnboundedReceiver<Delivery<String>>,
}

impl<P> SpeedSession<P>
where
    P: ContentProvider + Clone + 'static,
{
    pub fn new(provider: P, engine: SpeedEngine) -> Self {
        let (timer, timer_rx) = CountdownTimer::channel();
        let (content_tx, content_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            provider,
            timer,
            timer_rx,
            content_tx,
            content_rx,
        }
    }

    pub fn engine(&self) -> &SpeedEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> SpeedSnapshot {
        self.engine.snapshot()
    }

    pub fn set_duration(&mut self, seconds: u32) -> GameResult<()> {
        self.engine.set_duration(seconds)
    }

    pub fn start(&mut self) -> GameResult<FetchTicket> {
        let ticket = self.engine.start()?;
        let provider = self.provider.clone();
        spawn_fetch(self.content_tx.clone(), ticket, async move {
            provider.fetch_speed_category().await
        });
        Ok(ticket)
    }

    pub fn play_again(&mut self) -> GameResult<()> {
        self.engine.play_again()
    }

    pub fn reset(&mut self) {
        self.timer.cancel();
        self.engine.reset();
    }

    /// Wait for the next category or timer signal and apply it
    pub async fn next_update(&mut self) -> SpeedUpdate {
        tokio::select! {
            Some(delivery) = self.content_rx.recv() => self.apply_delivery(delivery),
            Some(signal) = self.timer_rx.recv() => self.apply_signal(signal),
        }
    }

    fn apply_delivery(&mut self, delivery: Delivery<String>) -> SpeedUpdate {
        let Delivery { ticket, result } = delivery;
        match result {
            Ok(category) => match self.engine.category_ready(ticket, category) {
                Applied::Accepted => {
                    self.timer.start(self.engine.duration(), self.engine.generation());
                    SpeedUpdate::Started(self.engine.category().unwrap_or_default().to_string())
                }
                _ => SpeedUpdate::Discarded,
            },
            Err(error) => match self.engine.category_failed(ticket, error) {
                Applied::Failed => SpeedUpdate::Failed(
                    self.engine.last_error().map(|e| e.message()).unwrap_or_default(),
                ),
                _ => SpeedUpdate::Discarded,
            },
        }
    }

    fn apply_signal(&mut self, signal: TimerSignal) -> SpeedUpdate {
        if !self.timer.accept(&signal) {
            trace!(epoch = signal.epoch, "Dropping signal from superseded countdown");
            return SpeedUpdate::Discarded;
        }

        match signal.event {
            CountdownEvent::Tick { remaining } => SpeedUpdate::Tick {
                remaining,
                duration: signal.duration,
                urgency: Urgency::from_progress(remaining as f32 / signal.duration.max(1) as f32),
            },
            CountdownEvent::Completed => {
                self.timer.finish(&signal);
                if self.engine.time_up(signal.tag) {
                    SpeedUpdate::TimeUp
                } else {
                    SpeedUpdate::Discarded
                }
            }
        }
    }
}
