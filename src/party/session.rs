//! Async driver for the party game
//!
//! A [`PartySession`] owns a [`TurnEngine`], a content provider and one
//! [`CountdownTimer`]. Intents are plain method calls; fetches run on the
//! runtime and their results, along with timer signals, are applied one at a
//! time through [`PartySession::next_update`].

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use crate::config::TimerConfig;
use crate::content::{spawn_fetch, Applied, ContentProvider, Delivery, FetchKind, FetchTicket, RoundContent};
use crate::error::GameResult;
use crate::timer::{CountdownEvent, CountdownTimer, TimerSignal, Urgency};
use super::engine::{PartySnapshot, PhaseKind, TimerOutcome, TurnEngine};
use super::roster::Roster;

/// Something that happened while the session was waiting
#[derive(Debug, Clone, PartialEq)]
pub enum PartyUpdate {
    /// Requested content arrived and the round moved on
    ContentApplied(PhaseKind),
    /// A fetch failed; the engine is back in `Idle` with an error recorded
    ContentFailed(String),
    /// The round timer ticked
    Tick { remaining: u32, duration: u32, urgency: Urgency },
    /// The question timer ran out and dare options were requested
    QuestionTimedOut,
    /// The dare timer ran out and the turn passed
    DareTimedOut,
    /// A result from an abandoned round was discarded
    Discarded,
}

/// Party game bound to a content provider and a countdown
pub struct PartySession<P, R = ChaCha8Rng> {
    engine: TurnEngine<R>,
    provider: P,
    timer: CountdownTimer,
    timer_rx: mpsc::UnboundedReceiver<TimerSignal>,
    content_tx: mpsc::UnboundedSender<Delivery<RoundContent>>,
    content_rx: mpsc::UnboundedReceiver<Delivery<RoundContent>>,
    remaining: Option<u32>,
}

impl<P> PartySession<P, ChaCha8Rng>
where
    P: ContentProvider + Clone + 'static,
{
    /// Session with a deterministic target sequence
    pub fn seeded(provider: P, timers: TimerConfig, seed: u64) -> Self {
        Self::new(provider, TurnEngine::seeded(timers, seed))
    }
}

impl<P, R> PartySession<P, R>
where
    P: ContentProvider + Clone + 'static,
    R: Rng,
{
    pub fn new(provider: P, engine: TurnEngine<R>) -> Self {
        let (timer, timer_rx) = CountdownTimer::channel();
        let (content_tx, content_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            provider,
            timer,
            timer_rx,
            content_tx,
            content_rx,
            remaining: None,
        }
    }

    pub fn engine(&self) -> &TurnEngine<R> {
        &self.engine
    }

    pub fn snapshot(&self) -> PartySnapshot {
        self.engine.snapshot()
    }

    /// Seconds left on the running countdown
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn set_timers(&mut self, timers: TimerConfig) -> GameResult<()> {
        self.engine.set_timers(timers)
    }

    // ----- intents -----

    pub fn choose_player_count(&mut self, count: usize) -> GameResult<()> {
        self.engine.choose_player_count(count)
    }

    pub fn set_name(&mut self, index: usize, name: &str) -> GameResult<()> {
        self.engine.set_name(index, name)
    }

    pub fn start_game(&mut self) -> GameResult<()> {
        self.engine.start_game()
    }

    pub fn submit_names<S: AsRef<str>>(&mut self, names: &[S]) -> GameResult<()> {
        self.engine.submit_names(names)
    }

    pub fn start_with_roster(&mut self, roster: Roster) -> GameResult<()> {
        self.engine.start_with_roster(roster)
    }

    pub fn ask_question(&mut self) -> GameResult<FetchTicket> {
        let ticket = self.engine.ask_question()?;
        self.dispatch(ticket);
        self.sync_timer();
        Ok(ticket)
    }

    pub fn answered(&mut self) -> GameResult<()> {
        self.engine.answered()?;
        self.sync_timer();
        Ok(())
    }

    pub fn declined(&mut self) -> GameResult<FetchTicket> {
        let ticket = self.engine.declined()?;
        self.sync_timer();
        self.dispatch(ticket);
        Ok(ticket)
    }

    pub fn select_dare(&mut self, index: usize) -> GameResult<()> {
        self.engine.select_dare(index)
    }

    pub fn start_dare_timer(&mut self) -> GameResult<()> {
        self.engine.start_dare_timer()?;
        self.sync_timer();
        Ok(())
    }

    pub fn advance_turn(&mut self) -> GameResult<()> {
        self.engine.advance_turn()?;
        self.sync_timer();
        Ok(())
    }

    /// Go back to setup; results of in-flight fetches will be discarded
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.remaining = None;
        self.engine.reset();
    }

    // ----- event loop -----

    /// Wait for the next fetch result or timer signal and apply it.
    ///
    /// Cancel safe: nothing is applied until a message has been received.
    pub async fn next_update(&mut self) -> PartyUpdate {
        tokio::select! {
            Some(delivery) = self.content_rx.recv() => self.apply_delivery(delivery),
            Some(signal) = self.timer_rx.recv() => self.apply_signal(signal),
        }
    }

    fn apply_delivery(&mut self, delivery: Delivery<RoundContent>) -> PartyUpdate {
        let Delivery { ticket, result } = delivery;
        let applied = match result {
            Ok(content) => self.engine.content_ready(ticket, content),
            Err(error) => self.engine.content_failed(ticket, error),
        };
        self.sync_timer();

        match applied {
            Applied::Accepted => PartyUpdate::ContentApplied(self.engine.phase_kind()),
            Applied::Failed => PartyUpdate::ContentFailed(
                self.engine
                    .last_error()
                    .map(|e| e.message())
                    .unwrap_or_default(),
            ),
            Applied::Stale => PartyUpdate::Discarded,
        }
    }

    fn apply_signal(&mut self, signal: TimerSignal) -> PartyUpdate {
        if !self.timer.accept(&signal) {
            trace!(epoch = signal.epoch, "Dropping signal from superseded countdown");
            return PartyUpdate::Discarded;
        }

        match signal.event {
            CountdownEvent::Tick { remaining } => {
                self.remaining = Some(remaining);
                let progress = if signal.duration == 0 {
                    0.0
                } else {
                    remaining as f32 / signal.duration as f32
                };
                PartyUpdate::Tick {
                    remaining,
                    duration: signal.duration,
                    urgency: Urgency::from_progress(progress),
                }
            }
            CountdownEvent::Completed => {
                self.timer.finish(&signal);
                self.remaining = None;

                let update = match self.engine.timer_elapsed(signal.tag) {
                    TimerOutcome::DareRequested(ticket) => {
                        self.dispatch(ticket);
                        PartyUpdate::QuestionTimedOut
                    }
                    TimerOutcome::TurnAdvanced => PartyUpdate::DareTimedOut,
                    TimerOutcome::Stale => PartyUpdate::Discarded,
                };
                self.sync_timer();
                update
            }
        }
    }

    /// Run the fetch a ticket asks for
    fn dispatch(&self, ticket: FetchTicket) {
        let provider = self.provider.clone();
        let tx = self.content_tx.clone();
        debug!(request_id = %ticket.request_id, kind = %ticket.kind, "Dispatching fetch");

        match ticket.kind {
            FetchKind::TruthQuestion => spawn_fetch(tx, ticket, async move {
                provider.fetch_truth_question().await.map(RoundContent::Text)
            }),
            FetchKind::DareOptions => spawn_fetch(tx, ticket, async move {
                provider.fetch_dare_options().await.map(RoundContent::Dares)
            }),
            other => debug!(kind = %other, "Party session does not serve this content"),
        }
    }

    /// Make the countdown match the engine's timer, cancelling before starting
    fn sync_timer(&mut self) {
        match self.engine.timer() {
            Some(active) if active.running => {
                let current = self.timer.current().map(|h| h.tag());
                if current != Some(active.generation) || !self.timer.is_running() {
                    self.remaining = Some(active.seconds);
                    self.timer.start(active.seconds, active.generation);
                }
            }
            _ => {
                if self.timer.current().is_some() {
                    self.timer.cancel();
                }
                self.remaining = None;
            }
        }
    }
}
