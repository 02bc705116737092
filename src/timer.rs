//! Restartable countdown timers
//!
//! [`Countdown`] is the tick-driven state of a single countdown and can be
//! stepped by hand. [`CountdownTimer`] drives one countdown at a time on the
//! tokio runtime, posting [`TimerSignal`]s to a channel once per second.
//!
//! Every start bumps the timer's epoch and cancels the previous run before
//! the new one is spawned. Signals carry the epoch they were produced under,
//! and [`CountdownTimer::accept`] rejects anything from a superseded or
//! cancelled run, so a consumer never observes a completion from a run it
//! already abandoned.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Event produced by a countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownEvent {
    /// One second elapsed, `remaining` seconds left
    Tick { remaining: u32 },
    /// The countdown reached zero
    Completed,
}

/// Visual urgency band derived from progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// More than half the time left
    Calm,
    /// Between a fifth and a half left
    Warning,
    /// A fifth or less left
    Critical,
}

impl Urgency {
    pub fn from_progress(progress: f32) -> Self {
        if progress > 0.5 {
            Urgency::Calm
        } else if progress > 0.2 {
            Urgency::Warning
        } else {
            Urgency::Critical
        }
    }
}

/// State of a single countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    completed: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            completed: false,
        }
    }

    /// Advance by one second.
    ///
    /// Returns `None` once the completion has already been emitted.
    pub fn tick(&mut self) -> Option<CountdownEvent> {
        if self.completed {
            return None;
        }

        if self.remaining <= 1 {
            self.remaining = 0;
            self.completed = true;
            return Some(CountdownEvent::Completed);
        }

        self.remaining -= 1;
        Some(CountdownEvent::Tick { remaining: self.remaining })
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.completed
    }

    /// Fraction of the countdown left, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.duration as f32
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::from_progress(self.progress())
    }
}

/// A countdown event tagged with the run that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    /// Timer run the signal belongs to
    pub epoch: u64,
    /// Caller-supplied tag, usually the engine generation the run was started for
    pub tag: u64,
    /// Duration of the run in seconds
    pub duration: u32,
    pub event: CountdownEvent,
}

impl TimerSignal {
    pub fn is_completion(&self) -> bool {
        self.event == CountdownEvent::Completed
    }
}

/// Handle to one countdown run
#[derive(Debug, Clone)]
pub struct TimerHandle {
    epoch: u64,
    tag: u64,
    duration: u32,
    cancel: CancellationToken,
}

impl TimerHandle {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Stop the run; no further signals are sent for it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Drives at most one countdown at a time
#[derive(Debug)]
pub struct CountdownTimer {
    tx: mpsc::UnboundedSender<TimerSignal>,
    epoch: u64,
    current: Option<TimerHandle>,
    tick_interval: Duration,
}

impl CountdownTimer {
    /// Create a timer and the receiver its signals are posted to
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Self {
            tx,
            epoch: 0,
            current: None,
            tick_interval: Duration::from_secs(1),
        };
        (timer, rx)
    }

    /// Start a new countdown of `duration` seconds, cancelling any run in flight
    pub fn start(&mut self, duration: u32, tag: u64) -> TimerHandle {
        self.cancel();

        let handle = TimerHandle {
            epoch: self.epoch,
            tag,
            duration,
            cancel: CancellationToken::new(),
        };

        debug!(epoch = handle.epoch, tag, duration, "Starting countdown");
        tokio::spawn(run_countdown(handle.clone(), self.tx.clone(), self.tick_interval));

        self.current = Some(handle.clone());
        handle
    }

    /// Cancel the run in flight, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            trace!(epoch = handle.epoch, tag = handle.tag, "Cancelling countdown");
            handle.cancel();
        }
        self.epoch += 1;
    }

    /// Whether `signal` belongs to the live run
    pub fn accept(&self, signal: &TimerSignal) -> bool {
        match &self.current {
            Some(handle) => handle.epoch == signal.epoch && !handle.is_cancelled(),
            None => false,
        }
    }

    /// Record that the live run delivered its completion
    pub fn finish(&mut self, signal: &TimerSignal) {
        if signal.is_completion() && self.accept(signal) {
            self.current = None;
        }
    }

    /// The live run, if any
    pub fn current(&self) -> Option<&TimerHandle> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().map(|h| !h.is_cancelled()).unwrap_or(false)
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}

async fn run_countdown(handle: TimerHandle, tx: mpsc::UnboundedSender<TimerSignal>, period: Duration) {
    let mut countdown = Countdown::new(handle.duration);
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = handle.cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(event) = countdown.tick() else { break };
                if handle.is_cancelled() {
                    break;
                }

                let signal = TimerSignal {
                    epoch: handle.epoch,
                    tag: handle.tag,
                    duration: handle.duration,
                    event,
                };
                if tx.send(signal).is_err() || signal.is_completion() {
                    break;
                }
            }
        }
    }
}
