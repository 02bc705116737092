//! Truth-or-dare turn engine
//!
//! The engine is a synchronous state machine. Intents either move it
//! directly or hand back a [`FetchTicket`] / [`TimerSpec`] describing the
//! asynchronous work the caller must perform. Results come back through
//! [`TurnEngine::content_ready`], [`TurnEngine::content_failed`] and
//! [`TurnEngine::timer_elapsed`], each checked against the current
//! generation before anything is applied.

use std::fmt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::TimerConfig;
use crate::content::{Applied, DareOptions, FetchKind, FetchTicket, RoundContent, DARE_OPTION_COUNT};
use crate::error::{GameError, GameResult, GenerationError, RoundError};
use super::roster::{validate_player_count, Player, Roster};
use super::score::Score;

/// Current state of the party game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the number of players
    SelectingPlayerCount,
    /// Collecting one name per slot
    NamingPlayers { slots: Vec<String> },
    /// Waiting for the asking player to ask
    Idle,
    /// A truth question or dare options have been requested
    AwaitingContent { ticket: FetchTicket },
    /// The target is being asked a truth question
    Question { text: String },
    /// The target declined and picks or performs a dare
    Dare {
        options: DareOptions,
        selected: Option<usize>,
    },
}

/// Data-free view of [`Phase`], with the dare sub-states spelled out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    SelectingPlayerCount,
    NamingPlayers,
    Idle,
    AwaitingContent,
    Question,
    DareChoosing,
    DareSelected,
    DareRunning,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PhaseKind::SelectingPlayerCount => "selecting the player count",
            PhaseKind::NamingPlayers => "naming players",
            PhaseKind::Idle => "idle",
            PhaseKind::AwaitingContent => "waiting for content",
            PhaseKind::Question => "asking a question",
            PhaseKind::DareChoosing => "choosing a dare",
            PhaseKind::DareSelected => "holding a chosen dare",
            PhaseKind::DareRunning => "performing a dare",
        };
        f.write_str(text)
    }
}

/// Timer attached to the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSpec {
    /// Generation the timer belongs to
    pub generation: u64,
    pub seconds: u32,
    /// Whether the countdown should be running
    pub running: bool,
}

/// What a timer completion did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The question ran out; dare options were requested
    DareRequested(FetchTicket),
    /// The dare ran out; the next player is up
    TurnAdvanced,
    /// The completion belonged to an abandoned round
    Stale,
}

/// Read-only view of the engine for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySnapshot {
    pub phase: PhaseKind,
    pub name_slots: Vec<String>,
    pub roster: Vec<Player>,
    pub score: Score,
    pub turn: u64,
    pub asking: Option<Player>,
    pub target: Option<Player>,
    pub content: Option<RoundContent>,
    pub selected_dare: Option<usize>,
    pub timer: Option<TimerSpec>,
    pub error: Option<RoundError>,
    pub generation: u64,
}

/// Turn, target and score state machine for the team party game
#[derive(Debug, Clone)]
pub struct TurnEngine<R = ChaCha8Rng> {
    timers: TimerConfig,
    rng: R,
    phase: Phase,
    roster: Roster,
    score: Score,
    turn: u64,
    target: Option<usize>,
    timer: Option<TimerSpec>,
    generation: u64,
    last_error: Option<RoundError>,
}

impl TurnEngine<ChaCha8Rng> {
    /// Engine with a deterministic target sequence
    pub fn seeded(timers: TimerConfig, seed: u64) -> Self {
        Self::new(timers, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Engine with an entropy-seeded target sequence
    pub fn from_entropy(timers: TimerConfig) -> Self {
        Self::new(timers, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> TurnEngine<R> {
    pub fn new(timers: TimerConfig, rng: R) -> Self {
        Self {
            timers,
            rng,
            phase: Phase::SelectingPlayerCount,
            roster: Roster::default(),
            score: Score::default(),
            turn: 0,
            target: None,
            timer: None,
            generation: 0,
            last_error: None,
        }
    }

    /// Replace the round durations; the current round keeps its timer
    pub fn set_timers(&mut self, timers: TimerConfig) -> GameResult<()> {
        timers.validate()?;
        self.timers = timers;
        Ok(())
    }

    pub fn timers(&self) -> TimerConfig {
        self.timers
    }

    // ----- setup -----

    /// Choose how many players will take part
    pub fn choose_player_count(&mut self, count: usize) -> GameResult<()> {
        self.expect(PhaseKind::SelectingPlayerCount, "choose_player_count")?;
        validate_player_count(count)?;

        self.phase = Phase::NamingPlayers {
            slots: vec![String::new(); count],
        };
        debug!(count, "Player count chosen");
        Ok(())
    }

    /// Fill one name slot
    pub fn set_name(&mut self, index: usize, name: &str) -> GameResult<()> {
        let phase = self.phase_kind();
        match &mut self.phase {
            Phase::NamingPlayers { slots } => {
                let count = slots.len();
                let slot = slots.get_mut(index).ok_or(GameError::NameIndexOutOfRange {
                    index,
                    slots: count,
                })?;
                *slot = name.to_string();
                Ok(())
            }
            _ => Err(invalid("set_name", phase)),
        }
    }

    /// Build the roster from the named slots and begin play.
    ///
    /// A blank slot rejects the start and keeps the names entered so far.
    pub fn start_game(&mut self) -> GameResult<()> {
        let roster = match &self.phase {
            Phase::NamingPlayers { slots } => Roster::from_names(slots.as_slice())?,
            _ => return Err(invalid("start_game", self.phase_kind())),
        };
        self.begin(roster);
        Ok(())
    }

    /// Fill every slot at once and begin play
    pub fn submit_names<S: AsRef<str>>(&mut self, names: &[S]) -> GameResult<()> {
        let slots = match &self.phase {
            Phase::NamingPlayers { slots } => slots.len(),
            _ => return Err(invalid("submit_names", self.phase_kind())),
        };
        if names.len() != slots {
            return Err(GameError::InvalidPlayerCount(names.len()));
        }

        for (index, name) in names.iter().enumerate() {
            self.set_name(index, name.as_ref())?;
        }
        self.start_game()
    }

    /// Begin play with an existing roster, skipping setup
    pub fn start_with_roster(&mut self, roster: Roster) -> GameResult<()> {
        match self.phase_kind() {
            PhaseKind::SelectingPlayerCount | PhaseKind::NamingPlayers => {
                self.begin(roster);
                Ok(())
            }
            other => Err(invalid("start_with_roster", other)),
        }
    }

    fn begin(&mut self, roster: Roster) {
        info!(players = roster.len(), "Party game started");
        self.roster = roster;
        self.score = Score::default();
        self.turn = 0;
        self.target = None;
        self.timer = None;
        self.last_error = None;
        self.generation += 1;
        self.phase = Phase::Idle;
    }

    // ----- rounds -----

    /// Pick a target on the opposing team and request a truth question
    pub fn ask_question(&mut self) -> GameResult<FetchTicket> {
        self.expect(PhaseKind::Idle, "ask_question")?;

        let asking = self.roster.asking(self.turn).ok_or_else(|| GameError::NoOpponents {
            asking: "nobody".to_string(),
        })?;
        let opponents = self.roster.opponents_of(asking);
        if opponents.is_empty() {
            warn!(asking = %asking.name, "Roster has no opponents for the asking player");
            return Err(GameError::NoOpponents {
                asking: asking.name.clone(),
            });
        }

        let target = opponents[self.rng.gen_range(0..opponents.len())];
        debug!(
            turn = self.turn,
            asking = %asking.name,
            target = %self.roster.players()[target].name,
            "Target chosen"
        );

        self.target = Some(target);
        self.last_error = None;
        Ok(self.request(FetchKind::TruthQuestion))
    }

    /// Feed fetched content back in
    pub fn content_ready(&mut self, ticket: FetchTicket, content: RoundContent) -> Applied {
        if !self.is_pending(&ticket) {
            debug!(request_id = %ticket.request_id, generation = ticket.generation, "Discarding stale content");
            return Applied::Stale;
        }

        match (ticket.kind, content) {
            (FetchKind::TruthQuestion, RoundContent::Text(text)) => {
                self.generation += 1;
                self.timer = Some(TimerSpec {
                    generation: self.generation,
                    seconds: self.timers.question_seconds,
                    running: true,
                });
                self.phase = Phase::Question { text };
                debug!(generation = self.generation, "Question ready");
                Applied::Accepted
            }
            (FetchKind::DareOptions, RoundContent::Dares(options)) => {
                self.generation += 1;
                self.timer = Some(TimerSpec {
                    generation: self.generation,
                    seconds: self.timers.dare_seconds,
                    running: false,
                });
                self.phase = Phase::Dare {
                    options,
                    selected: None,
                };
                debug!(generation = self.generation, "Dare options ready");
                Applied::Accepted
            }
            (kind, _) => {
                self.fail(ticket, GenerationError::schema(format!("unexpected content for {}", kind)));
                Applied::Failed
            }
        }
    }

    /// Report a failed fetch; the engine returns to `Idle` without advancing
    pub fn content_failed(&mut self, ticket: FetchTicket, error: GenerationError) -> Applied {
        if !self.is_pending(&ticket) {
            debug!(request_id = %ticket.request_id, "Discarding stale failure");
            return Applied::Stale;
        }
        self.fail(ticket, error);
        Applied::Failed
    }

    /// The target answered: their team scores and the turn passes
    pub fn answered(&mut self) -> GameResult<()> {
        self.expect(PhaseKind::Question, "answered")?;

        let target = self
            .target
            .and_then(|i| self.roster.get(i))
            .ok_or_else(|| GameError::NoOpponents {
                asking: self.asking_name(),
            })?;
        self.score.credit(target.team);
        info!(target = %target.name, team = %target.team, score_a = self.score.a, score_b = self.score.b, "Question answered");

        self.end_turn();
        Ok(())
    }

    /// The target declined: request dare options
    pub fn declined(&mut self) -> GameResult<FetchTicket> {
        self.expect(PhaseKind::Question, "declined")?;
        debug!(turn = self.turn, "Question declined");
        Ok(self.request(FetchKind::DareOptions))
    }

    /// Pick one of the three dare options
    pub fn select_dare(&mut self, index: usize) -> GameResult<()> {
        let phase = self.phase_kind();
        match &mut self.phase {
            Phase::Dare { selected, .. } if selected.is_none() => {
                if index >= DARE_OPTION_COUNT {
                    return Err(GameError::InvalidDareIndex(index));
                }
                *selected = Some(index);
                debug!(index, "Dare selected");
                Ok(())
            }
            _ => Err(invalid("select_dare", phase)),
        }
    }

    /// Start the countdown for the chosen dare
    pub fn start_dare_timer(&mut self) -> GameResult<TimerSpec> {
        self.expect(PhaseKind::DareSelected, "start_dare_timer")?;

        let seconds = self.timer.map(|t| t.seconds).unwrap_or(self.timers.dare_seconds);
        self.generation += 1;
        let dare_timer = TimerSpec {
            generation: self.generation,
            seconds,
            running: true,
        };
        self.timer = Some(dare_timer);
        Ok(dare_timer)
    }

    /// The dare is done: the turn passes without scoring
    pub fn advance_turn(&mut self) -> GameResult<()> {
        match self.phase_kind() {
            PhaseKind::DareSelected | PhaseKind::DareRunning => {
                self.end_turn();
                Ok(())
            }
            other => Err(invalid("advance_turn", other)),
        }
    }

    /// A round timer ran out.
    ///
    /// A question timing out is handled exactly like a decline; a dare
    /// timing out is handled exactly like a finished dare.
    pub fn timer_elapsed(&mut self, generation: u64) -> TimerOutcome {
        let live = matches!(self.timer, Some(active) if active.running && active.generation == generation)
            && generation == self.generation;
        if !live {
            debug!(generation, current = self.generation, "Ignoring stale timer");
            return TimerOutcome::Stale;
        }

        match self.phase_kind() {
            PhaseKind::Question => {
                debug!(turn = self.turn, "Question timed out");
                TimerOutcome::DareRequested(self.request(FetchKind::DareOptions))
            }
            PhaseKind::DareRunning => {
                debug!(turn = self.turn, "Dare timed out");
                self.end_turn();
                TimerOutcome::TurnAdvanced
            }
            _ => TimerOutcome::Stale,
        }
    }

    /// Drop roster, score and round state and go back to setup
    pub fn reset(&mut self) {
        info!(turn = self.turn, "Party game reset");
        self.phase = Phase::SelectingPlayerCount;
        self.roster = Roster::default();
        self.score = Score::default();
        self.turn = 0;
        self.target = None;
        self.timer = None;
        self.last_error = None;
        // Never reuse a generation, so pre-reset tickets stay stale
        self.generation += 1;
    }

    fn request(&mut self, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket::new(self.generation, kind);
        self.timer = None;
        self.phase = Phase::AwaitingContent { ticket };
        debug!(request_id = %ticket.request_id, generation = self.generation, kind = %kind, "Content requested");
        ticket
    }

    fn fail(&mut self, ticket: FetchTicket, error: GenerationError) {
        warn!(request_id = %ticket.request_id, kind = %ticket.kind, error = %error, "Content fetch failed");
        let intent = match ticket.kind {
            FetchKind::DareOptions => "declined",
            _ => "ask_question",
        };
        self.last_error = Some(RoundError::new(ticket.request_id, intent, error));
        self.phase = Phase::Idle;
        self.target = None;
        self.timer = None;
        self.generation += 1;
    }

    fn end_turn(&mut self) {
        self.turn += 1;
        self.phase = Phase::Idle;
        self.target = None;
        self.timer = None;
        self.last_error = None;
        self.generation += 1;
        debug!(turn = self.turn, asking = %self.asking_name(), "Turn advanced");
    }

    fn is_pending(&self, ticket: &FetchTicket) -> bool {
        matches!(&self.phase, Phase::AwaitingContent { ticket: pending } if pending == ticket)
            && ticket.generation == self.generation
    }

    fn expect(&self, kind: PhaseKind, intent: &'static str) -> GameResult<()> {
        let current = self.phase_kind();
        if current != kind {
            return Err(invalid(intent, current));
        }
        Ok(())
    }

    fn asking_name(&self) -> String {
        self.asking_player()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    // ----- views -----

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        match &self.phase {
            Phase::SelectingPlayerCount => PhaseKind::SelectingPlayerCount,
            Phase::NamingPlayers { .. } => PhaseKind::NamingPlayers,
            Phase::Idle => PhaseKind::Idle,
            Phase::AwaitingContent { .. } => PhaseKind::AwaitingContent,
            Phase::Question { .. } => PhaseKind::Question,
            Phase::Dare { selected: None, .. } => PhaseKind::DareChoosing,
            Phase::Dare { selected: Some(_), .. } => {
                if self.timer.map(|t| t.running).unwrap_or(false) {
                    PhaseKind::DareRunning
                } else {
                    PhaseKind::DareSelected
                }
            }
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Turn cursor; increases by one every time a turn passes
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Player whose turn it is, recomputed from the cursor
    pub fn asking_player(&self) -> Option<&Player> {
        self.roster.asking(self.turn)
    }

    pub fn target_player(&self) -> Option<&Player> {
        self.target.and_then(|i| self.roster.get(i))
    }

    pub fn content(&self) -> Option<RoundContent> {
        match &self.phase {
            Phase::Question { text } => Some(RoundContent::Text(text.clone())),
            Phase::Dare { options, .. } => Some(RoundContent::Dares(options.clone())),
            _ => None,
        }
    }

    pub fn selected_dare(&self) -> Option<&str> {
        match &self.phase {
            Phase::Dare { options, selected: Some(index) } => options.get(*index),
            _ => None,
        }
    }

    pub fn timer(&self) -> Option<TimerSpec> {
        self.timer
    }

    pub fn pending_ticket(&self) -> Option<FetchTicket> {
        match &self.phase {
            Phase::AwaitingContent { ticket } => Some(*ticket),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&RoundError> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> PartySnapshot {
        let name_slots = match &self.phase {
            Phase::NamingPlayers { slots } => slots.clone(),
            _ => Vec::new(),
        };
        let selected_dare = match &self.phase {
            Phase::Dare { selected, .. } => *selected,
            _ => None,
        };

        PartySnapshot {
            phase: self.phase_kind(),
            name_slots,
            roster: self.roster.players().to_vec(),
            score: self.score,
            turn: self.turn,
            asking: self.asking_player().cloned(),
            target: self.target_player().cloned(),
            content: self.content(),
            selected_dare,
            timer: self.timer,
            error: self.last_error.clone(),
            generation: self.generation,
        }
    }
}

fn invalid(intent: &'static str, phase: PhaseKind) -> GameError {
    GameError::InvalidIntent {
        intent,
        phase: phase.to_string(),
    }
}
