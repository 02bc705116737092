use anyhow::{Context, Result};
use colored::*;
use riddle_party::content::DeckProvider;
use riddle_party::party::{PartySession, PartyUpdate, PhaseKind, TurnEngine};
use riddle_party::riddle::{GuessOutcome, RiddleSession, RiddleStatus};
use riddle_party::settings::{FileStore, FontSize, MemoryStore, Preferences, SettingsStore, Theme};
use riddle_party::speed::{SpeedEngine, SpeedPhase, SpeedSession, SpeedUpdate};
use riddle_party::timer::Urgency;
use riddle_party::{Applied, Deck, RoundContent, Team};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::{AppConfig, ReplConfig};
use crate::repl::{ReplCommand, ReplInterface};

/// What woke the event loop
enum AppEvent {
    Command(Option<ReplCommand>),
    Party(PartyUpdate),
    Speed(SpeedUpdate),
    Riddle(Applied),
}

pub struct PartyApp {
    party: PartySession<DeckProvider>,
    speed: SpeedSession<DeckProvider>,
    riddle: RiddleSession<DeckProvider>,
    store: Box<dyn SettingsStore>,
    preferences: Preferences,
    command_receiver: mpsc::UnboundedReceiver<ReplCommand>,
}

impl PartyApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let party_config = config.party;

        let deck = match &party_config.content.deck_file {
            Some(path) => Deck::from_file(path)
                .with_context(|| format!("Failed to load deck {}", path.display()))?,
            None => Deck::builtin(),
        };
        let seed = party_config.content.seed;
        let provider = match seed {
            Some(seed) => DeckProvider::seeded(deck, seed),
            None => DeckProvider::new(deck),
        };
        let engine = match seed {
            Some(seed) => TurnEngine::seeded(party_config.timers, seed),
            None => TurnEngine::from_entropy(party_config.timers),
        };

        let store: Box<dyn SettingsStore> = match &config.settings_file {
            Some(path) => Box::new(FileStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };
        let preferences = Preferences::load(&*store);

        // Start the REPL on its own thread; readline blocks
        let (command_sender, command_receiver) = mpsc::unbounded_channel();
        let mut repl = ReplInterface::new(command_sender, ReplConfig::default())?;
        std::thread::spawn(move || {
            if let Err(e) = repl.run() {
                eprintln!("REPL error: {}", e);
            }
        });

        info!(seed = ?seed, "Riddle Party started");

        Ok(Self {
            party: PartySession::new(provider.clone(), engine),
            speed: SpeedSession::new(provider.clone(), SpeedEngine::new(party_config.timers.speed_seconds)),
            riddle: RiddleSession::new(provider),
            store,
            preferences,
            command_receiver,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let event = tokio::select! {
                command = self.command_receiver.recv() => AppEvent::Command(command),
                update = self.party.next_update() => AppEvent::Party(update),
                update = self.speed.next_update() => AppEvent::Speed(update),
                applied = self.riddle.next_update() => AppEvent::Riddle(applied),
            };

            match event {
                AppEvent::Command(None) | AppEvent::Command(Some(ReplCommand::Quit)) => {
                    println!("Goodbye!");
                    break;
                }
                AppEvent::Command(Some(command)) => {
                    debug!(?command, "Handling command");
                    if let Err(e) = self.handle_command(command) {
                        eprintln!("{}", format!("Error: {}", e).red());
                    }
                }
                AppEvent::Party(update) => self.show_party_update(update),
                AppEvent::Speed(update) => self.show_speed_update(update),
                AppEvent::Riddle(applied) => self.show_riddle_update(applied),
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, command: ReplCommand) -> Result<()> {
        match command {
            ReplCommand::Riddle { difficulty } => {
                let difficulty = difficulty.unwrap_or_else(|| self.riddle.engine().difficulty());
                self.riddle.request(difficulty);
                self.note(&format!("Thinking of a {} riddle...", difficulty));
            }
            ReplCommand::Guess { text } => {
                let message = match self.riddle.engine_mut().check_guess(&text)? {
                    GuessOutcome::Correct => "Correct! Well done.".green(),
                    GuessOutcome::Incorrect => "Not quite, try again.".yellow(),
                    GuessOutcome::Empty => "Type an answer after 'guess'.".dimmed(),
                };
                println!("{}", message);
            }
            ReplCommand::Reveal => {
                let answer = self.riddle.engine_mut().reveal()?.to_string();
                println!("The answer is: {}", self.accent(&answer));
            }
            ReplCommand::Share => println!("{}", self.riddle.engine().share_text()?),

            ReplCommand::Party { players } => {
                if self.party.snapshot().phase != PhaseKind::SelectingPlayerCount {
                    self.party.reset();
                }
                self.party.choose_player_count(players)?;
                self.note(&format!("Name the players with 'name <1-{}> <name>', then 'start'.", players));
            }
            ReplCommand::Name { index, name } => {
                self.party.set_name(index, &name)?;
                let team = Team::for_slot(index);
                println!("Player {} is {} (team {})", index + 1, name.trim(), team);
            }
            ReplCommand::Start => {
                self.party.start_game()?;
                self.show_teams();
                self.show_turn();
            }
            ReplCommand::Ask => {
                self.party.ask_question()?;
                self.note("Generating a question...");
            }
            ReplCommand::Answered => {
                self.party.answered()?;
                self.show_score();
                self.show_turn();
            }
            ReplCommand::Declined => {
                self.party.declined()?;
                self.note("Generating dares...");
            }
            ReplCommand::Dare { choice } => {
                self.party.select_dare(choice)?;
                if let Some(dare) = self.party.engine().selected_dare() {
                    println!("Dare: {}", self.accent(dare));
                }
                self.note("Type 'timer' to start the clock or 'next' when done.");
            }
            ReplCommand::Timer => {
                self.party.start_dare_timer()?;
                if let Some(seconds) = self.party.remaining() {
                    self.note(&format!("{} seconds on the clock!", seconds));
                }
            }
            ReplCommand::Next => {
                self.party.advance_turn()?;
                self.show_turn();
            }
            ReplCommand::Reset => {
                self.party.reset();
                self.note("Game reset. Choose the number of players with 'party <n>'.");
            }

            ReplCommand::Speed => {
                self.speed.start()?;
                self.note("Picking a category...");
            }
            ReplCommand::Again => {
                self.speed.play_again()?;
                self.speed.start()?;
                self.note("Picking a category...");
            }

            ReplCommand::Theme { theme } => {
                self.preferences.set_theme(&mut *self.store, theme)?;
                println!("Theme set to {}", self.accent(theme.as_str()));
            }
            ReplCommand::Font { size } => {
                self.preferences.set_font_size(&mut *self.store, size)?;
                println!("Font size set to {}", self.accent(size.as_str()));
            }

            ReplCommand::Status => self.show_status(),
            ReplCommand::Help => show_help(),
            ReplCommand::Quit => {}
        }
        Ok(())
    }

    fn show_party_update(&self, update: PartyUpdate) {
        match update {
            PartyUpdate::ContentApplied(PhaseKind::Question) => {
                let snapshot = self.party.snapshot();
                if let (Some(asking), Some(target)) = (snapshot.asking, snapshot.target) {
                    println!("{} asks {}:", asking.name, self.accent(&target.name));
                }
                if let Some(RoundContent::Text(question)) = snapshot.content {
                    println!("  {}", question.bold());
                }
                self.note("'answered' or 'declined'?");
            }
            PartyUpdate::ContentApplied(_) => {
                if let Some(RoundContent::Dares(options)) = self.party.snapshot().content {
                    println!("Pick a dare with 'dare <1-3>':");
                    for (i, dare) in options.iter().enumerate() {
                        println!("  {}. {}", i + 1, dare);
                    }
                }
            }
            PartyUpdate::ContentFailed(message) => {
                eprintln!("{}", message.red());
                self.note("Try again with the same command.");
            }
            PartyUpdate::Tick { remaining, urgency, .. } => show_tick(remaining, urgency),
            PartyUpdate::QuestionTimedOut => {
                println!("{}", "Time's up! That counts as a decline.".yellow());
                self.note("Generating dares...");
            }
            PartyUpdate::DareTimedOut => {
                println!("{}", "Time's up!".yellow());
                self.show_turn();
            }
            PartyUpdate::Discarded => {}
        }
    }

    fn show_speed_update(&self, update: SpeedUpdate) {
        match update {
            SpeedUpdate::Started(category) => {
                println!("Name as many as you can: {}", self.accent(&category).bold());
            }
            SpeedUpdate::Failed(message) => eprintln!("{}", message.red()),
            SpeedUpdate::Tick { remaining, urgency, .. } => show_tick(remaining, urgency),
            SpeedUpdate::TimeUp => {
                println!("{}", "Time's up! Pencils down.".yellow().bold());
                self.note("Type 'again' for another category.");
            }
            SpeedUpdate::Discarded => {}
        }
    }

    fn show_riddle_update(&self, applied: Applied) {
        let engine = self.riddle.engine();
        match (applied, engine.riddle()) {
            (Applied::Accepted, Some(riddle)) => {
                println!("{} riddle:", engine.difficulty());
                println!("  {}", self.accent(&riddle.riddle));
                self.note("'guess <answer>', 'reveal' or 'share'");
            }
            (Applied::Failed, _) => {
                if let Some(error) = engine.last_error() {
                    eprintln!("{}", error.message().red());
                }
            }
            _ => {}
        }
    }

    fn show_status(&self) {
        let snapshot = self.party.snapshot();
        println!("{}", "Truth or dare".bold());
        println!("  Phase: {}", snapshot.phase);
        if !snapshot.roster.is_empty() {
            self.show_teams();
            self.show_score();
            if let Some(asking) = snapshot.asking {
                println!("  Asking: {}", asking.name);
            }
        }
        if let Some(error) = snapshot.error {
            println!("  Last error: {}", error.message().red());
        }

        let speed = self.speed.snapshot();
        let speed_phase = match speed.phase {
            SpeedPhase::Idle => "idle".to_string(),
            SpeedPhase::Loading { .. } => "loading".to_string(),
            SpeedPhase::Playing { category } => format!("playing '{}'", category),
            SpeedPhase::Finished { category } => format!("finished '{}'", category),
        };
        println!("{}", "Speed challenge".bold());
        println!("  {} ({}s rounds)", speed_phase, speed.duration);

        let riddle = self.riddle.engine();
        let status = match riddle.status() {
            RiddleStatus::Loading if riddle.riddle().is_none() => "none yet",
            RiddleStatus::Loading => "loading",
            RiddleStatus::Ready if riddle.is_revealed() => "solved",
            RiddleStatus::Ready => "unsolved",
            RiddleStatus::Failed => "failed",
        };
        println!("{}", "Riddles".bold());
        println!("  {} ({})", status, riddle.difficulty());

        println!("{}", "Preferences".bold());
        println!("  Theme {}, font {}", self.preferences.theme, self.preferences.font_size);
    }

    fn show_teams(&self) {
        let roster = self.party.engine().roster();
        println!("  Team A: {}", roster.team_names(Team::A).join(", "));
        println!("  Team B: {}", roster.team_names(Team::B).join(", "));
    }

    fn show_score(&self) {
        let score = self.party.snapshot().score;
        println!("  Score: A {} - B {}", self.accent(&score.a.to_string()), self.accent(&score.b.to_string()));
    }

    fn show_turn(&self) {
        if let Some(asking) = self.party.engine().asking_player() {
            println!("{}'s turn. Type 'ask' to ask a question.", self.accent(&asking.name));
        }
    }

    /// Text in the current theme colour and font size
    fn accent(&self, text: &str) -> ColoredString {
        let colored = match self.preferences.theme {
            Theme::Cyan => text.cyan(),
            Theme::Emerald => text.green(),
            Theme::Rose => text.bright_red(),
            Theme::Violet => text.purple(),
        };
        match self.preferences.font_size {
            FontSize::Small => colored.dimmed(),
            FontSize::Medium => colored,
            FontSize::Large => colored.bold(),
        }
    }

    fn note(&self, text: &str) {
        println!("{}", text.dimmed());
    }
}

fn show_tick(remaining: u32, urgency: Urgency) {
    if remaining > 10 && remaining % 10 != 0 {
        return;
    }
    let text = format!("{}s left", remaining);
    let text = match urgency {
        Urgency::Calm => text.green(),
        Urgency::Warning => text.yellow(),
        Urgency::Critical => text.red().bold(),
    };
    println!("{}", text);
}

fn show_help() {
    println!("Riddles:");
    println!("  riddle [easy|medium|hard] - Get a new riddle");
    println!("  guess <answer>            - Check your answer");
    println!("  reveal                    - Show the answer");
    println!("  share                     - Print the riddle for sharing");
    println!("Truth or dare:");
    println!("  party <2|4|6|8|10>        - Set up a game for that many players");
    println!("  name <n> <name>           - Name player n");
    println!("  start                     - Start the game");
    println!("  ask                       - Ask a question of the other team");
    println!("  answered | declined       - How the target responded");
    println!("  dare <1-3>                - Choose a dare");
    println!("  timer                     - Start the dare timer");
    println!("  next                      - Dare done, next player");
    println!("  reset                     - Start over");
    println!("Speed challenge:");
    println!("  speed                     - Start a round");
    println!("  again                     - Play another round");
    println!("Other:");
    println!("  theme <cyan|emerald|rose|violet>");
    println!("  font <small|medium|large>");
    println!("  status                    - Show the state of every game");
    println!("  help                      - Show this help");
    println!("  quit                      - Exit the application");
}
