use anyhow::{anyhow, Result};
use colored::*;
use riddle_party::settings::{FontSize, Theme};
use riddle_party::Difficulty;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use tokio::sync::mpsc;

use crate::config::ReplConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    // Riddles
    Riddle { difficulty: Option<Difficulty> },
    Guess { text: String },
    Reveal,
    Share,

    // Truth or dare
    Party { players: usize },
    Name { index: usize, name: String },
    Start,
    Ask,
    Answered,
    Declined,
    Dare { choice: usize },
    Timer,
    Next,
    Reset,

    // Speed challenge
    Speed,
    Again,

    // Preferences
    Theme { theme: Theme },
    Font { size: FontSize },

    Status,
    Help,
    Quit,
}

pub struct ReplInterface {
    editor: DefaultEditor,
    command_sender: mpsc::UnboundedSender<ReplCommand>,
    config: ReplConfig,
}

impl ReplInterface {
    pub fn new(command_sender: mpsc::UnboundedSender<ReplCommand>, config: ReplConfig) -> Result<Self> {
        let editor_config = Config::builder()
            .max_history_size(config.max_history)?
            .auto_add_history(true)
            .build();
        let mut editor = DefaultEditor::with_config(editor_config)?;

        // Load history if configured
        if let Some(history_file) = &config.history_file {
            let _ = editor.load_history(history_file);
        }

        Ok(Self {
            editor,
            command_sender,
            config,
        })
    }

    /// Read lines until the user quits; blocks the calling thread
    pub fn run(&mut self) -> Result<()> {
        self.display_welcome();

        loop {
            let input = match self.editor.readline(&self.config.prompt) {
                Ok(input) => input,
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => {
                    let _ = self.command_sender.send(ReplCommand::Quit);
                    break;
                }
            };
            if input.trim().is_empty() {
                continue;
            }

            match parse_command(&input) {
                Ok(command) => {
                    let quit = command == ReplCommand::Quit;
                    if self.command_sender.send(command).is_err() || quit {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("{}", format!("Error: {}", e).red());
                }
            }
        }

        // Save history if configured
        if let Some(history_file) = &self.config.history_file {
            let _ = self.editor.save_history(history_file);
        }

        Ok(())
    }

    fn display_welcome(&self) {
        println!("{}", "Welcome to Riddle Party!".bright_blue().bold());
        println!("{}", "Riddles, truth or dare and speed challenges for your next get-together".cyan());
        println!("{}", "Type 'help' for available commands".dimmed());
        println!();
    }
}

pub fn parse_command(input: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        ["riddle"] => Ok(ReplCommand::Riddle { difficulty: None }),
        ["riddle", level] => Ok(ReplCommand::Riddle {
            difficulty: Some(level.parse().map_err(|e: String| anyhow!(e))?),
        }),
        ["guess", rest @ ..] if !rest.is_empty() => Ok(ReplCommand::Guess {
            text: rest.join(" "),
        }),
        ["reveal"] => Ok(ReplCommand::Reveal),
        ["share"] => Ok(ReplCommand::Share),

        ["party", players] => Ok(ReplCommand::Party {
            players: players.parse()?,
        }),
        ["name", index, rest @ ..] if !rest.is_empty() => {
            let index: usize = index.parse()?;
            if index == 0 {
                return Err(anyhow!("Player numbers start at 1"));
            }
            Ok(ReplCommand::Name {
                index: index - 1,
                name: rest.join(" "),
            })
        }
        ["start"] => Ok(ReplCommand::Start),
        ["ask"] => Ok(ReplCommand::Ask),
        ["answered"] | ["answer"] => Ok(ReplCommand::Answered),
        ["declined"] | ["decline"] => Ok(ReplCommand::Declined),
        ["dare", choice] => {
            let choice: usize = choice.parse()?;
            if !(1..=3).contains(&choice) {
                return Err(anyhow!("Pick a dare between 1 and 3"));
            }
            Ok(ReplCommand::Dare { choice: choice - 1 })
        }
        ["timer"] => Ok(ReplCommand::Timer),
        ["next"] => Ok(ReplCommand::Next),
        ["reset"] => Ok(ReplCommand::Reset),

        ["speed"] => Ok(ReplCommand::Speed),
        ["again"] => Ok(ReplCommand::Again),

        ["theme", name] => Ok(ReplCommand::Theme {
            theme: name.parse().map_err(|e: String| anyhow!(e))?,
        }),
        ["font", size] => Ok(ReplCommand::Font {
            size: size.parse().map_err(|e: String| anyhow!(e))?,
        }),

        ["status"] => Ok(ReplCommand::Status),
        ["help"] => Ok(ReplCommand::Help),
        ["quit"] | ["exit"] => Ok(ReplCommand::Quit),
        [] => Err(anyhow!("Empty command")),
        _ => Err(anyhow!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            input.trim()
        )),
    }
}
