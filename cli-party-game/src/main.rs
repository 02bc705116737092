use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use riddle_party::error::logging;
use riddle_party::PartyConfig;

mod app;
mod config;
mod repl;

use app::PartyApp;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "riddle-party")]
#[command(about = "Riddles, truth or dare and speed challenges in your terminal")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deck file with riddles, questions, dares and categories
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// File to keep theme and font preferences in
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seed for repeatable content and targets
    #[arg(long)]
    seed: Option<u64>,

    /// Use the shortest allowed timers
    #[arg(long)]
    quick: bool,

    /// Seconds to answer a truth question
    #[arg(long)]
    question_secs: Option<u32>,

    /// Seconds to perform a dare
    #[arg(long)]
    dare_secs: Option<u32>,

    /// Seconds per speed challenge round
    #[arg(long)]
    speed_secs: Option<u32>,
}

impl Cli {
    /// Merge the config file and flags; flags win
    fn app_config(&self) -> Result<AppConfig> {
        let mut party = match &self.config {
            Some(path) => PartyConfig::from_file(path)?,
            None if self.quick => PartyConfig::quick(),
            None => PartyConfig::default(),
        };
        if self.quick {
            party.timers = PartyConfig::quick().timers;
        }

        if let Some(seconds) = self.question_secs {
            party.timers.question_seconds = seconds;
        }
        if let Some(seconds) = self.dare_secs {
            party.timers.dare_seconds = seconds;
        }
        if let Some(seconds) = self.speed_secs {
            party.timers.speed_seconds = seconds;
        }
        if self.deck.is_some() {
            party.content.deck_file = self.deck.clone();
        }
        if self.seed.is_some() {
            party.content.seed = self.seed;
        }
        party.validate()?;

        Ok(AppConfig {
            party,
            settings_file: self.settings.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Parse command line arguments
    let cli = Cli::parse();
    let config = cli.app_config()?;

    // Create and run the game application
    let mut app = PartyApp::new(config)?;
    app.run().await?;

    Ok(())
}
