//! Offline content provider backed by a deck of prepared content

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{GameError, GenerationError};
use super::parse::{clean_category, clean_text};
use super::{ContentProvider, DareOptions, Difficulty, Riddle, DARE_OPTION_COUNT};

/// Riddles grouped by difficulty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiddlePools {
    #[serde(default)]
    pub easy: Vec<Riddle>,
    #[serde(default)]
    pub medium: Vec<Riddle>,
    #[serde(default)]
    pub hard: Vec<Riddle>,
}

impl RiddlePools {
    pub fn pool(&self, difficulty: Difficulty) -> &[Riddle] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Prepared content for every game mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub riddles: RiddlePools,
    #[serde(default)]
    pub truths: Vec<String>,
    #[serde(default)]
    pub dares: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Deck {
    /// Load a deck from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let content = fs::read_to_string(path).map_err(|e| GameError::Configuration {
            message: format!("Failed to read deck file: {}", e),
            field: "content.deck_file".to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GameError::Configuration {
            message: format!("Failed to parse deck file: {}", e),
            field: "content.deck_file".to_string(),
        })
    }

    /// The deck shipped with the game
    pub fn builtin() -> Self {
        fn riddle(riddle: &str, answer: &str) -> Riddle {
            Riddle {
                riddle: riddle.to_string(),
                answer: answer.to_string(),
            }
        }
        fn texts(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            riddles: RiddlePools {
                easy: vec![
                    riddle("What has hands but cannot clap?", "A clock"),
                    riddle("What gets wetter the more it dries?", "A towel"),
                    riddle("What has a neck but no head?", "A bottle"),
                ],
                medium: vec![
                    riddle("What can travel around the world while staying in a corner?", "A stamp"),
                    riddle("The more you take, the more you leave behind. What are they?", "Footsteps"),
                    riddle("What has many teeth but cannot bite?", "A comb"),
                ],
                hard: vec![
                    riddle("What can fill a room but takes up no space?", "Light"),
                    riddle("I speak without a mouth and hear without ears. What am I?", "An echo"),
                    riddle("What comes once in a minute, twice in a moment, but never in a thousand years?", "The letter M"),
                ],
            },
            truths: texts(&[
                "What is the most embarrassing message you have sent to the wrong person?",
                "Who in this room would you call first if you were in trouble?",
                "What is a secret you kept from your parents for years?",
                "What is the pettiest reason you stopped talking to someone?",
                "What is the worst excuse you have used to skip plans?",
            ]),
            dares: texts(&[
                "Sing the chorus of the last song you listened to",
                "Talk in a sports commentator voice until your next turn",
                "Let the other team pick your status message for an hour",
                "Do your best impression of another player",
                "Read your last sent message out loud",
                "Speak only in questions for the next two minutes",
            ]),
            categories: texts(&[
                "Things you find in a kitchen",
                "Capital cities",
                "Cartoon characters",
                "Fruits and vegetables",
                "Football clubs",
            ]),
        }
    }
}

/// Content provider drawing from a [`Deck`] with a seedable RNG
#[derive(Debug, Clone)]
pub struct DeckProvider {
    deck: Arc<Deck>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl DeckProvider {
    /// Create a provider with an entropy-seeded RNG
    pub fn new(deck: Deck) -> Self {
        Self::with_rng(deck, ChaCha8Rng::from_entropy())
    }

    /// Create a provider with a deterministic RNG
    pub fn seeded(deck: Deck, seed: u64) -> Self {
        Self::with_rng(deck, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(deck: Deck, rng: ChaCha8Rng) -> Self {
        Self {
            deck: Arc::new(deck),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    fn draw<'a, T>(&self, pool: &'a [T], name: &str) -> Result<&'a T, GenerationError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pool.choose(&mut *rng).ok_or_else(|| GenerationError::EmptyPool {
            pool: name.to_string(),
        })
    }
}

impl ContentProvider for DeckProvider {
    async fn fetch_riddle(&self, difficulty: Difficulty) -> Result<Riddle, GenerationError> {
        let riddle = self.draw(self.deck.riddles.pool(difficulty), &format!("{} riddle", difficulty))?;
        debug!(difficulty = %difficulty, "Drew riddle from deck");
        Ok(riddle.clone())
    }

    async fn fetch_truth_question(&self) -> Result<String, GenerationError> {
        let question = self.draw(&self.deck.truths, "truth question")?;
        clean_text(question)
    }

    async fn fetch_dare_options(&self) -> Result<DareOptions, GenerationError> {
        let pool = &self.deck.dares;
        if pool.is_empty() {
            return Err(GenerationError::EmptyPool {
                pool: "dare".to_string(),
            });
        }

        let picks: Vec<String> = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let amount = DARE_OPTION_COUNT.min(pool.len());
            index::sample(&mut *rng, pool.len(), amount)
                .into_iter()
                .map(|i| pool[i].clone())
                .collect()
        };

        debug!(drawn = picks.len(), pool = pool.len(), "Drew dare options from deck");
        DareOptions::from_options(picks)
    }

    async fn fetch_speed_category(&self) -> Result<String, GenerationError> {
        let category = self.draw(&self.deck.categories, "speed category")?;
        clean_category(category)
    }
}
