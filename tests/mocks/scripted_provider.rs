//! Deterministic content provider with queued responses

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use riddle_party::{ContentProvider, DareOptions, Difficulty, FetchKind, GenerationError, Riddle};

#[derive(Debug)]
struct Step<T> {
    delay: Option<Duration>,
    result: Result<T, GenerationError>,
}

#[derive(Debug, Default)]
struct Script {
    riddles: VecDeque<Step<Riddle>>,
    truths: VecDeque<Step<String>>,
    dares: VecDeque<Step<DareOptions>>,
    categories: VecDeque<Step<String>>,
    calls: Vec<FetchKind>,
}

/// Content provider that replays scripted responses in order.
///
/// An operation with nothing queued fails with `EmptyPool`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_truth(&self, text: &str) -> &Self {
        self.script.lock().unwrap().truths.push_back(Step {
            delay: None,
            result: Ok(text.to_string()),
        });
        self
    }

    /// Queue a truth question that takes `delay` to arrive
    pub fn push_truth_after(&self, delay: Duration, text: &str) -> &Self {
        self.script.lock().unwrap().truths.push_back(Step {
            delay: Some(delay),
            result: Ok(text.to_string()),
        });
        self
    }

    pub fn fail_truth(&self, error: GenerationError) -> &Self {
        self.script.lock().unwrap().truths.push_back(Step { delay: None, result: Err(error) });
        self
    }

    pub fn push_dares(&self, options: &[&str]) -> &Self {
        let result = DareOptions::from_options(options.iter().map(|s| s.to_string()).collect());
        self.script.lock().unwrap().dares.push_back(Step { delay: None, result });
        self
    }

    pub fn fail_dares(&self, error: GenerationError) -> &Self {
        self.script.lock().unwrap().dares.push_back(Step { delay: None, result: Err(error) });
        self
    }

    pub fn push_category(&self, category: &str) -> &Self {
        self.script.lock().unwrap().categories.push_back(Step {
            delay: None,
            result: Ok(category.to_string()),
        });
        self
    }

    pub fn push_category_after(&self, delay: Duration, category: &str) -> &Self {
        self.script.lock().unwrap().categories.push_back(Step {
            delay: Some(delay),
            result: Ok(category.to_string()),
        });
        self
    }

    pub fn fail_category(&self, error: GenerationError) -> &Self {
        self.script.lock().unwrap().categories.push_back(Step { delay: None, result: Err(error) });
        self
    }

    pub fn push_riddle(&self, riddle: &str, answer: &str) -> &Self {
        self.script.lock().unwrap().riddles.push_back(Step {
            delay: None,
            result: Ok(Riddle {
                riddle: riddle.to_string(),
                answer: answer.to_string(),
            }),
        });
        self
    }

    pub fn push_riddle_after(&self, delay: Duration, riddle: &str, answer: &str) -> &Self {
        self.script.lock().unwrap().riddles.push_back(Step {
            delay: Some(delay),
            result: Ok(Riddle {
                riddle: riddle.to_string(),
                answer: answer.to_string(),
            }),
        });
        self
    }

    pub fn fail_riddle(&self, error: GenerationError) -> &Self {
        self.script.lock().unwrap().riddles.push_back(Step { delay: None, result: Err(error) });
        self
    }

    /// Every fetch made so far, in call order
    pub fn calls(&self) -> Vec<FetchKind> {
        self.script.lock().unwrap().calls.clone()
    }

    fn next<T>(&self, kind: FetchKind, pick: impl FnOnce(&mut Script) -> Option<Step<T>>) -> Step<T> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(kind);
        pick(&mut script).unwrap_or(Step {
            delay: None,
            result: Err(GenerationError::EmptyPool { pool: kind.to_string() }),
        })
    }

    async fn play<T>(step: Step<T>) -> Result<T, GenerationError> {
        if let Some(delay) = step.delay {
            tokio::time::sleep(delay).await;
        }
        step.result
    }
}

impl ContentProvider for ScriptedProvider {
    async fn fetch_riddle(&self, difficulty: Difficulty) -> Result<Riddle, GenerationError> {
        let step = self.next(FetchKind::Riddle(difficulty), |s| s.riddles.pop_front());
        Self::play(step).await
    }

    async fn fetch_truth_question(&self) -> Result<String, GenerationError> {
        let step = self.next(FetchKind::TruthQuestion, |s| s.truths.pop_front());
        Self::play(step).await
    }

    async fn fetch_dare_options(&self) -> Result<DareOptions, GenerationError> {
        let step = self.next(FetchKind::DareOptions, |s| s.dares.pop_front());
        Self::play(step).await
    }

    async fn fetch_speed_category(&self) -> Result<String, GenerationError> {
        let step = self.next(FetchKind::SpeedCategory, |s| s.categories.pop_front());
        Self::play(step).await
    }
}
