use std::path::PathBuf;
use riddle_party::PartyConfig;

/// Everything the terminal app needs at startup
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub party: PartyConfig,
    /// Settings file; preferences are kept in memory when unset
    pub settings_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    pub history_file: Option<String>,
    pub max_history: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "riddle-party> ".to_string(),
            history_file: Some(".riddle_party_history".to_string()),
            max_history: 1000,
        }
    }
}
