//! Key-value settings persistence and display preferences

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::error::{GameError, GameResult};

pub const THEME_KEY: &str = "appTheme";
pub const FONT_SIZE_KEY: &str = "appFontSize";

/// String key-value storage for user settings
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> GameResult<()>;
}

/// Settings kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings stored as a flat TOML table, rewritten on every change
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| GameError::Settings(format!("Failed to read {}: {}", path.display(), e)))?;
            toml::from_str(&content)
                .map_err(|e| GameError::Settings(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = values.len(), "Settings loaded");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> GameResult<()> {
        let content = toml::to_string(&self.values)
            .map_err(|e| GameError::Settings(format!("Failed to serialize settings: {}", e)))?;
        fs::write(&self.path, content)
            .map_err(|e| GameError::Settings(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Accent colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cyan,
    Emerald,
    Rose,
    Violet,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Cyan, Theme::Emerald, Theme::Rose, Theme::Violet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Cyan => "cyan",
            Theme::Emerald => "emerald",
            Theme::Rose => "rose",
            Theme::Violet => "violet",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Medium, FontSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontSize::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font size '{}'", s.trim()))
    }
}

/// Display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: FontSize,
}

impl Preferences {
    /// Read preferences, falling back to defaults for missing or unknown values
    pub fn load(store: &(impl SettingsStore + ?Sized)) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| v.parse::<Theme>().map_err(|e| warn!(error = %e, "Ignoring stored theme")).ok())
            .unwrap_or_default();
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|v| v.parse::<FontSize>().map_err(|e| warn!(error = %e, "Ignoring stored font size")).ok())
            .unwrap_or_default();
        Self { theme, font_size }
    }

    pub fn set_theme(&mut self, store: &mut (impl SettingsStore + ?Sized), theme: Theme) -> GameResult<()> {
        store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        Ok(())
    }

    pub fn set_font_size(&mut self, store: &mut (impl SettingsStore + ?Sized), font_size: FontSize) -> GameResult<()> {
        store.set(FONT_SIZE_KEY, font_size.as_str())?;
        self.font_size = font_size;
        Ok(())
    }
}
