//! Note store configuration.
//!
//! # Responsibility
//! - Hold storage key names and persistence timing.
//! - Parse host-provided JSON overrides on top of defaults.
//!
//! # Invariants
//! - Storage keys are non-empty and pairwise distinct after `validate()`.
//! - The save debounce is at most [`MAX_SAVE_DEBOUNCE_MS`].

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_NOTES_KEY: &str = "notepad:pwa:notes";
pub const DEFAULT_LAST_SELECTED_KEY: &str = "notepad:pwa:selected";
pub const DEFAULT_THEME_KEY: &str = "notepad:pwa:theme";
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 450;
pub const MAX_SAVE_DEBOUNCE_MS: u64 = 60_000;
pub const DEFAULT_NEW_NOTE_TITLE: &str = "New note";

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid store config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Logical storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    /// Serialized note collection (JSON array).
    pub notes: String,
    /// Last selected note id (plain string).
    pub last_selected: String,
    /// Theme preference. Owned by UI code; the core never reads it.
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            notes: DEFAULT_NOTES_KEY.to_string(),
            last_selected: DEFAULT_LAST_SELECTED_KEY.to_string(),
            theme: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub storage_keys: StorageKeys,
    /// Quiet interval before a debounced save fires.
    pub save_debounce_ms: u64,
    /// Title given to notes created without one.
    pub new_note_title: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            new_note_title: DEFAULT_NEW_NOTE_TITLE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Parses JSON overrides; absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = [
            ("notes", &self.storage_keys.notes),
            ("lastSelected", &self.storage_keys.last_selected),
            ("theme", &self.storage_keys.theme),
        ];
        for (name, value) in keys {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "storage key `{name}` cannot be empty"
                )));
            }
        }
        for (index, (name, value)) in keys.iter().enumerate() {
            if let Some((other, _)) = keys[index + 1..].iter().find(|(_, other)| other == value) {
                return Err(ConfigError::Invalid(format!(
                    "storage keys `{name}` and `{other}` must differ"
                )));
            }
        }
        if self.save_debounce_ms > MAX_SAVE_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "saveDebounceMs must be <= {MAX_SAVE_DEBOUNCE_MS}, got {}",
                self.save_debounce_ms
            )));
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
