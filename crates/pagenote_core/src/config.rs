//! Runtime configuration for the editor and the autosave engine.
//!
//! # Responsibility
//! - Hold every tunable timing and editor-policy value in one place.
//! - Load overrides from JSON, falling back to defaults per field.
//!
//! # Invariants
//! - Zero durations and zero table sizes are replaced by defaults, so a
//!   partially written config file never disables debouncing or draft expiry.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1_200;
pub const DEFAULT_SAVED_DISPLAY_MS: u64 = 1_500;
pub const DEFAULT_DRAFT_TTL_MS: u64 = 24 * 60 * 60 * 1_000;
pub const DEFAULT_TABLE_ROWS: usize = 3;
pub const DEFAULT_TABLE_COLUMNS: usize = 3;
pub const DEFAULT_SLASH_MENU_WIDTH: f32 = 240.0;
pub const DEFAULT_SLASH_MENU_HEIGHT: f32 = 320.0;
pub const DEFAULT_SLASH_MENU_GAP: f32 = 4.0;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Command-layer policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Coerce a non-empty first block into `heading level 1`.
    pub enforce_title: bool,
    /// Size of tables inserted from the slash menu.
    pub table_rows: usize,
    pub table_columns: usize,
    /// Slash menu footprint used for viewport clamping.
    pub slash_menu_width: f32,
    pub slash_menu_height: f32,
    /// Vertical distance between caret and menu.
    pub slash_menu_gap: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            enforce_title: true,
            table_rows: DEFAULT_TABLE_ROWS,
            table_columns: DEFAULT_TABLE_COLUMNS,
            slash_menu_width: DEFAULT_SLASH_MENU_WIDTH,
            slash_menu_height: DEFAULT_SLASH_MENU_HEIGHT,
            slash_menu_gap: DEFAULT_SLASH_MENU_GAP,
        }
    }
}

impl EditorConfig {
    pub fn normalized(mut self) -> Self {
        if self.table_rows == 0 {
            self.table_rows = DEFAULT_TABLE_ROWS;
        }
        if self.table_columns == 0 {
            self.table_columns = DEFAULT_TABLE_COLUMNS;
        }
        if self.slash_menu_width <= 0.0 {
            self.slash_menu_width = DEFAULT_SLASH_MENU_WIDTH;
        }
        if self.slash_menu_height <= 0.0 {
            self.slash_menu_height = DEFAULT_SLASH_MENU_HEIGHT;
        }
        if self.slash_menu_gap < 0.0 {
            self.slash_menu_gap = DEFAULT_SLASH_MENU_GAP;
        }
        self
    }
}

/// Autosave timing policy, all values in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Inactivity window before a remote commit fires.
    pub debounce_ms: u64,
    /// How long `Saved` is displayed before returning to `Idle`.
    pub saved_display_ms: u64,
    /// Local draft validity window.
    pub draft_ttl_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            saved_display_ms: DEFAULT_SAVED_DISPLAY_MS,
            draft_ttl_ms: DEFAULT_DRAFT_TTL_MS,
        }
    }
}

impl AutosaveConfig {
    pub fn normalized(mut self) -> Self {
        if self.debounce_ms == 0 {
            self.debounce_ms = DEFAULT_DEBOUNCE_MS;
        }
        if self.saved_display_ms == 0 {
            self.saved_display_ms = DEFAULT_SAVED_DISPLAY_MS;
        }
        if self.draft_ttl_ms == 0 {
            self.draft_ttl_ms = DEFAULT_DRAFT_TTL_MS;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagenoteConfig {
    pub editor: EditorConfig,
    pub autosave: AutosaveConfig,
}

impl PagenoteConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.normalized())
    }

    /// Reads a JSON config file. A missing file yields defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn normalized(self) -> Self {
        Self {
            editor: self.editor.normalized(),
            autosave: self.autosave.normalized(),
        }
    }
}
