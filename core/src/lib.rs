//! smartkbd-core
//!
//! Text-composition and editing controller for a software keyboard. Turns
//! keystrokes into edits against a host text field, keeps the in-flight
//! composing word, classifies word and sentence separators, and applies the
//! small auto-punctuation fixes (double space to period, period/space
//! reswap).
//!
//! Public API:
//! - `InputController` - Orchestrates composing, deletion and punctuation
//! - `WordComposer` - Keystroke buffer with cached converted rendering
//! - `Converter` - Pluggable conversion strategy for the composing word
//! - `EditingSurface` - What the controller needs from the text field
//! - `InputHost` - Session access and notifications from the keyboard service
//! - `SeparatorTables` - Word/sentence separator classification
//! - `Config` - Configuration and feature flags
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub mod separators;
pub use separators::{SeparatorTables, SENTENCE_SEPARATORS, WORD_SEPARATORS};

pub mod word_composer;
pub use word_composer::{ComposeOrigin, Converter, KeyEntry, WordComposer};

pub mod surface;
pub use surface::{BatchEdit, EditingSurface};

pub mod memory_surface;
pub use memory_surface::MemorySurface;

pub mod editing;
pub use editing::{delete_word_at_cursor, word_range_at_cursor, WordRange};

pub mod context;
pub use context::{InputHost, KeyboardContext};

pub mod prediction;
pub use prediction::Prediction;

pub mod input_controller;
pub use input_controller::InputController;

/// Keyboard behaviour switches.
///
/// Only `apostrophe_separator` is read by the controller itself; the other
/// switches tell the key dispatcher which controller operations to invoke.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Treat the apostrophe as a word boundary ("don't" becomes two words)
    pub apostrophe_separator: bool,

    /// Replace "word␣␣" with "word.␣"
    pub double_space_period: bool,

    /// Replace ".␣." with "␣.." when a period follows an auto-inserted space
    pub swap_period_space: bool,

    /// Route letters through the composing buffer instead of committing
    /// them one by one
    pub composing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apostrophe_separator: false,
            double_space_period: true,
            swap_period_space: true,
            composing: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Separator tables matching this configuration.
    pub fn separators(&self) -> SeparatorTables {
        SeparatorTables::new(self.apostrophe_separator)
    }
}
