//! Layout-level configuration that extends the core `Config`.
//!
//! Adds the choice of composing converter on top of the keyboard behaviour
//! switches, which are flattened into the same table:
//!
//! ```toml
//! apostrophe_separator = false
//! double_space_period = true
//! converter = "telex"
//! ```

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use smartkbd_core::Converter;

use crate::telex::TelexConverter;

/// Which converter renders the composing word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Composing text is shown as typed
    #[default]
    None,
    /// Vietnamese Telex
    Telex,
}

impl ConverterKind {
    /// Instantiate the converter, `None` for plain composing.
    pub fn build(self) -> Option<Box<dyn Converter>> {
        match self {
            ConverterKind::None => None,
            ConverterKind::Telex => Some(Box::new(TelexConverter::new())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LangConfig {
    /// Keyboard behaviour switches
    #[serde(flatten)]
    pub base: smartkbd_core::Config,

    #[serde(default)]
    pub converter: ConverterKind,
}

impl LangConfig {
    pub fn base(&self) -> &smartkbd_core::Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut smartkbd_core::Config {
        &mut self.base
    }

    /// Drop the layout options, keeping the core switches.
    pub fn into_base(self) -> smartkbd_core::Config {
        self.base
    }

    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
