//! smartkbd-lang crate root
//!
//! Layout-specific pieces built on `smartkbd-core`: composing converters,
//! the dakuten toggle for kana layouts, layout configuration and the key
//! dispatcher used by the `smartkbd` driver.
//!
//! Public API exported here:
//! - `TelexConverter` from `telex`
//! - `convert_dakuten` and `handle_dakuten` from `dakuten`
//! - `LangConfig` and `ConverterKind` from `config`
//! - `KeyDispatcher`, `KeyEvent` and `parse_script` from `dispatch`

pub mod config;
pub mod dakuten;
pub mod dispatch;
pub mod telex;

pub use config::{ConverterKind, LangConfig};
pub use dakuten::{convert_dakuten, handle_dakuten};
pub use dispatch::{parse_script, KeyDispatcher, KeyEvent, KeyResult};
pub use telex::TelexConverter;

pub use smartkbd_core::{Config, InputController, KeyboardContext, MemorySurface};
