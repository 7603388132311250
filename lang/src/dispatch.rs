//! Key dispatch for the soft keyboard.
//!
//! `KeyDispatcher` turns key events into calls on the `InputController`,
//! the way the keyboard service does: letters and other word characters
//! compose (unless the cursor sits against an existing word), word
//! separators commit the typed word and are sent directly, after which the
//! configured auto-punctuation fixes run. Everything a separator key does
//! lands in one batch edit.

use anyhow::{bail, Context as _};
use smartkbd_core::{InputController, InputHost, KeyboardContext, MemorySurface};
use tracing::trace;

use crate::config::LangConfig;
use crate::dakuten::handle_dakuten;

/// Key events understood by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// Character key
    Char(char),
    /// Character key pressed with shift
    Shifted(char),
    /// Backspace key
    Backspace,
    /// Suggestion picked from the candidate strip
    Pick(String),
    /// Dakuten key of kana layouts
    Dakuten,
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was applied to the editing session
    Handled,
    /// No editing session is attached
    NotHandled,
}

pub struct KeyDispatcher {
    controller: InputController<KeyboardContext>,
    config: LangConfig,
}

impl KeyDispatcher {
    /// Dispatcher editing `surface` with the converter named by `config`.
    pub fn new(config: LangConfig, surface: MemorySurface) -> Self {
        let mut host = KeyboardContext::with_surface(surface);
        host.set_converter(config.converter.build());
        let mut controller = InputController::from_config(host, config.base());
        let (start, end) = surface_selection(&controller);
        controller.on_selection_changed(start, end);
        Self { controller, config }
    }

    pub fn config(&self) -> &LangConfig {
        &self.config
    }

    pub fn controller(&self) -> &InputController<KeyboardContext> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InputController<KeyboardContext> {
        &mut self.controller
    }

    pub fn surface(&self) -> Option<&MemorySurface> {
        self.controller.host().surface.as_ref()
    }

    /// Apply one key event.
    pub fn process_key(&mut self, key: KeyEvent) -> KeyResult {
        if self.controller.host_mut().surface().is_none() {
            return KeyResult::NotHandled;
        }
        trace!(?key, "process key");

        match key {
            KeyEvent::Char(c) => self.handle_character(c, false),
            KeyEvent::Shifted(c) => self.handle_character(upper(c), true),
            KeyEvent::Backspace => self.handle_backspace(),
            KeyEvent::Pick(word) => self.pick_suggestion(&word),
            KeyEvent::Dakuten => {
                self.controller.edit_composing_word(handle_dakuten);
            }
        }

        let (start, end) = surface_selection(&self.controller);
        self.controller.on_selection_changed(start, end);
        KeyResult::Handled
    }

    /// Apply a sequence of key events.
    pub fn process_keys<I: IntoIterator<Item = KeyEvent>>(&mut self, keys: I) {
        for key in keys {
            self.process_key(key);
        }
    }

    /// Commit whatever is still composing.
    pub fn finish(&mut self) -> Option<String> {
        let committed = self.controller.commit_typed_word();
        let (start, end) = surface_selection(&self.controller);
        self.controller.on_selection_changed(start, end);
        committed
    }

    fn handle_character(&mut self, code: char, shifted: bool) {
        if self.controller.is_word_separator(code) {
            self.handle_separator(code);
            return;
        }
        if !self.controller.predicting() && self.composing_needed() {
            // New word: drop whatever the previous one left behind
            self.controller.reset_word_composer(None);
            self.controller.start_predicting();
        }
        if self.controller.predicting() {
            self.controller
                .add_character_with_composing(code, &[code], false, shifted);
            self.controller.host_mut().post_update_suggestions();
        } else {
            self.controller
                .add_character_without_composing(code, false, false);
        }
    }

    /// Composing starts only away from existing words; typing inside or
    /// against a word edits it directly.
    fn composing_needed(&self) -> bool {
        self.config.base.composing && !self.controller.is_cursor_touching_word()
    }

    fn handle_separator(&mut self, code: char) {
        let double_space_period = self.config.base.double_space_period;
        let swap_period_space = self.config.base.swap_period_space;
        self.controller.batch_edit(|ctl| {
            ctl.commit_typed_word();
            ctl.add_character_without_composing(code, false, false);
            match code {
                ' ' if double_space_period => ctl.insert_period_on_double_space(),
                '.' if swap_period_space => ctl.reswap_period_and_space(),
                _ => {}
            }
        });
    }

    fn handle_backspace(&mut self) {
        // An empty composer falls through to a one-character surface delete
        self.controller.delete_last_predicting_character();
    }

    fn pick_suggestion(&mut self, word: &str) {
        let correcting = !self.controller.predicting() && self.controller.is_cursor_touching_word();
        self.controller.commit_picked_suggestion(word, correcting);
        self.controller.reset_word_composer(None);
        self.controller.host_mut().post_update_suggestions();
    }
}

fn surface_selection(controller: &InputController<KeyboardContext>) -> (usize, usize) {
    controller
        .host()
        .surface
        .as_ref()
        .map(|s| s.selection())
        .unwrap_or_default()
}

fn upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Parse a key script.
///
/// Plain characters are key presses, `^x` is a shifted `x`, `<BS>` is a
/// backspace, `<DAK>` is the dakuten key, `<PICK:word>` picks `word` from
/// the suggestions and `<U+hex>` types a code point. `<<` types a literal
/// `<`.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    let mut chars = script.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        match c {
            '^' => match chars.next() {
                Some((_, shifted)) => keys.push(KeyEvent::Shifted(shifted)),
                None => bail!("dangling '^' at offset {at}"),
            },
            '<' if chars.peek().map(|&(_, c)| c) == Some('<') => {
                chars.next();
                keys.push(KeyEvent::Char('<'));
            }
            '<' => {
                let rest = &script[at + 1..];
                let close = rest
                    .find('>')
                    .with_context(|| format!("unterminated tag at offset {at}"))?;
                let tag = &rest[..close];
                keys.push(parse_tag(tag).with_context(|| format!("in tag <{tag}>"))?);
                // Skip the tag body and the closing '>'
                while let Some((i, _)) = chars.peek() {
                    if *i > at + close + 1 {
                        break;
                    }
                    chars.next();
                }
            }
            _ => keys.push(KeyEvent::Char(c)),
        }
    }
    Ok(keys)
}

fn parse_tag(tag: &str) -> anyhow::Result<KeyEvent> {
    if tag.eq_ignore_ascii_case("bs") {
        return Ok(KeyEvent::Backspace);
    }
    if tag.eq_ignore_ascii_case("dak") {
        return Ok(KeyEvent::Dakuten);
    }
    if let Some(word) = tag.strip_prefix("PICK:") {
        if word.is_empty() {
            bail!("empty suggestion");
        }
        return Ok(KeyEvent::Pick(word.to_string()));
    }
    if let Some(hex) = tag.strip_prefix("U+") {
        let code = u32::from_str_radix(hex, 16)
            .with_context(|| format!("bad code point {hex}"))?;
        let c = char::from_u32(code).with_context(|| format!("invalid code point U+{hex}"))?;
        return Ok(KeyEvent::Char(c));
    }
    bail!("unknown key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_keys_are_traced() {
        let mut dispatcher = KeyDispatcher::new(LangConfig::default(), MemorySurface::new());
        assert_eq!(dispatcher.process_key(KeyEvent::Char('a')), KeyResult::Handled);
        assert!(logs_contain("process key"));
    }

    #[test]
    fn test_parse_plain_and_shifted() {
        let keys = parse_script("^hi").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyEvent::Shifted('h'),
                KeyEvent::Char('i'),
            ]
        );
    }

    #[test]
    fn test_parse_tags() {
        let keys = parse_script("a<BS><DAK><PICK:hello>b").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyEvent::Char('a'),
                KeyEvent::Backspace,
                KeyEvent::Dakuten,
                KeyEvent::Pick("hello".to_string()),
                KeyEvent::Char('b'),
            ]
        );
    }

    #[test]
    fn test_parse_escapes_and_code_points() {
        let keys = parse_script("<<^^<U+1F600>").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyEvent::Char('<'),
                KeyEvent::Shifted('^'),
                KeyEvent::Char('\u{1F600}'),
            ]
        );
    }

    #[test]
    fn test_parse_errors_name_the_token() {
        let err = parse_script("ab<FOO>").unwrap_err();
        assert!(format!("{err:#}").contains("<FOO>"));
        assert!(parse_script("a<BS").is_err());
        assert!(parse_script("a^").is_err());
        assert!(parse_script("<U+D800>").is_err());
    }

    #[test]
    fn test_upper_keeps_multi_char_uppercase() {
        assert_eq!(upper('a'), 'A');
        assert_eq!(upper('ß'), 'ß');
    }
}
