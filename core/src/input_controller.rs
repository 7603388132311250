//! Input controller: turns keystrokes into edits on the host text field.
//!
//! The controller owns the composing word, the last observed selection and
//! the prediction state. Every operation that needs an editing session
//! checks for one first and silently does nothing without it. Multi-step
//! edits are wrapped in a [`BatchEdit`] so the host sees them as one change.

use crate::context::InputHost;
use crate::editing::delete_word_at_cursor;
use crate::prediction::Prediction;
use crate::separators::SeparatorTables;
use crate::surface::{BatchEdit, EditingSurface};
use crate::word_composer::WordComposer;
use crate::Config;
use tracing::{debug, trace};

const SPACE: char = ' ';
const NON_BREAKING_SPACE: char = '\u{00a0}';
const PERIOD: char = '.';

/// Composing and editing controller for one keyboard.
pub struct InputController<H: InputHost> {
    host: H,
    composer: WordComposer,
    separators: SeparatorTables,
    last_selection_start: usize,
    last_selection_end: usize,
    prediction: Prediction,
}

impl<H: InputHost> InputController<H> {
    pub fn new(host: H, apostrophe_separator: bool) -> Self {
        Self {
            host,
            composer: WordComposer::new(),
            separators: SeparatorTables::new(apostrophe_separator),
            last_selection_start: 0,
            last_selection_end: 0,
            prediction: Prediction::Idle,
        }
    }

    pub fn from_config(host: H, config: &Config) -> Self {
        Self::new(host, config.apostrophe_separator)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// The composing word.
    pub fn composer(&self) -> &WordComposer {
        &self.composer
    }

    pub fn separators(&self) -> SeparatorTables {
        self.separators
    }

    // ========== Prediction state ==========

    pub fn prediction(&self) -> Prediction {
        self.prediction
    }

    pub fn predicting(&self) -> bool {
        self.prediction.is_predicting()
    }

    pub fn start_predicting(&mut self) {
        if self.prediction.start() {
            trace!("prediction started");
        }
    }

    pub fn stop_predicting(&mut self) {
        if self.prediction.stop() {
            trace!("prediction stopped");
        }
    }

    // ========== Selection tracking ==========

    /// Record a selection change reported by the host.
    pub fn on_selection_changed(&mut self, start: usize, end: usize) {
        self.last_selection_start = start.min(end);
        self.last_selection_end = start.max(end);
    }

    pub fn last_selection(&self) -> (usize, usize) {
        (self.last_selection_start, self.last_selection_end)
    }

    pub fn is_last_selection_empty(&self) -> bool {
        self.last_selection_start == self.last_selection_end
    }

    // ========== Batching ==========

    /// Run `f` inside one batch edit on the current session. Several
    /// controller calls made for one key reach the host as a single change.
    pub fn batch_edit<R, F: FnOnce(&mut Self) -> R>(&mut self, f: F) -> R {
        let opened = match self.host.surface() {
            Some(surface) => {
                surface.begin_batch_edit();
                true
            }
            None => false,
        };
        let result = f(self);
        if opened {
            if let Some(surface) = self.host.surface() {
                surface.end_batch_edit();
            }
        }
        result
    }

    // ========== Character insertion ==========

    /// Add a keystroke to the composing word and refresh the composing text.
    ///
    /// Returns the code stored by the composer (multi-tap replacement may
    /// change its case).
    pub fn add_character_with_composing(
        &mut self,
        code: char,
        alternates: &[char],
        replace: bool,
        shifted: bool,
    ) -> char {
        let stored = self
            .composer
            .add_character(code, alternates, replace, shifted);
        if !self.composer.is_empty() {
            self.start_predicting();
        }
        self.set_composing_text(false);
        stored
    }

    /// Insert a character directly, bypassing the composer.
    ///
    /// With `replace` the character before the cursor is removed first. Keys
    /// from a hardware keyboard are committed as text so modifier
    /// combinations survive; soft-keyboard characters in the basic
    /// multilingual plane go through the key-event path, anything above it
    /// is committed as text.
    pub fn add_character_without_composing(
        &mut self,
        code: char,
        replace: bool,
        hard_input_device: bool,
    ) {
        let Some(surface) = self.host.surface() else {
            no_session("add_character_without_composing");
            return;
        };
        let mut batch = BatchEdit::begin(surface);
        if replace {
            batch.delete_surrounding_text(1, 0);
        }
        let mut buf = [0u8; 4];
        if hard_input_device {
            batch.commit_text(code.encode_utf8(&mut buf), 1);
        } else if u32::from(code) <= 0xffff {
            batch.send_key_char(code);
        } else {
            batch.commit_text(code.encode_utf8(&mut buf), 1);
        }
    }

    /// Push the converted composing word to the surface.
    ///
    /// Skipped when a predictive display renders the composing text itself,
    /// unless `force` is set.
    pub fn set_composing_text(&mut self, force: bool) {
        if self.host.surface().is_none() {
            no_session("set_composing_text");
            return;
        }
        if !force && self.host.is_predictive_display_on() {
            debug!("predictive display owns the composing text");
            return;
        }
        self.composer.convert_word(self.host.converter());
        let converted = self.composer.converted_word().to_owned();
        self.host.set_converted_composing(&converted);
        if let Some(surface) = self.host.surface() {
            surface.set_composing_text(&converted, 1);
        }
    }

    // ========== Auto-punctuation ==========

    /// Turn "x␣␣" before the cursor into "x.␣".
    ///
    /// Either space may be a non-breaking space; `x` is a letter or digit.
    pub fn insert_period_on_double_space(&mut self) {
        let Some(surface) = self.host.surface() else {
            no_session("insert_period_on_double_space");
            return;
        };
        let last_three: Vec<char> = surface.text_before_cursor(3).chars().collect();
        let &[first, second, third] = last_three.as_slice() else {
            return;
        };
        if !(is_letter_or_digit(first) && is_space(second) && is_space(third)) {
            return;
        }
        {
            let mut batch = BatchEdit::begin(surface);
            batch.delete_surrounding_text(2, 0);
            batch.commit_text(". ", 1);
        }
        trace!("double space replaced by period");
        self.host.update_shift_state();
    }

    /// Turn ".␣." before the cursor into "␣..".
    pub fn reswap_period_and_space(&mut self) {
        let Some(surface) = self.host.surface() else {
            no_session("reswap_period_and_space");
            return;
        };
        let last_three: Vec<char> = surface.text_before_cursor(3).chars().collect();
        if last_three != [PERIOD, SPACE, PERIOD] {
            return;
        }
        {
            let mut batch = BatchEdit::begin(surface);
            batch.delete_surrounding_text(3, 0);
            batch.commit_text(" ..", 1);
        }
        trace!("period and space reswapped");
        self.host.update_shift_state();
    }

    // ========== Deletion ==========

    /// Backspace while composing.
    ///
    /// Removes the last keystroke from the composer. When that empties the
    /// word the composing text is re-rendered even under a predictive
    /// display, so no stale glyphs remain. With an empty composer one
    /// character is deleted from the surface instead.
    pub fn delete_last_predicting_character(&mut self) {
        let length = self.composer.size();
        if length > 0 {
            self.composer.delete_last();
            self.set_composing_text(length == 1);
            if self.composer.is_empty() {
                self.stop_predicting();
            }
            self.host.post_update_suggestions();
        } else if let Some(surface) = self.host.surface() {
            surface.delete_surrounding_text(1, 0);
        } else {
            no_session("delete_last_predicting_character");
        }
    }

    /// Delete `count` characters before the cursor, sparing the first one if
    /// it is a word separator.
    pub fn delete_last_characters(&mut self, count: usize) {
        let Some(surface) = self.host.surface() else {
            no_session("delete_last_characters");
            return;
        };
        let to_the_left = surface.text_before_cursor(count);
        let mut remaining = count;
        if let Some(first) = to_the_left.chars().next() {
            if self.separators.is_word_separator(first) {
                remaining -= 1;
            }
        }
        surface.delete_surrounding_text(remaining, 0);
    }

    /// Delete the word at the cursor, collapsing a non-empty selection to
    /// its start first.
    pub fn delete_selected_word(&mut self) {
        let selection = self.last_selection();
        let separators = self.separators;
        let Some(surface) = self.host.surface() else {
            no_session("delete_selected_word");
            return;
        };
        delete_selected_word_in(surface, selection, separators);
    }

    // ========== Commits ==========

    /// Commit a suggestion picked by the user. When `correcting`, the word
    /// at the cursor is removed first.
    pub fn commit_picked_suggestion(&mut self, text: &str, correcting: bool) {
        let selection = self.last_selection();
        let separators = self.separators;
        let Some(surface) = self.host.surface() else {
            no_session("commit_picked_suggestion");
            return;
        };
        let mut batch = BatchEdit::begin(surface);
        if correcting {
            delete_selected_word_in(&mut *batch, selection, separators);
        }
        batch.commit_text(text, 1);
    }

    /// Commit the composing word as typed (or as picked) and leave the
    /// predicting state.
    ///
    /// Returns the committed text, or `None` when nothing was being
    /// predicted, the word was empty, or there is no session. The composer
    /// is reset in every case where prediction was active.
    pub fn commit_typed_word(&mut self) -> Option<String> {
        if !self.prediction.stop() {
            return None;
        }
        if !self.composer.is_converted() {
            self.composer.convert_word(self.host.converter());
        }
        let word = self.composer.preferred_word().to_owned();
        self.composer.reset();
        self.host.post_update_suggestions();

        if word.is_empty() {
            return None;
        }
        let Some(surface) = self.host.surface() else {
            no_session("commit_typed_word");
            return None;
        };
        surface.commit_text(&word, 1);
        trace!(word = %word, "typed word committed");
        Some(word)
    }

    // ========== Cursor queries ==========

    /// True when nothing follows the cursor.
    pub fn is_cursor_at_end(&self) -> bool {
        match self.host.surface_ref() {
            Some(surface) => surface.text_after_cursor(1).is_empty(),
            None => false,
        }
    }

    /// True when a non-separator is directly before or after the cursor.
    pub fn is_cursor_touching_word(&self) -> bool {
        let separators = self.separators;
        let Some(surface) = self.host.surface_ref() else {
            return false;
        };
        let is_word_char = |text: String| {
            text.chars()
                .next()
                .is_some_and(|c| !separators.is_word_separator(c))
        };
        is_word_char(surface.text_before_cursor(1)) || is_word_char(surface.text_after_cursor(1))
    }

    /// True only when non-separators sit on both sides of the cursor.
    pub fn is_cursor_inside_word(&self) -> bool {
        let separators = self.separators;
        let Some(surface) = self.host.surface_ref() else {
            return false;
        };
        let is_word_char = |text: String| {
            text.chars()
                .next()
                .is_some_and(|c| !separators.is_word_separator(c))
        };
        is_word_char(surface.text_before_cursor(1)) && is_word_char(surface.text_after_cursor(1))
    }

    // ========== Composer management ==========

    /// Whether the composing word started with shift.
    pub fn prefer_capitalization(&self) -> bool {
        self.composer.is_capitalized()
    }

    /// Replace the composer with a copy of `previous` (re-entering a word),
    /// or reset it when `None`.
    pub fn reset_word_composer(&mut self, previous: Option<&WordComposer>) {
        match previous {
            Some(word) => {
                self.composer = word.clone();
                if self.composer.is_empty() {
                    self.stop_predicting();
                } else {
                    self.start_predicting();
                }
            }
            None => {
                self.composer.reset();
                self.stop_predicting();
            }
        }
    }

    pub fn force_typed_word(&mut self, word: &str) {
        self.composer.force_typed_word(word);
    }

    /// Rewrite the composing word in place (dakuten key and the like) and
    /// re-render it. Does nothing unless a word is being composed.
    pub fn edit_composing_word<F: FnOnce(&mut WordComposer)>(&mut self, f: F) -> bool {
        if !self.predicting() {
            return false;
        }
        f(&mut self.composer);
        self.set_composing_text(false);
        self.host.post_update_suggestions();
        true
    }

    // ========== Separators ==========

    pub fn word_separators(&self) -> &'static str {
        self.separators.word_separators()
    }

    pub fn is_word_separator(&self, code: char) -> bool {
        self.separators.is_word_separator(code)
    }

    pub fn is_sentence_separator(&self, code: char) -> bool {
        self.separators.is_sentence_separator(code)
    }
}

fn delete_selected_word_in(
    surface: &mut dyn EditingSurface,
    (start, end): (usize, usize),
    separators: SeparatorTables,
) {
    if start < end {
        surface.set_selection(start, start);
    }
    delete_word_at_cursor(surface, |c| separators.is_word_separator(c));
}

/// Letters and decimal digits. Other numerics such as `½` or `²` do not
/// end a sentence.
fn is_letter_or_digit(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit()
}

fn is_space(c: char) -> bool {
    c == SPACE || c == NON_BREAKING_SPACE
}

fn no_session(op: &'static str) {
    debug!(op, "no editing session");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::KeyboardContext;
    use crate::memory_surface::MemorySurface;
    use tracing_test::traced_test;

    fn controller(text: &str) -> InputController<KeyboardContext> {
        InputController::new(
            KeyboardContext::with_surface(MemorySurface::with_text(text)),
            false,
        )
    }

    fn detached() -> InputController<KeyboardContext> {
        InputController::new(KeyboardContext::detached(), false)
    }

    #[test]
    fn test_selection_is_normalized() {
        let mut ctl = detached();
        ctl.on_selection_changed(7, 3);
        assert_eq!(ctl.last_selection(), (3, 7));
        assert!(!ctl.is_last_selection_empty());
    }

    #[traced_test]
    #[test]
    fn test_missing_session_is_logged() {
        let mut ctl = detached();
        ctl.insert_period_on_double_space();
        assert!(logs_contain("no editing session"));
    }

    #[test]
    fn test_reset_with_snapshot_enters_prediction() {
        let mut snapshot = WordComposer::new();
        snapshot.force_typed_word("again");
        let mut ctl = detached();
        ctl.reset_word_composer(Some(&snapshot));
        assert!(ctl.predicting());
        assert_eq!(ctl.composer().typed_word(), "again");

        ctl.reset_word_composer(None);
        assert!(!ctl.predicting());
        assert!(ctl.composer().is_empty());
    }

    #[test]
    fn test_commit_typed_word_without_prediction() {
        let mut ctl = controller("");
        assert_eq!(ctl.commit_typed_word(), None);
    }
}
