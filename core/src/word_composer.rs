//! Composing buffer for the word currently being typed.
//!
//! The composer stores one [`KeyEntry`] per keystroke together with the
//! alternate codes reported by nearby-key detection. The display form of the
//! word is produced by a pluggable [`Converter`] and cached until the next
//! mutation.

use tracing::trace;

/// Character-conversion strategy (romaji to kana, Telex to Vietnamese, ...).
///
/// Implementations must be pure with respect to `typed`: converting the same
/// text twice yields the same output.
pub trait Converter {
    /// Append the converted form of `typed` to `output`.
    fn convert(&self, typed: &str, output: &mut String);
}

/// A single keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// The character the key produced
    pub code: char,
    /// Candidate codes for the touch, most likely first
    pub alternates: Vec<char>,
    /// Whether shift or caps lock was active
    pub shifted: bool,
}

/// How the current buffer content came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeOrigin {
    /// Built keystroke by keystroke
    #[default]
    Keystrokes,
    /// Replaced wholesale by [`WordComposer::force_typed_word`]
    Literal,
}

/// The in-flight composing word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordComposer {
    entries: Vec<KeyEntry>,
    typed: String,
    converted: Option<String>,
    preferred: Option<String>,
    capitalized: bool,
    caps_count: usize,
    origin: ComposeOrigin,
}

impl WordComposer {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(12),
            typed: String::with_capacity(20),
            ..Default::default()
        }
    }

    /// Number of keystrokes in the composing word.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    /// Alternate codes recorded for the keystroke at `index`.
    pub fn codes_at(&self, index: usize) -> Option<&[char]> {
        self.entries.get(index).map(|e| e.alternates.as_slice())
    }

    /// Append a keystroke without any shift or multi-tap handling.
    pub fn add(&mut self, code: char, alternates: &[char]) {
        self.push_entry(code, alternates, false);
    }

    /// Add a keystroke.
    ///
    /// With `replace` the last entry is overwritten instead (multi-tap cycling
    /// on the same key); the new code inherits the case of the one it
    /// replaces. The first keystroke of a word decides `is_capitalized`.
    ///
    /// Returns the code actually stored.
    pub fn add_character(
        &mut self,
        code: char,
        alternates: &[char],
        replace: bool,
        shifted: bool,
    ) -> char {
        let mut code = code;
        if replace {
            code = self.replace_last_character(code);
        }
        if shifted && self.entries.is_empty() {
            self.capitalized = true;
        }
        self.push_entry(code, alternates, shifted);
        code
    }

    fn replace_last_character(&mut self, code: char) -> char {
        match self.entries.last() {
            Some(last) => {
                let code = if last.code.is_uppercase() {
                    to_upper_single(code)
                } else {
                    code
                };
                self.delete_last();
                code
            }
            None => {
                trace!("multi-tap replace on an empty composer, appending instead");
                code
            }
        }
    }

    fn push_entry(&mut self, code: char, alternates: &[char], shifted: bool) {
        let mut alternates = alternates.to_vec();
        promote_primary(code, &mut alternates);
        self.typed.push(code);
        if code.is_uppercase() {
            self.caps_count += 1;
        }
        self.entries.push(KeyEntry {
            code,
            alternates,
            shifted,
        });
        self.converted = None;
    }

    /// Remove the last keystroke. Does nothing on an empty composer.
    pub fn delete_last(&mut self) {
        if let Some(entry) = self.entries.pop() {
            self.typed.pop();
            if entry.code.is_uppercase() {
                self.caps_count -= 1;
            }
            self.converted = None;
        }
    }

    /// Rewrite the last typed character in place (dakuten toggling and the
    /// like). Alternates and shift state are kept.
    pub fn map_last_typed<F: FnOnce(char) -> char>(&mut self, f: F) {
        let Some(entry) = self.entries.last_mut() else {
            return;
        };
        let old = entry.code;
        let new = f(old);
        if new == old {
            return;
        }
        entry.code = new;
        self.typed.pop();
        self.typed.push(new);
        if old.is_uppercase() {
            self.caps_count -= 1;
        }
        if new.is_uppercase() {
            self.caps_count += 1;
        }
        self.converted = None;
    }

    /// Clear the buffer.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.typed.clear();
        self.converted = None;
        self.preferred = None;
        self.capitalized = false;
        self.caps_count = 0;
        self.origin = ComposeOrigin::Keystrokes;
    }

    /// Replace the buffer with literally typed text, one entry per character.
    ///
    /// Used when an already committed word is taken back into composition.
    /// The capitalization decided by the first keystroke is kept.
    pub fn force_typed_word(&mut self, word: &str) {
        self.entries.clear();
        self.typed.clear();
        self.caps_count = 0;
        for c in word.chars() {
            self.push_entry(c, &[c], false);
        }
        self.converted = None;
        self.origin = ComposeOrigin::Literal;
    }

    pub fn origin(&self) -> ComposeOrigin {
        self.origin
    }

    /// Refresh the cached conversion.
    ///
    /// Without a converter the cache is dropped and [`Self::converted_word`]
    /// falls back to the typed word.
    pub fn convert_word(&mut self, converter: Option<&dyn Converter>) {
        self.converted = converter.map(|converter| {
            let mut output = String::with_capacity(self.typed.len());
            converter.convert(&self.typed, &mut output);
            output
        });
    }

    /// The word as typed, without conversion.
    pub fn typed_word(&self) -> &str {
        &self.typed
    }

    /// The last conversion, or the typed word if none is cached.
    pub fn converted_word(&self) -> &str {
        self.converted.as_deref().unwrap_or(&self.typed)
    }

    /// Whether `converted_word` reflects a conversion of the current entries.
    pub fn is_converted(&self) -> bool {
        self.converted.is_some()
    }

    /// Store the word picked from the candidate list until it is committed.
    pub fn set_preferred_word(&mut self, word: impl Into<String>) {
        self.preferred = Some(word.into());
    }

    /// The picked word, or the converted word when nothing was picked.
    pub fn preferred_word(&self) -> &str {
        self.preferred
            .as_deref()
            .unwrap_or_else(|| self.converted_word())
    }

    /// Whether the first keystroke was typed with shift.
    pub fn is_capitalized(&self) -> bool {
        self.capitalized
    }

    pub fn is_all_upper_case(&self) -> bool {
        self.caps_count > 0 && self.caps_count == self.entries.len()
    }

    /// True when more than one typed character is upper case.
    pub fn is_mostly_caps(&self) -> bool {
        self.caps_count > 1
    }
}

// The touch may land closer to a neighbour than to the key that was finally
// chosen; keep the chosen code first.
fn promote_primary(code: char, alternates: &mut [char]) {
    if alternates.len() >= 2 && alternates[0] != code && alternates[1] == code {
        alternates.swap(0, 1);
    }
}

fn to_upper_single(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    impl Converter for Shout {
        fn convert(&self, typed: &str, output: &mut String) {
            output.push_str(&typed.to_uppercase());
        }
    }

    fn typed(composer: &mut WordComposer, word: &str) {
        for c in word.chars() {
            composer.add_character(c, &[c], false, false);
        }
    }

    #[test]
    fn test_size_tracks_non_replacing_adds() {
        let mut composer = WordComposer::new();
        for (i, c) in "hello".chars().enumerate() {
            composer.add_character(c, &[c], false, false);
            assert_eq!(composer.size(), i + 1);
        }
        assert_eq!(composer.typed_word(), "hello");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut composer = WordComposer::new();
        composer.add_character('H', &['H'], false, true);
        composer.set_preferred_word("Hi");
        composer.convert_word(Some(&Shout));
        composer.reset();
        assert_eq!(composer.size(), 0);
        assert!(!composer.is_capitalized());
        assert!(!composer.is_converted());
        assert_eq!(composer.preferred_word(), "");
        assert_eq!(composer.origin(), ComposeOrigin::Keystrokes);
    }

    #[test]
    fn test_capitalized_only_from_first_entry() {
        let mut composer = WordComposer::new();
        composer.add_character('a', &['a'], false, false);
        composer.add_character('B', &['B'], false, true);
        assert!(!composer.is_capitalized());

        composer.reset();
        composer.add_character('A', &['A'], false, true);
        composer.add_character('b', &['b'], false, false);
        assert!(composer.is_capitalized());
    }

    #[test]
    fn test_multitap_replace_overwrites_and_keeps_case() {
        let mut composer = WordComposer::new();
        composer.add_character('A', &['A'], false, true);
        let stored = composer.add_character('b', &['b'], true, false);
        assert_eq!(stored, 'B');
        assert_eq!(composer.size(), 1);
        assert_eq!(composer.typed_word(), "B");
    }

    #[test]
    fn test_replace_on_empty_appends() {
        let mut composer = WordComposer::new();
        composer.add_character('x', &['x'], true, false);
        assert_eq!(composer.typed_word(), "x");
    }

    #[test]
    fn test_primary_promoted_in_alternates() {
        let mut composer = WordComposer::new();
        composer.add('s', &['a', 's', 'd']);
        assert_eq!(composer.codes_at(0), Some(&['s', 'a', 'd'][..]));
        assert_eq!(composer.codes_at(1), None);
    }

    #[test]
    fn test_conversion_cached_until_mutation() {
        let mut composer = WordComposer::new();
        typed(&mut composer, "abc");
        composer.convert_word(Some(&Shout));
        assert_eq!(composer.converted_word(), "ABC");

        composer.delete_last();
        assert!(!composer.is_converted());
        assert_eq!(composer.converted_word(), "ab");

        composer.convert_word(Some(&Shout));
        composer.convert_word(Some(&Shout));
        assert_eq!(composer.converted_word(), "AB");
    }

    #[test]
    fn test_no_converter_falls_back_to_typed() {
        let mut composer = WordComposer::new();
        typed(&mut composer, "abc");
        composer.convert_word(Some(&Shout));
        composer.convert_word(None);
        assert_eq!(composer.converted_word(), "abc");
    }

    #[test]
    fn test_delete_last_on_empty_is_noop() {
        let mut composer = WordComposer::new();
        composer.delete_last();
        assert_eq!(composer.size(), 0);
    }

    #[test]
    fn test_force_typed_word_marks_literal() {
        let mut composer = WordComposer::new();
        composer.add_character('W', &['W'], false, true);
        composer.force_typed_word("World");
        assert_eq!(composer.size(), 5);
        assert_eq!(composer.typed_word(), "World");
        assert_eq!(composer.origin(), ComposeOrigin::Literal);
        assert!(composer.is_capitalized());
        assert!(!composer.is_mostly_caps());
    }

    #[test]
    fn test_caps_counting() {
        let mut composer = WordComposer::new();
        typed(&mut composer, "NASA");
        assert!(composer.is_all_upper_case());
        assert!(composer.is_mostly_caps());
        composer.add('s', &['s']);
        assert!(!composer.is_all_upper_case());
        composer.delete_last();
        assert!(composer.is_all_upper_case());
    }

    #[test]
    fn test_map_last_typed() {
        let mut composer = WordComposer::new();
        typed(&mut composer, "ab");
        composer.convert_word(Some(&Shout));
        composer.map_last_typed(|c| c.to_ascii_uppercase());
        assert_eq!(composer.typed_word(), "aB");
        assert!(!composer.is_converted());
        assert_eq!(composer.entries()[1].code, 'B');
    }

    #[test]
    fn test_preferred_word_falls_back() {
        let mut composer = WordComposer::new();
        typed(&mut composer, "teh");
        assert_eq!(composer.preferred_word(), "teh");
        composer.set_preferred_word("the");
        assert_eq!(composer.preferred_word(), "the");
    }
}
