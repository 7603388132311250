//! Word and sentence separator classification.
//!
//! The tables are fixed strings scanned linearly; lookups never allocate.

/// Code points that end a word.
///
/// Covers ASCII punctuation and whitespace (including the non-breaking
/// space) plus the CJK, full-width and Arabic punctuation variants the
/// keyboard layouts can emit. The apostrophe is not listed; whether it
/// separates words is decided by [`SeparatorTables::apostrophe_separator`].
pub const WORD_SEPARATORS: &str = ".\u{0020}\u{00a0},;:!?\n()[]*&@{}/<>_+=|\"\u{3002}\u{3001}\u{3000}\u{060c}\u{061f}『』｛｝（）「」：；［］！？～＊※♪♬…＿・•◦【】☆★♥";

/// Code points that end a sentence.
pub const SENTENCE_SEPARATORS: &str = ".,;:!?\u{060c}\u{061f}\u{3002}\u{3001}：！？…";

pub const APOSTROPHE: char = '\'';

/// Immutable separator classification, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeparatorTables {
    apostrophe_separator: bool,
}

impl SeparatorTables {
    pub fn new(apostrophe_separator: bool) -> Self {
        Self {
            apostrophe_separator,
        }
    }

    /// Whether the apostrophe counts as a word boundary.
    pub fn apostrophe_separator(&self) -> bool {
        self.apostrophe_separator
    }

    /// The word separator table (without the apostrophe).
    pub fn word_separators(&self) -> &'static str {
        WORD_SEPARATORS
    }

    pub fn is_word_separator(&self, code: char) -> bool {
        if code == APOSTROPHE {
            self.apostrophe_separator
        } else {
            table_contains(WORD_SEPARATORS, code)
        }
    }

    pub fn is_sentence_separator(&self, code: char) -> bool {
        table_contains(SENTENCE_SEPARATORS, code)
    }
}

fn table_contains(table: &str, code: char) -> bool {
    table.chars().any(|c| c == code)
}
