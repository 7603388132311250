//! Word-level helpers operating on an [`EditingSurface`].

use crate::surface::{BatchEdit, EditingSurface};
use tracing::trace;

/// How far on each side of the cursor a word is searched for.
pub const WORD_LOOKAROUND: usize = 1024;

/// Extent of the word touching the cursor, in characters on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRange {
    pub chars_before: usize,
    pub chars_after: usize,
}

impl WordRange {
    pub fn len(&self) -> usize {
        self.chars_before + self.chars_after
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find the word the cursor touches, or `None` when it sits between
/// separators.
pub fn word_range_at_cursor<S, F>(surface: &S, is_separator: F) -> Option<WordRange>
where
    S: EditingSurface + ?Sized,
    F: Fn(char) -> bool,
{
    let before = surface.text_before_cursor(WORD_LOOKAROUND);
    let after = surface.text_after_cursor(WORD_LOOKAROUND);

    let chars_before = before
        .chars()
        .rev()
        .take_while(|&c| !is_separator(c))
        .count();
    let chars_after = after.chars().take_while(|&c| !is_separator(c)).count();

    let range = WordRange {
        chars_before,
        chars_after,
    };
    (!range.is_empty()).then_some(range)
}

/// Delete the word touching the cursor in a single batch edit.
///
/// Returns the deleted range, or `None` when there was no word to delete.
pub fn delete_word_at_cursor<S, F>(surface: &mut S, is_separator: F) -> Option<WordRange>
where
    S: EditingSurface + ?Sized,
    F: Fn(char) -> bool,
{
    let range = word_range_at_cursor(&*surface, is_separator)?;
    trace!(
        before = range.chars_before,
        after = range.chars_after,
        "deleting word at cursor"
    );
    let mut batch = BatchEdit::begin(surface);
    batch.finish_composing_text();
    batch.delete_surrounding_text(range.chars_before, range.chars_after);
    Some(range)
}
