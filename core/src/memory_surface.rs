//! In-memory editing surface.
//!
//! `MemorySurface` holds the text of a field together with its selection and
//! composing region. It backs the command-line driver and the tests, and is
//! a reference for what hosts are expected to do with each call.

use crate::surface::EditingSurface;
use std::ops::Range;

/// Text field state kept entirely in memory. All offsets are in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    text: String,
    selection_start: usize,
    selection_end: usize,
    composing: Option<Range<usize>>,
    batch_depth: usize,
    batches_completed: usize,
    key_chars_sent: usize,
    edits: usize,
}

impl MemorySurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface holding `text` with the cursor at its end.
    pub fn with_text(text: &str) -> Self {
        let end = text.chars().count();
        Self {
            text: text.to_string(),
            selection_start: end,
            selection_end: end,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Selection as `(start, end)`; equal when the cursor is collapsed.
    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    pub fn cursor(&self) -> usize {
        self.selection_end
    }

    /// The text currently marked as composing, if any.
    pub fn composing_text(&self) -> Option<&str> {
        self.composing
            .as_ref()
            .map(|r| &self.text[self.byte_at(r.start)..self.byte_at(r.end)])
    }

    pub fn composing_range(&self) -> Option<Range<usize>> {
        self.composing.clone()
    }

    /// Whether a batch edit is open.
    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Number of outermost batch edits that were closed.
    pub fn batches_completed(&self) -> usize {
        self.batches_completed
    }

    /// Number of characters delivered through `send_key_char`.
    pub fn key_chars_sent(&self) -> usize {
        self.key_chars_sent
    }

    /// Number of mutating calls received (commits, composing updates,
    /// deletions, selection changes).
    pub fn edits(&self) -> usize {
        self.edits
    }

    /// The text with the selection marked: `|` for a collapsed cursor,
    /// `[` and `]` around a selected range.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 2);
        for (i, c) in self.text.chars().enumerate() {
            self.push_markers(&mut out, i);
            out.push(c);
        }
        self.push_markers(&mut out, self.char_len());
        out
    }

    fn push_markers(&self, out: &mut String, at: usize) {
        if self.selection_start == self.selection_end {
            if at == self.selection_start {
                out.push('|');
            }
        } else if at == self.selection_start {
            out.push('[');
        } else if at == self.selection_end {
            out.push(']');
        }
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn slice_chars(&self, start: usize, end: usize) -> String {
        self.text[self.byte_at(start)..self.byte_at(end)].to_string()
    }

    /// Range replaced by commits and composing updates.
    fn target_range(&self) -> Range<usize> {
        self.composing
            .clone()
            .unwrap_or(self.selection_start..self.selection_end)
    }

    fn replace(&mut self, range: Range<usize>, text: &str, cursor_offset: isize) -> Range<usize> {
        let start_byte = self.byte_at(range.start);
        let end_byte = self.byte_at(range.end);
        self.text.replace_range(start_byte..end_byte, text);
        let inserted = range.start..range.start + text.chars().count();

        let cursor = if cursor_offset > 0 {
            inserted.end as isize + cursor_offset - 1
        } else {
            inserted.start as isize + cursor_offset
        };
        let cursor = cursor.clamp(0, self.char_len() as isize) as usize;
        self.selection_start = cursor;
        self.selection_end = cursor;
        self.edits += 1;
        inserted
    }

    fn remove_chars(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start_byte = self.byte_at(range.start);
        let end_byte = self.byte_at(range.end);
        self.text.replace_range(start_byte..end_byte, "");

        let shift = |p: usize| {
            if p < range.start {
                p
            } else if p >= range.end {
                p - range.len()
            } else {
                range.start
            }
        };
        self.selection_start = shift(self.selection_start);
        self.selection_end = shift(self.selection_end);
        self.composing = self
            .composing
            .take()
            .map(|c| shift(c.start)..shift(c.end))
            .filter(|c| !c.is_empty());
    }
}

impl EditingSurface for MemorySurface {
    fn text_before_cursor(&self, n: usize) -> String {
        let end = self.selection_start;
        self.slice_chars(end.saturating_sub(n), end)
    }

    fn text_after_cursor(&self, n: usize) -> String {
        let start = self.selection_end;
        let end = start.saturating_add(n).min(self.char_len());
        self.slice_chars(start, end)
    }

    fn commit_text(&mut self, text: &str, cursor_offset: isize) {
        let range = self.target_range();
        self.composing = None;
        self.replace(range, text, cursor_offset);
    }

    fn set_composing_text(&mut self, text: &str, cursor_offset: isize) {
        let range = self.target_range();
        let inserted = self.replace(range, text, cursor_offset);
        self.composing = Some(inserted).filter(|r| !r.is_empty());
    }

    fn finish_composing_text(&mut self) {
        self.composing = None;
    }

    fn delete_surrounding_text(&mut self, before: usize, after: usize) {
        let len = self.char_len();
        let after_end = self.selection_end.saturating_add(after).min(len);
        self.remove_chars(self.selection_end..after_end);
        let before_start = self.selection_start.saturating_sub(before);
        self.remove_chars(before_start..self.selection_start);
        self.edits += 1;
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.char_len();
        let (start, end) = (start.min(len), end.min(len));
        self.selection_start = start.min(end);
        self.selection_end = start.max(end);
        self.edits += 1;
    }

    fn send_key_char(&mut self, ch: char) {
        self.key_chars_sent += 1;
        let mut buf = [0u8; 4];
        self.commit_text(ch.encode_utf8(&mut buf), 1);
    }

    fn begin_batch_edit(&mut self) {
        self.batch_depth += 1;
    }

    fn end_batch_edit(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.batches_completed += 1;
        }
    }
}
