//! The editable text field the keyboard types into.
//!
//! Offsets and counts are in characters. `cursor_offset` follows the
//! platform convention: a value `> 0` is relative to the end of the inserted
//! text (`1` puts the cursor right after it), a value `<= 0` is relative to
//! its start.

use std::ops::{Deref, DerefMut};

/// Capabilities required from the host text field.
pub trait EditingSurface {
    /// Up to `n` characters before the selection start. Empty when nothing is
    /// available.
    fn text_before_cursor(&self, n: usize) -> String;

    /// Up to `n` characters after the selection end. Empty when nothing is
    /// available.
    fn text_after_cursor(&self, n: usize) -> String;

    /// Replace the composing region (or the selection) with `text` and end
    /// composition.
    fn commit_text(&mut self, text: &str, cursor_offset: isize);

    /// Replace the composing region (or the selection) with `text` and keep
    /// it marked as composing.
    fn set_composing_text(&mut self, text: &str, cursor_offset: isize);

    /// Keep the composing text as ordinary text.
    fn finish_composing_text(&mut self);

    /// Delete `before` characters before the selection and `after`
    /// characters after it.
    fn delete_surrounding_text(&mut self, before: usize, after: usize);

    fn set_selection(&mut self, start: usize, end: usize);

    /// Deliver `ch` as a key event rather than as committed text.
    fn send_key_char(&mut self, ch: char);

    fn begin_batch_edit(&mut self);

    fn end_batch_edit(&mut self);
}

/// Scoped batch edit: begun on construction, ended on drop.
///
/// Derefs to the surface so the edits inside the batch read naturally.
pub struct BatchEdit<'a, S: EditingSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: EditingSurface + ?Sized> BatchEdit<'a, S> {
    pub fn begin(surface: &'a mut S) -> Self {
        surface.begin_batch_edit();
        Self { surface }
    }
}

impl<S: EditingSurface + ?Sized> Deref for BatchEdit<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: EditingSurface + ?Sized> DerefMut for BatchEdit<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: EditingSurface + ?Sized> Drop for BatchEdit<'_, S> {
    fn drop(&mut self) {
        self.surface.end_batch_edit();
    }
}
