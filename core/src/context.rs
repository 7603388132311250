//! Host-side collaborators of the input controller.
//!
//! [`InputHost`] is what the controller needs from the keyboard service: the
//! current editing session (if any), the active converter, and a few
//! notifications. [`KeyboardContext`] is a plain-data implementation whose
//! public fields the platform reads after each call.

use crate::memory_surface::MemorySurface;
use crate::surface::EditingSurface;
use crate::word_composer::Converter;

/// Services the input controller consumes from its host.
pub trait InputHost {
    /// The active editing session, or `None` when no field is focused.
    fn surface(&mut self) -> Option<&mut dyn EditingSurface>;

    /// Read-only view of the active editing session.
    fn surface_ref(&self) -> Option<&dyn EditingSurface>;

    /// The composing strategy for the current layout, if any.
    fn converter(&self) -> Option<&dyn Converter>;

    /// Whether an external predictive display (T9 style) renders the
    /// composing text itself.
    fn is_predictive_display_on(&self) -> bool;

    /// The converted composing text was just pushed to the surface.
    fn set_converted_composing(&mut self, converted: &str);

    /// Shift state may need updating after text changed.
    fn update_shift_state(&mut self);

    /// Suggestions should be refreshed for the current composing word.
    fn post_update_suggestions(&mut self);
}

/// Plain-data host.
///
/// Notifications are recorded as counters and the last converted composing
/// text; the platform (or a test) inspects and clears them as needed.
pub struct KeyboardContext<S: EditingSurface = MemorySurface> {
    /// Current editing session
    pub surface: Option<S>,

    /// Converter for the current layout
    pub converter: Option<Box<dyn Converter>>,

    /// External predictive display owns the composing text
    pub predictive_display: bool,

    /// Last converted composing text pushed to the surface
    pub converted_composing: String,

    /// Number of shift-state refresh requests
    pub shift_updates: usize,

    /// Number of suggestion refresh requests
    pub suggestion_updates: usize,
}

impl<S: EditingSurface> KeyboardContext<S> {
    /// Context without an editing session.
    pub fn detached() -> Self {
        Self {
            surface: None,
            converter: None,
            predictive_display: false,
            converted_composing: String::new(),
            shift_updates: 0,
            suggestion_updates: 0,
        }
    }

    /// Context attached to `surface`.
    pub fn with_surface(surface: S) -> Self {
        Self {
            surface: Some(surface),
            ..Self::detached()
        }
    }

    pub fn set_converter(&mut self, converter: Option<Box<dyn Converter>>) {
        self.converter = converter;
    }

    /// Reset the notification counters.
    pub fn clear_notifications(&mut self) {
        self.converted_composing.clear();
        self.shift_updates = 0;
        self.suggestion_updates = 0;
    }
}

impl<S: EditingSurface> Default for KeyboardContext<S> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<S: EditingSurface> InputHost for KeyboardContext<S> {
    fn surface(&mut self) -> Option<&mut dyn EditingSurface> {
        self.surface.as_mut().map(|s| s as &mut dyn EditingSurface)
    }

    fn surface_ref(&self) -> Option<&dyn EditingSurface> {
        self.surface.as_ref().map(|s| s as &dyn EditingSurface)
    }

    fn converter(&self) -> Option<&dyn Converter> {
        self.converter.as_deref()
    }

    fn is_predictive_display_on(&self) -> bool {
        self.predictive_display
    }

    fn set_converted_composing(&mut self, converted: &str) {
        self.converted_composing.clear();
        self.converted_composing.push_str(converted);
    }

    fn update_shift_state(&mut self) {
        self.shift_updates += 1;
    }

    fn post_update_suggestions(&mut self) {
        self.suggestion_updates += 1;
    }
}
