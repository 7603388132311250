//! Advisory "a word is being composed" state.

/// Two-state machine read by suggestion and UI collaborators.
///
/// The controller moves to `Predicting` when composing input makes the
/// composer non-empty and back to `Idle` when the composer is emptied,
/// reset, or committed. Nothing in the controller is gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prediction {
    #[default]
    Idle,
    Predicting,
}

impl Prediction {
    pub fn is_predicting(self) -> bool {
        self == Prediction::Predicting
    }

    /// Enter `Predicting`. Returns true if the state changed.
    pub fn start(&mut self) -> bool {
        let changed = *self == Prediction::Idle;
        *self = Prediction::Predicting;
        changed
    }

    /// Return to `Idle`. Returns true if the state changed.
    pub fn stop(&mut self) -> bool {
        let changed = *self == Prediction::Predicting;
        *self = Prediction::Idle;
        changed
    }
}
