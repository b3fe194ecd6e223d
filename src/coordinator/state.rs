//! Guest-interaction state machine.

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

/// States of one viewport's guest interaction.
///
/// ```text
/// Idle ──submit──▶ AwaitingCapture ──frame captured──▶ Loading
///                        │                               ├─ Ok  ──▶ ShowingResult
///                        └─ capture failed ──▶ Idle      └─ Err ──▶ Idle
/// remote Result ──▶ ShowingResult            (roles that render results)
/// any state ──reset──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionState {
    /// Capture affordances visible; mascot running; gesture polling armed.
    #[default]
    Idle,

    /// A submit was accepted and the frame is being grabbed.
    AwaitingCapture,

    /// The analysis request is in flight.
    Loading,

    /// A guest result is rendered (or, on an input viewport, was delivered).
    ShowingResult,
}

impl InteractionState {
    /// Returns `true` while a submit is being processed.
    ///
    /// ```
    /// use kiosk_greeter::coordinator::InteractionState;
    ///
    /// assert!(!InteractionState::Idle.is_busy());
    /// assert!(InteractionState::AwaitingCapture.is_busy());
    /// assert!(InteractionState::Loading.is_busy());
    /// assert!(!InteractionState::ShowingResult.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            InteractionState::AwaitingCapture | InteractionState::Loading
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::AwaitingCapture => "Capturing",
            InteractionState::Loading => "Analysing",
            InteractionState::ShowingResult => "Showing result",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(InteractionState::default(), InteractionState::Idle);
    }

    #[test]
    fn result_is_not_busy() {
        assert!(!InteractionState::ShowingResult.is_busy());
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            InteractionState::Idle.label(),
            InteractionState::AwaitingCapture.label(),
            InteractionState::Loading.label(),
            InteractionState::ShowingResult.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
