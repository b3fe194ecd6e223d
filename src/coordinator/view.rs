//! What a viewport shows the guest.
//!
//! [`ViewSink`] is the rendering seam of the coordinator: every visible
//! effect of a state transition goes through it.  [`LogView`] renders to
//! the log; tests use [`RecordingView`].

use std::path::Path;

/// Receives the visible effects of coordinator transitions.
pub trait ViewSink: Send + Sync {
    /// Show or hide the busy indicator.
    fn show_busy(&self, busy: bool);

    /// Replace the capture view with a greeting and an avatar.
    fn show_result(&self, greeting: &str, avatar: &Path);

    /// Return to the capture view, clearing any rendered result.
    fn show_capture(&self);

    /// A recoverable, guest-visible error.
    fn alert(&self, message: &str);
}

/// Renders every view change as a log line.
pub struct LogView {
    label: &'static str,
}

impl LogView {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl ViewSink for LogView {
    fn show_busy(&self, busy: bool) {
        log::debug!("view[{}]: busy indicator {}", self.label, if busy { "on" } else { "off" });
    }

    fn show_result(&self, greeting: &str, avatar: &Path) {
        log::info!("view[{}]: {greeting} (avatar {})", self.label, avatar.display());
    }

    fn show_capture(&self) {
        log::info!("view[{}]: ready for the next guest", self.label);
    }

    fn alert(&self, message: &str) {
        log::warn!("view[{}]: ALERT: {message}", self.label);
    }
}

// ---------------------------------------------------------------------------
// RecordingView  (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use recording::{RecordingView, ViewEvent};
