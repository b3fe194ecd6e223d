//! Thin clients for the two backend endpoints.
//!
//! * [`AnalysisClient`] / [`HttpAnalysisClient`]: `POST /analyze`, turns a
//!   still image + guest name into a [`GuestResult`].
//! * [`GestureDetector`] / [`HttpGestureClient`]: `POST /detect_wave` and
//!   `POST /wave_reset`.
//!
//! Both traits are `async_trait` seams so the coordinator can be driven by
//! test doubles.

pub mod analysis;
pub mod gesture;
pub mod guest;

#[cfg(test)]
pub(crate) mod test_server;

pub use analysis::{AnalysisClient, AnalysisError, HttpAnalysisClient};
pub use gesture::{GestureDetector, GestureError, HttpGestureClient};
pub use guest::{Attire, Gender, GuestResult};

#[cfg(test)]
pub use analysis::MockAnalysisClient;
#[cfg(test)]
pub use gesture::MockGestureDetector;

/// Join `base` and `route` without doubling the slash.
pub(crate) fn endpoint(base: &str, route: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), route.trim_start_matches('/'))
}
