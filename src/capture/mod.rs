//! Guest-facing capture source.
//!
//! [`CaptureService`] exclusively owns the capture [`VideoSource`] of a
//! viewport process and turns its current frame into a [`StillImage`] on
//! demand.  Two callers use it: the explicit submit path (full quality) and
//! the gesture poll (low quality, to bound the payload).
//!
//! [`VideoSource`]: crate::media::VideoSource
//! [`StillImage`]: crate::media::StillImage

pub mod service;

pub use service::{CaptureError, CapturePurpose, CaptureService};
