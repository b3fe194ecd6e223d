//! Gesture-trigger policy.
//!
//! The poll itself is scheduled by the viewport coordinator on a fixed
//! interval; this module holds the rules it obeys:
//!
//! * [`GestureSession`]: the per-process `in_flight` / `trigger_accepted`
//!   flags and the gate deciding whether a tick may issue a poll.
//! * [`BestEffortDetector`]: wraps any [`GestureDetector`] so that every
//!   transport or parse failure reads as "no wave".
//!
//! ```text
//! tick ──▶ GestureSession::check ──skip──▶ (no-op)
//!               │ ok
//!               ▼
//!          begin_poll ─▶ capture (poll quality) ─▶ detector.detect
//!                                                      │
//!          finish_poll(detected) ◀─────────────────────┘
//!               │ true (first positive while idle)
//!               ▼
//!          submit, then no polls until reset
//! ```
//!
//! [`GestureDetector`]: crate::remote::GestureDetector

pub mod fallback;
pub mod session;

pub use fallback::BestEffortDetector;
pub use session::{GestureSession, PollContext, SkipReason};
