//! Chroma-key compositor for the mascot overlay.
//!
//! # Architecture
//!
//! ```text
//! VideoSource ──read_frame──▶ work buffer ──ChromaKey::apply──▶ Surface::present
//!      ▲                                                          │
//!      └──────────── frame clock (tokio interval) ◀───────────────┘
//! ```
//!
//! [`ColorKeyCompositor`] owns the frame loop as a spawned task with a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).  There is at
//! most one loop per compositor, and `stop().await` guarantees no further
//! surface writes once it returns.

pub mod chroma;
pub mod runner;
pub mod surface;

pub use chroma::{ChromaKey, KeyColor, Threshold};
pub use runner::ColorKeyCompositor;
pub use surface::{MemorySurface, Surface};
