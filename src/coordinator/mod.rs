//! Viewport coordination for the kiosk greeter.
//!
//! One [`ViewportCoordinator`] runs per viewport process and owns that
//! viewport's [`InteractionState`], gesture session and collaborators.
//! Viewports share nothing but bus messages.
//!
//! # Architecture
//!
//! ```text
//! stdin / buttons ──Command──▶ ┌──────────────────────┐ ──show_*──▶ ViewSink
//! MessageBus ──Envelope──────▶ │ ViewportCoordinator  │ ──start/stop──▶ ColorKeyCompositor
//! gesture interval ──tick────▶ │  (tokio::select! loop)│ ──speak/cancel─▶ NarrationService
//! spawned calls ──Event──────▶ └──────────────────────┘ ──publish──▶ MessageBus
//! ```
//!
//! Role gating:
//!
//! | role       | capture + polling | renders results + mascot |
//! |------------|:-----------------:|:------------------------:|
//! | `input`    | yes               | no                       |
//! | `display`  | no                | yes                      |
//! | `combined` | yes               | yes                      |

pub mod command;
pub mod state;
pub mod view;
pub mod viewport;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use command::{Command, ParseCommandError};
pub use state::InteractionState;
pub use view::{LogView, ViewSink};
pub use viewport::{alert_for, Collaborators, CoordinatorSettings, ViewportCoordinator};
