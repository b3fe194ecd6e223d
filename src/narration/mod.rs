//! Greeting narration.
//!
//! # Lifecycle
//!
//! [`NarrationService`] is a single owned instance held by the viewport
//! coordinator.  It lists the engine's voices once and caches them, and
//! cancels any utterance in progress before starting another one.
//!
//! ```text
//! speak(text, gender)
//!   ├─ cancel current utterance (await its task)
//!   ├─ voices: cached ─or─ SpeechEngine::voices() once
//!   ├─ select_profile(gender, voices)  → voice / pitch / rate
//!   └─ spawn SpeechEngine::speak(utterance) under a CancellationToken
//! ```

pub mod engine;
pub mod service;
pub mod voice;

pub use engine::{CommandSpeechEngine, NarrationError, SpeechEngine};
pub use service::NarrationService;
pub use voice::{select_profile, Utterance, VoiceInfo, VoiceProfile};

#[cfg(test)]
pub use engine::MockSpeechEngine;
