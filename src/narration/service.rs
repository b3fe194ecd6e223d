//! [`NarrationService`]: one utterance at a time.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::remote::Gender;

use super::engine::SpeechEngine;
use super::voice::{select_profile, Utterance, VoiceInfo};

struct Speaking {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the speech engine, the cached voice list and the current utterance.
pub struct NarrationService {
    engine: Arc<dyn SpeechEngine>,
    voices: Option<Vec<VoiceInfo>>,
    current: Option<Speaking>,
}

impl NarrationService {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            voices: None,
            current: None,
        }
    }

    /// `true` while an utterance is being spoken.
    pub fn is_speaking(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|speaking| !speaking.task.is_finished())
    }

    /// Cancel whatever is playing, then start speaking `text` in the voice
    /// style for `gender`.  Returns once the utterance has been started.
    pub async fn speak(&mut self, text: &str, gender: &Gender) {
        self.cancel().await;

        if self.voices.is_none() {
            self.voices = Some(self.load_voices().await);
        }
        let profile = select_profile(gender, self.voices.as_deref().unwrap_or_default());
        log::debug!(
            "narration: speaking {} chars (voice={:?}, pitch={}, rate={})",
            text.len(),
            profile.voice,
            profile.pitch,
            profile.rate
        );

        let utterance = Utterance {
            text: text.to_string(),
            profile,
        };
        let engine = Arc::clone(&self.engine);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("narration: utterance cancelled");
                }
                result = engine.speak(&utterance) => {
                    if let Err(e) = result {
                        log::warn!("narration: speech failed: {e}");
                    }
                }
            }
        });

        self.current = Some(Speaking { cancel, task });
    }

    /// Stop the current utterance, if any, and wait until it is silent.
    pub async fn cancel(&mut self) {
        if let Some(speaking) = self.current.take() {
            speaking.cancel.cancel();
            if let Err(e) = speaking.task.await {
                log::warn!("narration: utterance task ended abnormally: {e}");
            }
        }
    }

    async fn load_voices(&self) -> Vec<VoiceInfo> {
        match self.engine.voices().await {
            Ok(voices) => {
                log::info!("narration: {} voice(s) available", voices.len());
                voices
            }
            Err(e) => {
                log::warn!("narration: could not list voices ({e}); using engine default");
                Vec::new()
            }
        }
    }
}

impl Drop for NarrationService {
    fn drop(&mut self) {
        if let Some(speaking) = &self.current {
            speaking.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
