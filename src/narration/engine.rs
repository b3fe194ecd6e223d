//! Speech engine trait and implementations.
//!
//! [`SpeechEngine`] is object-safe and `Send + Sync` so the narration
//! service can hold it behind an `Arc<dyn SpeechEngine>`.
//!
//! [`CommandSpeechEngine`] drives an espeak-compatible program through
//! `tokio::process`.  The child is spawned with `kill_on_drop(true)`, so
//! dropping the `speak` future (which is how cancellation works) silences it
//! immediately.
//!
//! [`MockSpeechEngine`] (available under `#[cfg(test)]`) records utterances
//! and can hold them open until cancelled.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::config::NarrationConfig;
use crate::remote::Gender;

use super::voice::{Utterance, VoiceInfo};

// ---------------------------------------------------------------------------
// NarrationError
// ---------------------------------------------------------------------------

/// Errors from the speech engine.  Never surfaced to the guest.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("failed to run speech program: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("speech program exited with {0}")]
    Failed(std::process::ExitStatus),
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// List the voices the engine offers.
    async fn voices(&self) -> Result<Vec<VoiceInfo>, NarrationError>;

    /// Speak `utterance` to completion.
    ///
    /// Dropping the returned future must stop the audio.
    async fn speak(&self, utterance: &Utterance) -> Result<(), NarrationError>;
}

// ---------------------------------------------------------------------------
// CommandSpeechEngine
// ---------------------------------------------------------------------------

/// Lowest / highest speaking rates passed to the program, in words per minute.
const MIN_RATE_WPM: f32 = 80.0;
const MAX_RATE_WPM: f32 = 450.0;

/// Runs `<program> [-v voice] -p <pitch> -s <wpm> -- <text>` per utterance.
pub struct CommandSpeechEngine {
    program: String,
    base_pitch: u32,
    base_rate_wpm: u32,
}

impl CommandSpeechEngine {
    pub fn from_config(config: &NarrationConfig) -> Self {
        Self {
            program: config.program.clone(),
            base_pitch: config.base_pitch,
            base_rate_wpm: config.base_rate_wpm,
        }
    }

    /// Program arguments for `utterance`, text last.
    fn args(&self, utterance: &Utterance) -> Vec<String> {
        let profile = &utterance.profile;
        let pitch = (self.base_pitch as f32 * profile.pitch).round().clamp(0.0, 99.0);
        let rate = (self.base_rate_wpm as f32 * profile.rate)
            .round()
            .clamp(MIN_RATE_WPM, MAX_RATE_WPM);

        let mut args = Vec::with_capacity(8);
        if let Some(voice) = &profile.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("-p".to_string());
        args.push(format!("{pitch}"));
        args.push("-s".to_string());
        args.push(format!("{rate}"));
        args.push("--".to_string());
        args.push(utterance.text.clone());
        args
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn voices(&self) -> Result<Vec<VoiceInfo>, NarrationError> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(NarrationError::Failed(output.status));
        }
        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), NarrationError> {
        let status = Command::new(&self.program)
            .args(self.args(utterance))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?
            .wait()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(NarrationError::Failed(status))
        }
    }
}

/// Parse `espeak-ng --voices` output:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  5  en-gb           --/M      English_(Great_Britain) gmw/en
/// ```
fn parse_voice_list(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 || fields[0] == "Pty" {
                return None;
            }
            let gender = match fields[2].rsplit('/').next() {
                Some("M") => Some(Gender::Male),
                Some("F") => Some(Gender::Female),
                _ => None,
            };
            Some(VoiceInfo {
                name: fields[3].to_string(),
                gender,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MockSpeechEngine  (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockSpeechEngine;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
