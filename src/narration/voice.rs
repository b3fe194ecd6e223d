//! Voice inventory and per-gender voice parameters.
//!
//! Platform voice sets vary, so only parameter ranges are fixed:
//!
//! | Gender  | Voice                          | Pitch        | Rate |
//! |---------|--------------------------------|--------------|------|
//! | Female  | named female voice found       | 1.1          | 1.0  |
//! | Female  | none found (engine default)    | 1.6          | 1.0  |
//! | Male    | male voice if tagged, else any | 0.8          | 0.9  |
//! | Other   | engine default                 | 1.0          | 1.0  |

use crate::remote::Gender;

/// Name fragments that identify a female voice on common platforms.
const FEMALE_VOICE_HINTS: &[&str] = &["Zira", "Google UK English Female", "Samantha"];

pub const FEMALE_PITCH_WITH_VOICE: f32 = 1.1;
pub const FEMALE_PITCH_WITHOUT_VOICE: f32 = 1.6;
pub const MALE_PITCH: f32 = 0.8;
pub const MALE_RATE: f32 = 0.9;

/// One voice offered by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    /// Gender tag reported by the engine, when it reports one.
    pub gender: Option<Gender>,
}

impl VoiceInfo {
    fn is_female(&self) -> bool {
        self.gender == Some(Gender::Female)
            || FEMALE_VOICE_HINTS.iter().any(|hint| self.name.contains(hint))
            || self.name.to_lowercase().contains("female")
    }

    fn is_male(&self) -> bool {
        self.gender == Some(Gender::Male)
    }
}

/// Parameters applied to one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    /// `None` means the engine's default voice.
    pub voice: Option<String>,
    /// Multiplier around the engine's normal pitch.
    pub pitch: f32,
    /// Multiplier around the engine's normal speaking rate.
    pub rate: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice: None,
            pitch: 1.0,
            rate: 1.0,
        }
    }
}

/// Text plus the voice parameters to speak it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub profile: VoiceProfile,
}

/// Pick voice parameters for `gender` from the available `voices`.
pub fn select_profile(gender: &Gender, voices: &[VoiceInfo]) -> VoiceProfile {
    match gender {
        Gender::Female => match voices.iter().find(|v| v.is_female()) {
            Some(voice) => VoiceProfile {
                voice: Some(voice.name.clone()),
                pitch: FEMALE_PITCH_WITH_VOICE,
                rate: 1.0,
            },
            None => {
                log::debug!("narration: no female voice found, raising pitch on default voice");
                VoiceProfile {
                    voice: None,
                    pitch: FEMALE_PITCH_WITHOUT_VOICE,
                    rate: 1.0,
                }
            }
        },
        Gender::Male => VoiceProfile {
            voice: voices.iter().find(|v| v.is_male()).map(|v| v.name.clone()),
            pitch: MALE_PITCH,
            rate: MALE_RATE,
        },
        Gender::Other(_) => VoiceProfile::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, gender: Option<Gender>) -> VoiceInfo {
        VoiceInfo {
            name: name.into(),
            gender,
        }
    }

    #[test]
    fn female_prefers_named_voice() {
        let voices = vec![
            voice("Microsoft David", None),
            voice("Microsoft Zira Desktop", None),
        ];
        let p = select_profile(&Gender::Female, &voices);
        assert_eq!(p.voice.as_deref(), Some("Microsoft Zira Desktop"));
        assert_eq!(p.pitch, FEMALE_PITCH_WITH_VOICE);
    }

    #[test]
    fn female_matches_engine_gender_tag() {
        let voices = vec![voice("en-gb-x-rp", Some(Gender::Female))];
        let p = select_profile(&Gender::Female, &voices);
        assert_eq!(p.voice.as_deref(), Some("en-gb-x-rp"));
    }

    #[test]
    fn female_without_voice_raises_pitch() {
        let voices = vec![voice("Alex", Some(Gender::Male))];
        let p = select_profile(&Gender::Female, &voices);
        assert!(p.voice.is_none());
        assert_eq!(p.pitch, FEMALE_PITCH_WITHOUT_VOICE);
    }

    #[test]
    fn female_pitch_stays_in_range() {
        for voices in [vec![], vec![voice("Samantha", None)]] {
            let p = select_profile(&Gender::Female, &voices);
            assert!((1.1..=1.6).contains(&p.pitch));
        }
    }

    #[test]
    fn male_is_lower_and_slower() {
        let p = select_profile(&Gender::Male, &[voice("en-us", Some(Gender::Male))]);
        assert_eq!(p.voice.as_deref(), Some("en-us"));
        assert!((0.7..=0.9).contains(&p.pitch));
        assert!(p.rate < 1.0);
    }

    #[test]
    fn unknown_gender_uses_defaults() {
        let p = select_profile(&Gender::Other("x".into()), &[voice("Zira", None)]);
        assert_eq!(p, VoiceProfile::default());
    }
}
