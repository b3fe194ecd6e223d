//! Kiosk settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to each
//! subsystem at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ViewRole
// ---------------------------------------------------------------------------

/// Functional mode of one kiosk screen process.
///
/// | Variant  | Capture + gesture polling | Renders results + mascot |
/// |----------|---------------------------|--------------------------|
/// | Input    | Yes                       | No                       |
/// | Display  | No                        | Yes                      |
/// | Combined | Yes                       | Yes                      |
///
/// Read once at startup and never changed afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewRole {
    Input,
    Display,
    #[default]
    Combined,
}

impl ViewRole {
    /// Whether this viewport owns the capture source and the gesture poll.
    ///
    /// ```
    /// use kiosk_greeter::config::ViewRole;
    ///
    /// assert!(ViewRole::Input.owns_capture());
    /// assert!(!ViewRole::Display.owns_capture());
    /// assert!(ViewRole::Combined.owns_capture());
    /// ```
    pub fn owns_capture(self) -> bool {
        matches!(self, ViewRole::Input | ViewRole::Combined)
    }

    /// Whether this viewport renders guest results and runs the mascot
    /// compositor.
    pub fn renders_results(self) -> bool {
        matches!(self, ViewRole::Display | ViewRole::Combined)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewRole::Input => "input",
            ViewRole::Display => "display",
            ViewRole::Combined => "combined",
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Remote analysis / gesture service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the `/analyze`, `/detect_wave` and `/wave_reset` routes hang off.
    pub base_url: String,
    /// Seconds to wait for `/analyze` before giving up.
    pub analysis_timeout_secs: u64,
    /// Seconds to wait for a gesture poll.  Kept short so a slow backend
    /// never holds the poll slot for long.
    pub gesture_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".into(),
            analysis_timeout_secs: 15,
            gesture_timeout_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Guest-facing capture source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory of frames (or a single image) acting as the capture device.
    pub source: PathBuf,
    /// JPEG quality (1 – 100) for explicit guest submits.
    pub submit_quality: u8,
    /// JPEG quality (1 – 100) for gesture polls; low to bound payload size.
    pub poll_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("capture"),
            submit_quality: 92,
            poll_quality: 40,
        }
    }
}

// ---------------------------------------------------------------------------
// GestureConfig
// ---------------------------------------------------------------------------

/// Wave-detection polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Whether the poll loop runs at all on roles that own capture.
    pub enabled: bool,
    /// Poll period in milliseconds.  Clamped into `100..=150`.
    pub interval_ms: u64,
    /// Guest name sent with gesture-triggered submits.
    pub trigger_name: String,
}

impl GestureConfig {
    pub const MIN_INTERVAL_MS: u64 = 100;
    pub const MAX_INTERVAL_MS: u64 = 150;

    /// Effective poll period after clamping.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(
            self.interval_ms
                .clamp(Self::MIN_INTERVAL_MS, Self::MAX_INTERVAL_MS),
        )
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 120,
            trigger_name: "Guest".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CompositorConfig
// ---------------------------------------------------------------------------

/// Mascot chroma-key overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Directory of green-screen frames played as the mascot video.
    pub mascot_source: PathBuf,
    /// Reference color removed from the mascot video, as `[r, g, b]`.
    pub key_color: [u8; 3],
    /// Euclidean RGB distance at or below which a pixel becomes transparent.
    pub threshold: f32,
    /// Frame clock rate.
    pub fps: u32,
    /// Restart the mascot video when it reaches its last frame.
    pub looping: bool,
}

impl CompositorConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            mascot_source: PathBuf::from("mascot"),
            key_color: [0, 255, 0],
            threshold: 100.0,
            fps: 30,
            looping: true,
        }
    }
}

// ---------------------------------------------------------------------------
// NarrationConfig
// ---------------------------------------------------------------------------

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Speech program invoked per utterance (espeak-compatible flags).
    pub program: String,
    /// Delay between showing a result and starting its narration, so the
    /// view transition settles first.
    pub delay_ms: u64,
    /// Program pitch (0 – 99) corresponding to a pitch multiplier of 1.0.
    pub base_pitch: u32,
    /// Program speaking rate in words per minute for a rate of 1.0.
    pub base_rate_wpm: u32,
    /// Welcome text narrated when the backend sends no message.  `{name}`
    /// is replaced by the guest name.
    pub template: String,
}

impl NarrationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            delay_ms: 1000,
            base_pitch: 50,
            base_rate_wpm: 175,
            template: "Hi {name}, welcome! Thanks for joining us today. \
                       We are happy to have you here."
                .into(),
        }
    }
}

// ---------------------------------------------------------------------------
// BusConfig
// ---------------------------------------------------------------------------

/// Cross-viewport broadcast channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Topic name; datagrams carrying any other topic are dropped.
    pub topic: String,
    /// Local UDP address this viewport listens on.
    pub listen: SocketAddr,
    /// Every other viewport on the kiosk.
    pub peers: Vec<SocketAddr>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            topic: "kiosk-greeter".into(),
            listen: SocketAddr::from(([127, 0, 0, 1], 47_100)),
            peers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AssetConfig
// ---------------------------------------------------------------------------

/// Static avatar asset lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `<gender>_<attire>.png` files.
    pub avatar_dir: PathBuf,
    /// Image shown when the derived avatar does not exist.
    pub default_avatar: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            avatar_dir: PathBuf::from("static/avatars"),
            default_avatar: PathBuf::from("static/avatars/default.png"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level kiosk configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use kiosk_greeter::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Role this viewport process plays on the kiosk.
    pub role: ViewRole,
    pub backend: BackendConfig,
    pub capture: CaptureConfig,
    pub gesture: GestureConfig,
    pub compositor: CompositorConfig,
    pub narration: NarrationConfig,
    pub bus: BusConfig,
    pub assets: AssetConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests and `--config`).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
