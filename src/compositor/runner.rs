//! The compositor frame loop.
//!
//! # Loop iteration
//!
//! ```text
//! tick ─▶ cancelled? ──yes──▶ exit
//!          │ no
//!          ▼
//!        source paused / ended? ──yes──▶ exit
//!          │ no
//!          ▼
//!        resolution changed? ──yes──▶ reallocate work buffer
//!          ▼
//!        read_frame → ChromaKey::apply → cancelled? → Surface::present
//! ```
//!
//! Cancellation is checked both at the top of every iteration and directly
//! before the blit, with no suspension point in between, so a cancelled
//! token always wins over a frame that is already being processed.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::media::VideoSource;

use super::chroma::ChromaKey;
use super::surface::Surface;

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Turns a green-screen [`VideoSource`] into a transparent overlay on a
/// [`Surface`].
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use kiosk_greeter::compositor::{ChromaKey, ColorKeyCompositor, KeyColor, MemorySurface, Threshold};
/// use kiosk_greeter::media::FrameSequence;
///
/// # async fn example() {
/// let source = Arc::new(FrameSequence::open("mascot".as_ref(), true).unwrap());
/// let surface = Arc::new(MemorySurface::new());
/// let key = ChromaKey::new(KeyColor::GREEN, Threshold::new(100.0));
///
/// let mut compositor = ColorKeyCompositor::new(source, surface, key, Duration::from_millis(33));
/// compositor.start();
/// // ...
/// compositor.stop().await;
/// # }
/// ```
pub struct ColorKeyCompositor {
    source: Arc<dyn VideoSource>,
    surface: Arc<dyn Surface>,
    key: ChromaKey,
    frame_period: Duration,
    running: Option<Running>,
}

impl ColorKeyCompositor {
    pub fn new(
        source: Arc<dyn VideoSource>,
        surface: Arc<dyn Surface>,
        key: ChromaKey,
        frame_period: Duration,
    ) -> Self {
        Self {
            source,
            surface,
            key,
            frame_period,
            running: None,
        }
    }

    /// `true` while a frame loop task is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Begin playback and enter the frame loop.
    ///
    /// No-op while a loop is already running on a playing source.  A loop
    /// that is leaving because the source was paused or ended is replaced;
    /// the new loop waits for it to exit first.  Must be called from within
    /// a tokio runtime.
    pub fn start(&mut self) {
        let was_playing = !self.source.is_paused() && !self.source.is_ended();
        self.source.play();

        if was_playing && self.is_running() {
            log::trace!("compositor: start ignored, already running");
            return;
        }

        let previous = self.running.take().map(|running| {
            running.cancel.cancel();
            running.task
        });

        let cancel = CancellationToken::new();
        let task = tokio::spawn(restart_loop(
            previous,
            Arc::clone(&self.source),
            Arc::clone(&self.surface),
            self.key,
            self.frame_period,
            cancel.clone(),
        ));

        log::debug!("compositor: started");
        self.running = Some(Running { cancel, task });
    }

    /// Pause the source and cancel the frame loop.
    ///
    /// Waits for the loop task to exit, so no surface write can happen after
    /// this returns.
    pub async fn stop(&mut self) {
        self.source.pause();

        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            if let Err(e) = running.task.await {
                log::warn!("compositor: frame loop ended abnormally: {e}");
            }
            log::debug!("compositor: stopped");
        }
    }
}

impl Drop for ColorKeyCompositor {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

async fn restart_loop(
    previous: Option<JoinHandle<()>>,
    source: Arc<dyn VideoSource>,
    surface: Arc<dyn Surface>,
    key: ChromaKey,
    frame_period: Duration,
    cancel: CancellationToken,
) {
    if let Some(previous) = previous {
        if let Err(e) = previous.await {
            log::warn!("compositor: previous frame loop ended abnormally: {e}");
        }
    }
    frame_loop(source, surface, key, frame_period, cancel).await;
}

async fn frame_loop(
    source: Arc<dyn VideoSource>,
    surface: Arc<dyn Surface>,
    key: ChromaKey,
    frame_period: Duration,
    cancel: CancellationToken,
) {
    let mut clock = tokio::time::interval(frame_period);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut work = RgbaImage::new(0, 0);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = clock.tick() => {}
        }

        if cancel.is_cancelled() {
            break;
        }
        if source.is_paused() || source.is_ended() {
            log::debug!("compositor: source paused or ended, leaving frame loop");
            break;
        }

        let Some((width, height)) = source.resolution() else {
            continue;
        };
        if work.dimensions() != (width, height) {
            log::debug!("compositor: work buffer resized to {width}x{height}");
            work = RgbaImage::new(width, height);
        }

        if !source.read_frame(&mut work) {
            continue;
        }
        key.apply(&mut work);

        if cancel.is_cancelled() {
            break;
        }
        surface.present(&work);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
