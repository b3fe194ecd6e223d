//! [`CaptureService`] implementation.

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

use crate::config::CaptureConfig;
use crate::media::{FrameSequence, StillImage, VideoSource};

/// Errors raised by the capture source.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture device could not be acquired.  Only the guest or an
    /// operator can fix this.
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    /// The source is acquired but has no frame to give right now.
    #[error("capture source is not ready")]
    NotReady,

    #[error("failed to encode still image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Which caller a frame is captured for; selects the JPEG quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePurpose {
    /// Explicit guest submit or accepted gesture trigger.
    Submit,
    /// Gesture poll.
    Poll,
}

/// Owner of the capture source.
pub struct CaptureService {
    source: Arc<dyn VideoSource>,
    submit_quality: u8,
    poll_quality: u8,
}

impl CaptureService {
    /// Wrap an already-open source and start it playing.
    pub fn new(source: Arc<dyn VideoSource>, submit_quality: u8, poll_quality: u8) -> Self {
        source.play();
        Self {
            source,
            submit_quality,
            poll_quality,
        }
    }

    /// Acquire the capture source described by `config`.
    pub fn acquire(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let source = FrameSequence::open(&config.source, true)
            .map_err(|e| CaptureError::Unavailable(e.to_string()))?;

        log::info!(
            "capture: acquired {} ({} frame(s))",
            config.source.display(),
            source.len()
        );
        Ok(Self::new(
            Arc::new(source),
            config.submit_quality,
            config.poll_quality,
        ))
    }

    /// `true` when a frame can be captured right now.
    pub fn is_ready(&self) -> bool {
        !self.source.is_paused() && !self.source.is_ended() && self.source.resolution().is_some()
    }

    /// Grab the current frame at its native resolution and compress it.
    pub fn capture_frame(&self, purpose: CapturePurpose) -> Result<StillImage, CaptureError> {
        let (width, height) = self.source.resolution().ok_or(CaptureError::NotReady)?;

        let mut frame = RgbaImage::new(width, height);
        if !self.source.read_frame(&mut frame) {
            return Err(CaptureError::NotReady);
        }

        let quality = match purpose {
            CapturePurpose::Submit => self.submit_quality,
            CapturePurpose::Poll => self.poll_quality,
        };
        Ok(StillImage::encode_jpeg(&frame, quality)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 13) as u8, (y * 29) as u8, 90, 255]))
    }

    fn service_with(frames: Vec<RgbaImage>) -> (CaptureService, Arc<FrameSequence>) {
        let source = Arc::new(FrameSequence::from_frames(frames, true));
        let service = CaptureService::new(Arc::clone(&source) as Arc<dyn VideoSource>, 92, 30);
        (service, source)
    }

    #[test]
    fn capture_uses_native_resolution() {
        let (service, _) = service_with(vec![gradient(12, 7)]);
        assert!(service.is_ready());

        let still = service.capture_frame(CapturePurpose::Submit).expect("capture");
        assert_eq!(still.dimensions(), (12, 7));
    }

    #[test]
    fn poll_capture_is_smaller_than_submit_capture() {
        let (service, _) = service_with(vec![gradient(64, 48)]);
        let submit = service.capture_frame(CapturePurpose::Submit).expect("submit");
        let poll = service.capture_frame(CapturePurpose::Poll).expect("poll");
        assert!(poll.bytes().len() < submit.bytes().len());
    }

    #[test]
    fn paused_source_is_not_ready() {
        let (service, source) = service_with(vec![gradient(4, 4)]);
        source.pause();
        assert!(!service.is_ready());
        assert!(matches!(
            service.capture_frame(CapturePurpose::Poll),
            Err(CaptureError::NotReady)
        ));
    }

    #[test]
    fn empty_source_is_not_ready() {
        let (service, _) = service_with(Vec::new());
        assert!(!service.is_ready());
        assert!(matches!(
            service.capture_frame(CapturePurpose::Submit),
            Err(CaptureError::NotReady)
        ));
    }

    #[test]
    fn acquire_missing_device_is_unavailable() {
        let dir = tempdir().expect("temp dir");
        let config = CaptureConfig {
            source: dir.path().join("no-camera"),
            ..CaptureConfig::default()
        };
        assert!(matches!(
            CaptureService::acquire(&config),
            Err(CaptureError::Unavailable(_))
        ));
    }

    #[test]
    fn acquire_single_image_source() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("guest.png");
        gradient(8, 8).save(&path).expect("save");

        let config = CaptureConfig {
            source: path,
            ..CaptureConfig::default()
        };
        let service = CaptureService::acquire(&config).expect("acquire");
        assert!(service.is_ready());
        assert!(service.capture_frame(CapturePurpose::Submit).is_ok());
        // single-frame sources loop like a live feed
        assert!(service.capture_frame(CapturePurpose::Submit).is_ok());
    }
}
