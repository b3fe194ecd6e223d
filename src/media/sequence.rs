//! [`VideoSource`] trait and the [`FrameSequence`] implementation.
//!
//! A source behaves like a media element: it starts paused, [`play`]
//! resumes it, [`pause`] freezes it, and a non-looping source reports
//! [`is_ended`] once its last frame has been read.  Calling [`play`] on an
//! ended source rewinds it.
//!
//! [`play`]: VideoSource::play
//! [`pause`]: VideoSource::pause
//! [`is_ended`]: VideoSource::is_ended

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use image::RgbaImage;
use thiserror::Error;

/// Errors raised while opening a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source not found: {0}")]
    Missing(PathBuf),

    #[error("source contains no frames: {0}")]
    Empty(PathBuf),

    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
}

/// A continuously playing stream of RGBA frames.
///
/// Implementations use interior mutability: the compositor task reads
/// frames while the owner pauses and resumes the same source.
pub trait VideoSource: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;
    fn is_ended(&self) -> bool;

    /// Native resolution of the frame the next [`read_frame`] will deliver.
    ///
    /// `None` while the source has nothing to show.
    ///
    /// [`read_frame`]: VideoSource::read_frame
    fn resolution(&self) -> Option<(u32, u32)>;

    /// Copy the current frame into `dst` and advance playback.
    ///
    /// Returns `false` without touching `dst` when the source is paused,
    /// ended, or `dst` does not match the current resolution.
    fn read_frame(&self, dst: &mut RgbaImage) -> bool;
}

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Default)]
struct Playback {
    position: usize,
    paused: bool,
    ended: bool,
}

/// Decoded frames played back in order.
pub struct FrameSequence {
    frames: Vec<RgbaImage>,
    looping: bool,
    playback: Mutex<Playback>,
}

impl FrameSequence {
    /// Wrap already-decoded frames.  The sequence starts paused.
    pub fn from_frames(frames: Vec<RgbaImage>, looping: bool) -> Self {
        Self {
            frames,
            looping,
            playback: Mutex::new(Playback {
                paused: true,
                ..Playback::default()
            }),
        }
    }

    /// Load every `.png` / `.jpg` in `path` (sorted by file name), or the
    /// single image at `path`.
    pub fn open(path: &Path, looping: bool) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::Missing(path.to_path_buf()));
        }

        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_frame_file(p))
                .collect();
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };

        if files.is_empty() {
            return Err(SourceError::Empty(path.to_path_buf()));
        }

        let frames = files
            .iter()
            .map(|file| image::open(file).map(|img| img.to_rgba8()))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("media: loaded {} frame(s) from {}", frames.len(), path.display());
        Ok(Self::from_frames(frames, looping))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn playback(&self) -> MutexGuard<'_, Playback> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl VideoSource for FrameSequence {
    fn play(&self) {
        let mut pb = self.playback();
        if pb.ended {
            pb.position = 0;
            pb.ended = false;
        }
        pb.paused = false;
    }

    fn pause(&self) {
        self.playback().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.playback().paused
    }

    fn is_ended(&self) -> bool {
        self.playback().ended
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        let pb = self.playback();
        self.frames.get(pb.position).map(|f| f.dimensions())
    }

    fn read_frame(&self, dst: &mut RgbaImage) -> bool {
        let mut pb = self.playback();
        if pb.paused || pb.ended {
            return false;
        }
        let Some(frame) = self.frames.get(pb.position) else {
            return false;
        };
        if frame.dimensions() != dst.dimensions() {
            return false;
        }

        dst.copy_from_slice(frame.as_raw());

        pb.position += 1;
        if pb.position == self.frames.len() {
            if self.looping {
                pb.position = 0;
            } else {
                pb.position -= 1;
                pb.ended = true;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn solid(w: u32, h: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([value, value, value, 255]))
    }

    #[test]
    fn starts_paused_and_reads_nothing() {
        let seq = FrameSequence::from_frames(vec![solid(2, 2, 1)], true);
        let mut dst = RgbaImage::new(2, 2);
        assert!(seq.is_paused());
        assert!(!seq.read_frame(&mut dst));
    }

    #[test]
    fn plays_frames_in_order_and_loops() {
        let seq = FrameSequence::from_frames(vec![solid(1, 1, 10), solid(1, 1, 20)], true);
        seq.play();
        let mut dst = RgbaImage::new(1, 1);

        let mut seen = Vec::new();
        for _ in 0..3 {
            assert!(seq.read_frame(&mut dst));
            seen.push(dst.get_pixel(0, 0)[0]);
        }
        assert_eq!(seen, vec![10, 20, 10]);
        assert!(!seq.is_ended());
    }

    #[test]
    fn non_looping_sequence_ends_after_last_frame() {
        let seq = FrameSequence::from_frames(vec![solid(1, 1, 10), solid(1, 1, 20)], false);
        seq.play();
        let mut dst = RgbaImage::new(1, 1);

        assert!(seq.read_frame(&mut dst));
        assert!(seq.read_frame(&mut dst));
        assert!(seq.is_ended());
        assert!(!seq.read_frame(&mut dst));

        // play() on an ended source rewinds it
        seq.play();
        assert!(!seq.is_ended());
        assert!(seq.read_frame(&mut dst));
        assert_eq!(dst.get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn resolution_follows_current_frame() {
        let seq = FrameSequence::from_frames(vec![solid(4, 2, 0), solid(8, 6, 0)], true);
        seq.play();
        assert_eq!(seq.resolution(), Some((4, 2)));

        let mut dst = RgbaImage::new(4, 2);
        assert!(seq.read_frame(&mut dst));
        assert_eq!(seq.resolution(), Some((8, 6)));

        // wrong-sized destination is refused without advancing
        assert!(!seq.read_frame(&mut dst));
        assert_eq!(seq.resolution(), Some((8, 6)));
    }

    #[test]
    fn pause_stops_delivery() {
        let seq = FrameSequence::from_frames(vec![solid(1, 1, 5)], true);
        seq.play();
        seq.pause();
        let mut dst = RgbaImage::new(1, 1);
        assert!(!seq.read_frame(&mut dst));
    }

    #[test]
    fn open_missing_path_fails() {
        let dir = tempdir().expect("temp dir");
        let err = FrameSequence::open(&dir.path().join("nope"), true)
            .err()
            .expect("missing path must fail");
        assert!(matches!(err, SourceError::Missing(_)));
    }

    #[test]
    fn open_empty_dir_fails() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("notes.txt"), "not a frame").expect("write");
        let err = FrameSequence::open(dir.path(), true)
            .err()
            .expect("empty dir must fail");
        assert!(matches!(err, SourceError::Empty(_)));
    }

    #[test]
    fn open_dir_loads_sorted_frames() {
        let dir = tempdir().expect("temp dir");
        solid(3, 3, 200).save(dir.path().join("b.png")).expect("save");
        solid(3, 3, 100).save(dir.path().join("a.png")).expect("save");

        let seq = FrameSequence::open(dir.path(), false).expect("open");
        assert_eq!(seq.len(), 2);

        seq.play();
        let mut dst = RgbaImage::new(3, 3);
        assert!(seq.read_frame(&mut dst));
        assert_eq!(dst.get_pixel(0, 0)[0], 100);
    }
}
