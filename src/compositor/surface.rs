//! Destination surfaces for composited frames.

use std::sync::{Mutex, MutexGuard, PoisonError};

use image::RgbaImage;

/// A drawable target the compositor blits finished frames onto.
pub trait Surface: Send + Sync {
    fn present(&self, frame: &RgbaImage);
}

#[derive(Default)]
struct SurfaceState {
    last: Option<RgbaImage>,
    writes: u64,
}

/// In-memory RGBA surface.
///
/// Keeps the most recent frame for whatever renders the overlay and counts
/// every write.
#[derive(Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of frames presented so far.
    pub fn writes(&self) -> u64 {
        self.lock().writes
    }

    pub fn last_frame(&self) -> Option<RgbaImage> {
        self.lock().last.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Surface for MemorySurface {
    fn present(&self, frame: &RgbaImage) {
        let mut st = self.lock();
        match st.last.as_mut() {
            Some(last) if last.dimensions() == frame.dimensions() => {
                last.copy_from_slice(frame.as_raw());
            }
            _ => st.last = Some(frame.clone()),
        }
        st.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn present_records_frame_and_counts() {
        let surface = MemorySurface::new();
        assert_eq!(surface.writes(), 0);
        assert!(surface.last_frame().is_none());

        surface.present(&RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 4])));
        surface.present(&RgbaImage::from_pixel(2, 1, Rgba([5, 6, 7, 8])));
        assert_eq!(surface.writes(), 2);
        assert_eq!(
            *surface.last_frame().expect("frame").get_pixel(1, 0),
            Rgba([5, 6, 7, 8])
        );
    }

    #[test]
    fn present_handles_resize() {
        let surface = MemorySurface::new();
        surface.present(&RgbaImage::new(2, 2));
        surface.present(&RgbaImage::new(5, 3));
        assert_eq!(surface.last_frame().expect("frame").dimensions(), (5, 3));
    }
}
