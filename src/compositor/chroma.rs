//! Per-pixel color keying in RGB space.

use image::RgbaImage;

/// Reference color removed from the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl KeyColor {
    pub const GREEN: KeyColor = KeyColor { r: 0, g: 255, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared Euclidean distance from `(r, g, b)` to this color.
    pub fn distance_sq(&self, r: u8, g: u8, b: u8) -> u32 {
        let dr = i32::from(r) - i32::from(self.r);
        let dg = i32::from(g) - i32::from(self.g);
        let db = i32::from(b) - i32::from(self.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for KeyColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Euclidean distance cutoff.  Negative values are treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f32);

impl Threshold {
    pub fn new(distance: f32) -> Self {
        Self(if distance.is_finite() { distance.max(0.0) } else { 0.0 })
    }

    pub fn distance(&self) -> f32 {
        self.0
    }

    /// `true` when a squared distance lies within the cutoff (inclusive).
    pub fn covers(&self, distance_sq: u32) -> bool {
        distance_sq as f32 <= self.0 * self.0
    }
}

/// Key color plus cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaKey {
    pub color: KeyColor,
    pub threshold: Threshold,
}

impl ChromaKey {
    pub fn new(color: KeyColor, threshold: Threshold) -> Self {
        Self { color, threshold }
    }

    /// Zero the alpha of every pixel within the threshold of the key color.
    ///
    /// Color channels are never modified, and pixels outside the threshold
    /// keep their alpha.  Returns the number of pixels keyed out.
    pub fn apply(&self, frame: &mut RgbaImage) -> usize {
        let mut keyed = 0;
        for px in frame.chunks_exact_mut(4) {
            if self.threshold.covers(self.color.distance_sq(px[0], px[1], px[2])) {
                px[3] = 0;
                keyed += 1;
            }
        }
        keyed
    }
}
