//! JPEG snapshots of a frame, serialised as data URIs for the backend.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

/// A compressed still frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl StillImage {
    /// Encode `frame` as JPEG at `quality` (clamped into 1 – 100).
    ///
    /// JPEG carries no alpha channel; it is dropped.
    pub fn encode_jpeg(frame: &RgbaImage, quality: u8) -> Result<Self, image::ImageError> {
        let (width, height) = frame.dimensions();
        let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
            rgb.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )?;

        Ok(Self {
            bytes,
            width,
            height,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `data:image/jpeg;base64,…`
    pub fn to_data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn noisy(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 37 % 256) as u8, (y * 91 % 256) as u8, ((x ^ y) % 256) as u8, 255])
        })
    }

    #[test]
    fn encodes_jpeg_with_soi_marker() {
        let still = StillImage::encode_jpeg(&noisy(16, 8), 80).expect("encode");
        assert_eq!(&still.bytes()[..2], &[0xFF, 0xD8]);
        assert_eq!(still.dimensions(), (16, 8));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let frame = noisy(64, 64);
        let high = StillImage::encode_jpeg(&frame, 95).expect("encode");
        let low = StillImage::encode_jpeg(&frame, 10).expect("encode");
        assert!(low.bytes().len() < high.bytes().len());
    }

    #[test]
    fn data_uri_has_jpeg_prefix_and_decodes() {
        let still = StillImage::encode_jpeg(&noisy(4, 4), 50).expect("encode");
        let uri = still.to_data_uri();
        let payload = uri
            .strip_prefix("data:image/jpeg;base64,")
            .expect("prefix");
        assert_eq!(BASE64.decode(payload).expect("base64"), still.bytes());
    }

    #[test]
    fn zero_quality_is_clamped() {
        assert!(StillImage::encode_jpeg(&noisy(4, 4), 0).is_ok());
    }
}
