/// Local brightness/contrast enhancement
///
/// The image is composited onto an opaque white canvas first, so
/// transparent regions (e.g. after background removal) come out white
/// rather than black. Then a mild brightness lift and contrast boost are
/// applied and the result is re-encoded as JPEG.
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage};

use crate::error::CollaboratorError;

const SERVICE: &str = "image adjustment";

/// JPEG quality of the enhanced output
const JPEG_QUALITY: u8 = 90;

/// Tone adjustment in the -1.0..=1.0 range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// Positive values move channels toward white, negative toward black
    pub brightness: f32,
    /// Positive values stretch channels away from mid-grey
    pub contrast: f32,
}

/// The fixed adjustment applied to every listing photo
pub const LISTING_ADJUSTMENT: Adjustment = Adjustment {
    brightness: 0.1,
    contrast: 0.1,
};

impl Adjustment {
    fn brighten(self, value: u8) -> u8 {
        let v = value as f32;
        let out = if self.brightness < 0.0 {
            v * (1.0 + self.brightness)
        } else {
            v + (255.0 - v) * self.brightness
        };
        out.floor().clamp(0.0, 255.0) as u8
    }

    fn stretch(self, value: u8) -> u8 {
        // contrast of 1.0 would divide by zero
        let contrast = self.contrast.min(0.999);
        let factor = (contrast + 1.0) / (1.0 - contrast);
        let out = factor * (value as f32 - 127.0) + 127.0;
        out.floor().clamp(0.0, 255.0) as u8
    }

    /// Brightness first, then contrast
    pub fn apply_channel(self, value: u8) -> u8 {
        self.stretch(self.brighten(value))
    }

    pub fn apply(self, image: &mut RgbImage) {
        for pixel in image.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                *channel = self.apply_channel(*channel);
            }
        }
    }
}

/// Source-over composite onto opaque white
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Decode, flatten, adjust and encode
///
/// CPU-bound; call from a blocking context.
pub fn enhance_blocking(bytes: &[u8], adjustment: Adjustment) -> Result<Vec<u8>, CollaboratorError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CollaboratorError::unparseable(SERVICE, format!("failed to decode image: {e}")))?;

    let mut canvas = flatten_on_white(&decoded.to_rgba8());
    adjustment.apply(&mut canvas);

    let mut out = Vec::new();
    canvas
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(|e| CollaboratorError::unparseable(SERVICE, format!("failed to encode JPEG: {e}")))?;

    Ok(out)
}

/// Run the listing adjustment on the blocking pool
pub async fn enhance(bytes: Bytes) -> Result<Bytes, CollaboratorError> {
    tokio::task::spawn_blocking(move || enhance_blocking(&bytes, LISTING_ADJUSTMENT))
        .await
        .map_err(|e| CollaboratorError::unavailable(SERVICE, format!("task join error: {e}")))?
        .map(Bytes::from)
}
