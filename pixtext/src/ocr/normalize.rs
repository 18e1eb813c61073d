use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageError, ImageReader, RgbImage};

use crate::error::DecodeError;
use crate::processing::RawUpload;

/// Decoded, bounded working copy of an upload.
///
/// `pixels` is always 3-channel RGB and `max(width, height)` never exceeds the
/// dimension it was normalized against. `encoded` holds the same image
/// re-encoded as JPEG for engines that consume bytes.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub pixels: RgbImage,
    pub encoded: Vec<u8>,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Normalize upload bytes into a bounded working image
///
/// 1. Guesses the format from content and decodes
/// 2. Converts palette, grayscale and alpha inputs to RGB
/// 3. Downscales with Lanczos3 so the long edge is `max_dim` (never upscales)
/// 4. Re-encodes as JPEG at `quality` (clamped to 1..=100)
pub fn normalize(
    raw: &RawUpload,
    max_dim: u32,
    quality: u8,
) -> Result<NormalizedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(raw.bytes.as_ref()))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptData(format!("Failed to read image: {e}")))?;

    let img = reader.decode().map_err(map_decode_error)?;

    let img = resize_if_needed(img, max_dim);
    let pixels = img.to_rgb8();

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));
    pixels
        .write_with_encoder(encoder)
        .map_err(|e| DecodeError::CorruptData(format!("Failed to re-encode image: {e}")))?;

    tracing::debug!(
        file_name = %raw.file_name,
        width = pixels.width(),
        height = pixels.height(),
        encoded_bytes = encoded.len(),
        "Image normalized"
    );

    Ok(NormalizedImage { pixels, encoded })
}

fn map_decode_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        other => DecodeError::CorruptData(other.to_string()),
    }
}

/// Target size whose long edge is exactly `max_dim`, or `None` if it already fits.
fn bounded_dimensions(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let max_dim = max_dim.max(1);
    if width <= max_dim && height <= max_dim {
        return None;
    }

    let scale_short = |short: u32, long: u32| -> u32 {
        let scaled = (u64::from(short) * u64::from(max_dim) + u64::from(long) / 2) / u64::from(long);
        (scaled as u32).clamp(1, max_dim)
    };

    if width >= height {
        Some((max_dim, scale_short(height, width)))
    } else {
        Some((scale_short(width, height), max_dim))
    }
}

fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    match bounded_dimensions(width, height, max_dim) {
        Some((new_width, new_height)) => {
            img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
        }
        None => img,
    }
}
