//! JPEG + base64 encoding for transport

use crate::error::VisionError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use stepsense_core::CapturedImage;

/// Downscale to fit `max` (aspect kept), re-encode as JPEG and base64 it.
///
/// Re-encoding drops all metadata from the original file.
pub fn encode_for_transport(
    image: DynamicImage,
    max: (u32, u32),
    quality: u8,
) -> Result<CapturedImage, VisionError> {
    let image = if image.width() > max.0 || image.height() > max.1 {
        image.resize(max.0, max.1, FilterType::Triangle)
    } else {
        image
    };

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(VisionError::Camera("Captured frame is empty".to_string()));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode(rgb.as_raw(), width, height, ColorType::Rgb8)?;

    Ok(CapturedImage::new(STANDARD.encode(&jpeg), width, height))
}

/// Decode an encoded image file and prepare it for transport
pub fn encode_bytes(bytes: &[u8], max: (u32, u32), quality: u8) -> Result<CapturedImage, VisionError> {
    let image = image::load_from_memory(bytes)?;
    encode_for_transport(image, max, quality)
}
