//! Image decode/encode helpers.
//!
//! Inputs in any supported container are normalized to RGBA on decode so the
//! segmentation capability always receives an alpha-capable image; outputs are
//! always encoded as PNG.

use anyhow::Context;
use image::{ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// Extension used for every archive member, matching [`encode_png`].
pub const OUTPUT_EXTENSION: &str = "png";

/// Decode an image from raw bytes and normalize it to RGBA.
///
/// The format is sniffed from the bytes, not the filename, so a mislabeled
/// but valid image still decodes and a corrupt blob fails regardless of its
/// extension.
pub fn decode_rgba(data: &[u8]) -> Result<RgbaImage, anyhow::Error> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to sniff image format")?;
    let img = reader.decode().context("Failed to decode image")?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, anyhow::Error> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(buffer)
}
