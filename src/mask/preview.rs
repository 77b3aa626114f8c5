use anyhow::{Context, Result};
use image::{GrayImage, ImageFormat};
use std::path::Path;

use super::BinaryMask;

const INSIDE: u8 = 255;
const OUTSIDE: u8 = 0;

/// Render a mask as a grayscale image, white = inside
///
/// Row 0 of the image is the northern raster edge, so the picture lines up
/// with the map the shape was drawn on.
pub fn mask_image(mask: &BinaryMask) -> Result<GrayImage> {
    let width = u32::try_from(mask.width()).context("Mask too wide for an image")?;
    let height = u32::try_from(mask.height()).context("Mask too tall for an image")?;

    let pixels: Vec<u8> = mask
        .as_slice()
        .iter()
        .map(|&b| if b == 1 { INSIDE } else { OUTSIDE })
        .collect();

    GrayImage::from_raw(width, height, pixels)
        .with_context(|| format!("Mask data does not fill a {width}x{height} image"))
}

/// Write a mask preview as a PNG file
pub fn write_png(path: &Path, mask: &BinaryMask) -> Result<()> {
    mask_image(mask)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write mask preview: {}", path.display()))
}
