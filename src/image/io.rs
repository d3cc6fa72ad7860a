//! Convenience helpers for decoding rasters via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::Raster;
use crate::util::{IconScanError, IconScanResult};
use std::path::Path;

/// Creates a raster from an RGBA image buffer.
pub fn raster_from_rgba_image(img: &image::RgbaImage) -> IconScanResult<Raster> {
    Raster::from_rgba(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Creates a raster from any decoded image, converting to RGBA8.
pub fn raster_from_dynamic(img: &image::DynamicImage) -> IconScanResult<Raster> {
    raster_from_rgba_image(&img.to_rgba8())
}

/// Decodes an in-memory encoded image (PNG, JPEG) into a raster.
pub fn decode_raster(bytes: &[u8]) -> IconScanResult<Raster> {
    let img = image::load_from_memory(bytes).map_err(|err| IconScanError::ImageIo {
        reason: err.to_string(),
    })?;
    raster_from_dynamic(&img)
}

/// Loads an image from disk and converts it to a raster.
pub fn load_raster<P: AsRef<Path>>(path: P) -> IconScanResult<Raster> {
    let img = image::open(path).map_err(|err| IconScanError::ImageIo {
        reason: err.to_string(),
    })?;
    raster_from_dynamic(&img)
}
