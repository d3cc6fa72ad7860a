//! Owned RGBA8 rasters and luminance conversion.

use crate::image::OwnedImage;
use crate::util::{IconScanError, IconScanResult};

/// Luminance weights applied to the red, green and blue channels.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Owned, decoded RGBA8 raster in row-major order.
///
/// Alpha is carried along but does not contribute to luminance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Raster {
    /// Wraps an RGBA8 buffer of exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: usize, height: usize) -> IconScanResult<Self> {
        let needed = pixel_count(width, height)?
            .checked_mul(4)
            .ok_or(IconScanError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(IconScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Expands an RGB8 buffer to RGBA8 with opaque alpha.
    pub fn from_rgb(data: &[u8], width: usize, height: usize) -> IconScanResult<Self> {
        let count = pixel_count(width, height)?;
        let needed = count
            .checked_mul(3)
            .ok_or(IconScanError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(IconScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        let mut rgba = Vec::with_capacity(count * 4);
        for px in data.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self::from_rgba(rgba, width, height)
    }

    /// Builds a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> IconScanResult<Self>
    where
        F: FnMut(usize, usize) -> [u8; 4],
    {
        let count = pixel_count(width, height)?;
        let mut data = Vec::with_capacity(count * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba(data, width, height)
    }

    /// Returns the raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the raw RGBA8 bytes.
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copies `src` into this raster with its top-left corner at `(x, y)`.
    ///
    /// Pixels falling outside this raster are clipped.
    pub fn blit(&mut self, src: &Raster, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_w = src.width.min(self.width - x);
        let copy_h = src.height.min(self.height - y);
        for row in 0..copy_h {
            let src_start = row * src.width * 4;
            let dst_start = ((y + row) * self.width + x) * 4;
            self.data[dst_start..dst_start + copy_w * 4]
                .copy_from_slice(&src.data[src_start..src_start + copy_w * 4]);
        }
    }

    /// Converts the raster to a luminance plane using [`LUMA_WEIGHTS`].
    pub fn to_luma(&self) -> OwnedImage<f32> {
        let [wr, wg, wb] = LUMA_WEIGHTS;
        let luma: Vec<f32> = self
            .data
            .chunks_exact(4)
            .map(|px| px[0] as f32 * wr + px[1] as f32 * wg + px[2] as f32 * wb)
            .collect();
        OwnedImage {
            data: luma,
            width: self.width,
            height: self.height,
        }
    }
}

fn pixel_count(width: usize, height: usize) -> IconScanResult<usize> {
    if width == 0 || height == 0 {
        return Err(IconScanError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(IconScanError::InvalidDimensions { width, height })
}
