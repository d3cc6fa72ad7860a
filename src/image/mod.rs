//! Image views, owned planes, and RGBA rasters.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows, as produced by capture
//! APIs that align each row.
//!
//! Scans work on a single `f32` luminance plane derived once from the input
//! [`Raster`]; every slot hash reads from that plane.

use crate::util::{IconScanError, IconScanResult};

#[cfg(feature = "image-io")]
pub mod io;
mod raster;
pub mod resample;

pub use raster::{Raster, LUMA_WEIGHTS};

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> IconScanResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> IconScanResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(IconScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns true when the `width x height` rectangle at `(x, y)` lies inside the view.
    pub fn contains_rect(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        match (x.checked_add(width), y.checked_add(height)) {
            (Some(end_x), Some(end_y)) => end_x <= self.width && end_y <= self.height,
            _ => false,
        }
    }
}

/// Owned contiguous single-channel image plane.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a row-major buffer whose length is exactly `width * height`.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> IconScanResult<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(IconScanError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(IconScanError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> IconScanResult<usize> {
    if width == 0 || height == 0 {
        return Err(IconScanError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(IconScanError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(IconScanError::InvalidDimensions { width, height })?;
    Ok(needed)
}
