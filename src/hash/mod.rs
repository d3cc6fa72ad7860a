//! Difference hashing (dHash) over luminance regions.
//!
//! A region is area-resampled to a 9x8 grid. In each of the 8 rows the 8
//! adjacent column pairs are compared; a bit is set when the left cell is
//! strictly darker than the right one. Bit `row * 8 + col` of the result holds
//! the comparison of columns `col` and `col + 1` in `row`, so the first
//! comparison of the top row is the least significant bit.

use crate::image::resample::{resample_region_into, AxisWeights};
use crate::image::{ImageView, Raster};
use crate::util::{IconScanError, IconScanResult};
use std::fmt;

/// Resampled grid width (one more than the comparisons per row).
pub const GRID_COLS: usize = 9;
/// Resampled grid height.
pub const GRID_ROWS: usize = 8;
/// Number of bits in a hash.
pub const HASH_BITS: u32 = 64;

/// 64-bit perceptual difference hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DHash(pub u64);

impl DHash {
    /// Hamming distance to `other` in `[0, 64]`.
    #[inline]
    pub fn distance(self, other: DHash) -> u32 {
        hamming(self.0, other.0)
    }

    /// Parses a hexadecimal string of at most 16 digits.
    ///
    /// Leading/trailing whitespace and an optional `0x` prefix are accepted;
    /// everything else must be a hex digit.
    pub fn from_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty()
            || digits.len() > 16
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(DHash)
    }

    /// Formats the hash as 16 zero-padded lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Returns the comparison bit for `(row, col)`.
    pub fn bit(self, row: usize, col: usize) -> bool {
        debug_assert!(row < GRID_ROWS && col < GRID_COLS - 1);
        (self.0 >> (row * (GRID_COLS - 1) + col)) & 1 == 1
    }
}

impl fmt::Display for DHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for DHash {
    fn from(value: u64) -> Self {
        DHash(value)
    }
}

/// Number of differing bits between two hashes.
#[inline]
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Packs the comparison bits of a resampled 9x8 luminance grid.
pub fn hash_grid(grid: &[f32; GRID_COLS * GRID_ROWS]) -> DHash {
    let mut hash = 0u64;
    let mut bit = 0u32;
    for row in grid.chunks_exact(GRID_COLS) {
        for pair in row.windows(2) {
            if pair[0] < pair[1] {
                hash |= 1u64 << bit;
            }
            bit += 1;
        }
    }
    DHash(hash)
}

/// Hashes fixed-size regions with resampling weights computed once.
///
/// Scans hash thousands of equally sized slots; sharing the weights keeps each
/// hash to two small separable passes.
#[derive(Clone, Debug)]
pub struct SlotHasher {
    xw: AxisWeights,
    yw: AxisWeights,
}

impl SlotHasher {
    /// Creates a hasher for `width x height` regions.
    pub fn new(width: usize, height: usize) -> IconScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(IconScanError::InvalidDimensions { width, height });
        }
        Ok(Self {
            xw: AxisWeights::area(width, GRID_COLS)?,
            yw: AxisWeights::area(height, GRID_ROWS)?,
        })
    }

    /// Returns the region width.
    pub fn width(&self) -> usize {
        self.xw.src_len()
    }

    /// Returns the region height.
    pub fn height(&self) -> usize {
        self.yw.src_len()
    }

    /// Hashes the region whose top-left corner is `(x, y)`.
    ///
    /// Returns `None` when the region does not fit inside `view`.
    pub fn hash_at(&self, view: ImageView<'_, f32>, x: usize, y: usize) -> Option<DHash> {
        let mut grid = [0.0f32; GRID_COLS * GRID_ROWS];
        resample_region_into(view, x, y, &self.xw, &self.yw, &mut grid)?;
        Some(hash_grid(&grid))
    }
}

/// Hashes an arbitrary region of a luminance plane.
///
/// Returns `None` when the region is empty or leaves the plane.
pub fn dhash_region(
    view: ImageView<'_, f32>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Option<DHash> {
    SlotHasher::new(width, height).ok()?.hash_at(view, x, y)
}

/// Hashes a whole raster, e.g. a single icon sprite.
pub fn hash_raster(raster: &Raster) -> DHash {
    let luma = raster.to_luma();
    // Rasters are never empty, so the full-frame region always fits.
    dhash_region(luma.view(), 0, 0, raster.width(), raster.height()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{dhash_region, hamming, hash_grid, DHash, GRID_COLS, GRID_ROWS};
    use crate::image::ImageView;

    #[test]
    fn hamming_counts_differing_bits() {
        assert_eq!(hamming(0, 0), 0);
        assert_eq!(hamming(0, u64::MAX), 64);
        assert_eq!(hamming(0b1011, 0b0001), 2);
        assert_eq!(hamming(0b1011, 0b0001), hamming(0b0001, 0b1011));
    }

    #[test]
    fn increasing_rows_set_every_bit() {
        let mut grid = [0.0f32; GRID_COLS * GRID_ROWS];
        for (idx, cell) in grid.iter_mut().enumerate() {
            *cell = (idx % GRID_COLS) as f32;
        }
        assert_eq!(hash_grid(&grid), DHash(u64::MAX));
    }

    #[test]
    fn equal_neighbours_leave_bit_clear() {
        let grid = [7.0f32; GRID_COLS * GRID_ROWS];
        assert_eq!(hash_grid(&grid), DHash(0));
    }

    #[test]
    fn first_comparison_is_least_significant_bit() {
        let mut grid = [0.0f32; GRID_COLS * GRID_ROWS];
        grid[1] = 1.0;
        let hash = hash_grid(&grid);
        assert_eq!(hash, DHash(1));
        assert!(hash.bit(0, 0));
    }

    #[test]
    fn hex_round_trip_is_zero_padded() {
        let hash = DHash(0xab);
        assert_eq!(hash.to_hex(), "00000000000000ab");
        assert_eq!(DHash::from_hex("00000000000000ab"), Some(hash));
        assert_eq!(DHash::from_hex("0xAB"), Some(hash));
        assert_eq!(DHash::from_hex("not-hex"), None);
        assert_eq!(DHash::from_hex("11112222333344445"), None);
    }

    #[test]
    fn hex_rejects_sign_prefixes() {
        assert_eq!(DHash::from_hex("+ff"), None);
        assert_eq!(DHash::from_hex("0x+ff"), None);
        assert_eq!(DHash::from_hex("-1"), None);
        assert_eq!(DHash::from_hex(" ff "), Some(DHash(0xff)));
    }

    #[test]
    fn horizontal_gradient_hashes_to_all_ones() {
        let width = 40;
        let height = 30;
        let data: Vec<f32> = (0..width * height).map(|i| (i % width) as f32).collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        assert_eq!(
            dhash_region(view, 0, 0, width, height),
            Some(DHash(u64::MAX))
        );
        assert_eq!(dhash_region(view, 1, 0, width, height), None);
    }
}
