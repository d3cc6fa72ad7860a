//! Error types for iconscan.

use thiserror::Error;

/// Result alias for iconscan operations.
pub type IconScanResult<T> = std::result::Result<T, IconScanError>;

/// Errors that can occur while loading reference data or preparing rasters.
///
/// Hashing and matching never fail. A scan that finds no confident row is not
/// an error either; it yields an empty [`crate::ScanResult`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IconScanError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the declared geometry requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A reference entry does not hold a 64-bit hexadecimal hash.
    #[error("malformed hash for `{key}`: {value:?}")]
    MalformedHash { key: String, value: String },
    /// A reference payload parsed but contained no entries.
    #[error("reference table is empty")]
    EmptyTable,
    /// A reference payload could not be parsed.
    #[error("malformed reference table: {reason}")]
    MalformedTable { reason: String },
    /// Every reference table source failed; one message per attempt, in order.
    #[error("reference table unavailable ({})", attempts.join("; "))]
    TableUnavailable { attempts: Vec<String> },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
