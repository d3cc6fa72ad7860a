//! iconscan recognizes rows of species icons in screenshots.
//!
//! Icons are identified by 64-bit difference hashes (dHash) matched against a
//! reference table by Hamming distance. The primary strategy searches a fixed
//! six-slot header layout; a free-form multi-scale scan is available when the
//! layout is unknown. Parallel scoring is available via the `rayon` feature,
//! image decoding via `image-io`, and HTTP table sources via `http`.

mod candidate;
pub mod hash;
pub mod image;
pub mod lowlevel;
mod recognizer;
pub mod search;
pub mod table;
mod trace;
pub mod util;

pub use crate::candidate::Detection;
pub use crate::hash::{hash_raster, DHash, SlotHasher};
pub use crate::image::{ImageView, OwnedImage, Raster};
pub use crate::recognizer::{IconRecognizer, RecognizerConfig};
pub use crate::search::{
    locate_row, scan_freeform, FreeformConfig, GridConfig, RowCandidate, ScanResult, Strategy,
    ROW_SLOTS,
};
pub use crate::table::{Nearest, ReferenceTable, TableLoader, TableSource};
pub use crate::util::{IconScanError, IconScanResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
