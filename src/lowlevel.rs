//! Low-level building blocks for custom scanning pipelines.
//!
//! These expose resampling, per-region hashing, raw window detection and the
//! consolidation steps behind the free-form scan. Most users should prefer
//! [`crate::IconRecognizer`], [`crate::locate_row`] or [`crate::scan_freeform`].

pub use crate::candidate::band::{cluster_bands, densest_band, pick_row, Band};
pub use crate::candidate::dedup::dedup_detections;
pub use crate::hash::{dhash_region, hamming, hash_grid};
pub use crate::image::resample::{downscale_to_width, fit_to_width, AxisWeights, Downscaled};
pub use crate::search::freeform::{consolidate, detect_windows};
pub use crate::search::grid::{best_row, OUT_OF_BOUNDS_PENALTY};
pub use crate::table::build::{build_from_sheet, SheetLayout};
