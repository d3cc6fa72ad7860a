//! Search strategies for locating a row of icons.
//!
//! [`grid`] assumes a fixed header layout and scores a handful of row origins;
//! [`freeform`] slides windows of several sizes over the whole image and
//! consolidates the hits. Both return a [`ScanResult`] holding either exactly
//! [`ROW_SLOTS`] species keys or nothing.

pub mod freeform;
pub mod grid;

pub use freeform::{scan_freeform, FreeformConfig};
pub use grid::{locate_row, GridConfig, RowCandidate};

use crate::candidate::Detection;

/// Number of icons in a recognized row.
pub const ROW_SLOTS: usize = 6;

/// Which scanning strategy the recognizer runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Fixed-layout grid search.
    #[default]
    Grid,
    /// Multi-scale sliding window with band consolidation.
    Freeform,
}

/// Outcome of a scan: six species keys in left-to-right order, or nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    keys: Vec<String>,
}

impl ScanResult {
    /// Result signalling that no row was confidently recognized.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a result from ordered detections; anything but a full row is empty.
    pub(crate) fn from_detections(row: &[Detection<'_>]) -> Self {
        if row.len() != ROW_SLOTS {
            return Self::empty();
        }
        Self {
            keys: row.iter().map(|det| det.key.to_string()).collect(),
        }
    }

    /// Returns the recognized keys; empty when nothing was recognized.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns true when a full row was recognized.
    pub fn is_recognized(&self) -> bool {
        self.keys.len() == ROW_SLOTS
    }

    /// Consumes the result and returns its keys.
    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }
}
