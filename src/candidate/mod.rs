//! Detection records and free-form consolidation utilities.
//!
//! Includes spatial deduplication and horizontal band clustering used when
//! the icon row geometry is not known in advance.

pub(crate) mod band;
pub(crate) mod dedup;

use std::cmp::Ordering;

/// One slot whose best reference match was recorded during a scan.
///
/// Coordinates are in downscaled pixel space; `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection<'a> {
    /// Species key of the closest reference entry.
    pub key: &'a str,
    /// Hamming distance to that entry.
    pub distance: u32,
    /// Left edge of the slot.
    pub x: usize,
    /// Top edge of the slot.
    pub y: usize,
    /// Slot width.
    pub width: usize,
    /// Slot height.
    pub height: usize,
}

impl Detection<'_> {
    /// Horizontal center of the slot.
    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }

    /// Vertical center of the slot.
    pub fn center_y(&self) -> f32 {
        self.y as f32 + self.height as f32 / 2.0
    }
}

/// Orders detections by ascending distance with deterministic tie-breaking.
pub(crate) fn detection_cmp(a: &Detection<'_>, b: &Detection<'_>) -> Ordering {
    a.distance
        .cmp(&b.distance)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
        .then_with(|| a.width.cmp(&b.width))
}
