//! Fixed-layout grid search for a row of six icons.
//!
//! The screenshot is downscaled to a target width, then a small set of row
//! origins is scored: a few horizontal offsets (centered, shifted left and
//! right, flush left, flush right) at every vertical step inside a band near
//! the top of the image. Each row hashes its six slots, matches them against
//! the reference table, and sums the distances. The lowest total among rows
//! with enough acceptable slots wins, and its keys are returned only if every
//! slot is acceptable.

use crate::candidate::Detection;
use crate::hash::SlotHasher;
use crate::image::resample::downscale_to_width;
use crate::image::{ImageView, Raster};
use crate::search::{ScanResult, ROW_SLOTS};
use crate::table::ReferenceTable;
use crate::trace::{trace_event, trace_span};
use crate::util::{IconScanError, IconScanResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Distance charged for a slot that does not fit inside the image.
pub const OUT_OF_BOUNDS_PENALTY: u32 = 999;

/// Configuration for the fixed-layout grid search.
///
/// Slot size, gap, padding and shift are given in source pixels and scaled
/// together with the image.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Width the screenshot is downscaled to before scanning (never upscaled).
    pub target_width: usize,
    /// Icon slot width.
    pub slot_width: usize,
    /// Icon slot height.
    pub slot_height: usize,
    /// Horizontal gap between adjacent slots.
    pub gap: usize,
    /// Padding before the first slot and after the last one.
    pub padding: usize,
    /// Top of the vertical search band as a fraction of image height.
    pub y_min_frac: f32,
    /// Bottom of the vertical search band as a fraction of image height.
    pub y_max_frac: f32,
    /// Vertical step in downscaled pixels; `None` uses `max(2, round(2 * scale))`.
    pub y_step: Option<usize>,
    /// Offset applied left and right of the centered row origin.
    pub x_shift: usize,
    /// Largest Hamming distance for a slot to count as acceptable.
    pub max_distance: u32,
    /// Minimum number of acceptable slots for a row to be considered.
    pub min_ok: usize,
    /// Score rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            target_width: 1000,
            slot_width: 40,
            slot_height: 30,
            gap: 6,
            padding: 6,
            y_min_frac: 0.0,
            y_max_frac: 0.25,
            y_step: None,
            x_shift: 40,
            max_distance: 14,
            min_ok: 5,
            parallel: false,
        }
    }
}

impl GridConfig {
    /// Settings used for pasted team screenshots: every slot must match.
    pub fn strict() -> Self {
        Self {
            target_width: 1100,
            y_max_frac: 0.22,
            min_ok: ROW_SLOTS,
            ..Self::default()
        }
    }

    /// Checks that the configuration describes a searchable layout.
    pub fn validate(&self) -> IconScanResult<()> {
        if self.target_width == 0 {
            return Err(IconScanError::InvalidInput("target_width must be > 0"));
        }
        if self.slot_width == 0 || self.slot_height == 0 {
            return Err(IconScanError::InvalidInput("slot size must be > 0"));
        }
        if self.y_step == Some(0) {
            return Err(IconScanError::InvalidInput("y_step must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.y_min_frac)
            || !(0.0..=1.0).contains(&self.y_max_frac)
            || self.y_min_frac > self.y_max_frac
        {
            return Err(IconScanError::InvalidInput(
                "vertical band must satisfy 0 <= y_min_frac <= y_max_frac <= 1",
            ));
        }
        if self.min_ok > ROW_SLOTS {
            return Err(IconScanError::InvalidInput("min_ok must be <= 6"));
        }
        Ok(())
    }
}

/// One scored hypothesis for where the icon row sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCandidate<'a> {
    /// Row origin (before padding) in downscaled pixels.
    pub x: usize,
    /// Top edge of the slots in downscaled pixels.
    pub y: usize,
    /// Sum of the six slot distances.
    pub total: u32,
    /// Number of slots within the distance threshold.
    pub ok_count: usize,
    /// Best match per slot; `None` where the slot left the image.
    pub slots: [Option<Detection<'a>>; ROW_SLOTS],
}

impl<'a> RowCandidate<'a> {
    /// Returns the six detections if every slot matched within `max_distance`.
    pub fn accepted(&self, max_distance: u32) -> Option<Vec<Detection<'a>>> {
        self.slots
            .iter()
            .copied()
            .map(|slot| slot.filter(|det| det.distance <= max_distance))
            .collect()
    }
}

/// Slot geometry and search ranges in downscaled pixel space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RowGeometry {
    pub(crate) slot_width: usize,
    pub(crate) slot_height: usize,
    pub(crate) gap: usize,
    pub(crate) padding: usize,
    pub(crate) y_min: usize,
    pub(crate) y_max: usize,
    pub(crate) y_step: usize,
    pub(crate) x_candidates: Vec<usize>,
}

impl RowGeometry {
    /// Returns `None` when the scaled slots are degenerate or no row fits vertically.
    pub(crate) fn new(width: usize, height: usize, scale: f32, cfg: &GridConfig) -> Option<Self> {
        let scaled = |v: usize| (v as f32 * scale).round() as i64;
        let w = width as i64;
        let h = height as i64;

        let slot_width = scaled(cfg.slot_width);
        let slot_height = scaled(cfg.slot_height);
        if slot_width <= 0 || slot_height <= 0 {
            return None;
        }
        let gap = scaled(cfg.gap);
        let padding = scaled(cfg.padding);
        let shift = scaled(cfg.x_shift);
        let y_step = cfg
            .y_step
            .map(|step| step as i64)
            .unwrap_or_else(|| ((2.0 * scale).round() as i64).max(2));

        let y_min = ((cfg.y_min_frac * h as f32).round() as i64).max(0);
        let y_max = (h - slot_height - 1).min((cfg.y_max_frac * h as f32).round() as i64);
        if y_max < y_min {
            return None;
        }

        let slots = ROW_SLOTS as i64;
        let row_width = padding * 2 + slot_width * slots + gap * (slots - 1);
        let max_base = (w - row_width).max(0);
        let centered = (((w - row_width) as f64 / 2.0).round() as i64).max(0);
        let mut x_candidates: Vec<usize> = Vec::with_capacity(5);
        for x in [
            centered,
            (centered - shift).max(0),
            (centered + shift).max(0),
            0,
            max_base,
        ] {
            let x = x.clamp(0, max_base) as usize;
            if !x_candidates.contains(&x) {
                x_candidates.push(x);
            }
        }

        Some(Self {
            slot_width: slot_width as usize,
            slot_height: slot_height as usize,
            gap: gap as usize,
            padding: padding as usize,
            y_min: y_min as usize,
            y_max: y_max as usize,
            y_step: y_step as usize,
            x_candidates,
        })
    }

    /// Left edge of slot `index` for a row starting at `x_base`.
    pub(crate) fn slot_x(&self, x_base: usize, index: usize) -> usize {
        x_base + self.padding + index * (self.slot_width + self.gap)
    }

    fn rows(&self) -> Vec<usize> {
        (self.y_min..=self.y_max).step_by(self.y_step).collect()
    }
}

/// Scores the row whose origin is `(x_base, y)`.
fn score_row<'a>(
    view: ImageView<'_, f32>,
    geometry: &RowGeometry,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    max_distance: u32,
    x_base: usize,
    y: usize,
) -> RowCandidate<'a> {
    let mut slots = [None; ROW_SLOTS];
    let mut total = 0u32;
    let mut ok_count = 0usize;
    for (i, slot) in slots.iter_mut().enumerate() {
        let x = geometry.slot_x(x_base, i);
        let Some(hash) = hasher.hash_at(view, x, y) else {
            total += OUT_OF_BOUNDS_PENALTY;
            continue;
        };
        let hit = table.nearest(hash);
        total += hit.distance;
        if hit.distance <= max_distance {
            ok_count += 1;
        }
        *slot = Some(Detection {
            key: hit.key,
            distance: hit.distance,
            x,
            y,
            width: geometry.slot_width,
            height: geometry.slot_height,
        });
    }
    RowCandidate {
        x: x_base,
        y,
        total,
        ok_count,
        slots,
    }
}

/// Keeps `candidate` if it is viable and strictly better than `best`.
fn keep_better<'a>(
    best: Option<RowCandidate<'a>>,
    candidate: RowCandidate<'a>,
    min_ok: usize,
) -> Option<RowCandidate<'a>> {
    if candidate.ok_count < min_ok {
        return best;
    }
    match best {
        Some(current) if current.total <= candidate.total => Some(current),
        _ => Some(candidate),
    }
}

fn best_in_row<'a>(
    view: ImageView<'_, f32>,
    geometry: &RowGeometry,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    cfg: &GridConfig,
    y: usize,
) -> Option<RowCandidate<'a>> {
    geometry.x_candidates.iter().fold(None, |best, &x_base| {
        let candidate = score_row(view, geometry, hasher, table, cfg.max_distance, x_base, y);
        keep_better(best, candidate, cfg.min_ok)
    })
}

/// Finds the best viable row in an already downscaled luminance plane.
///
/// `scale` is the factor the plane was downscaled by and sizes the slots.
/// Rows are compared in vertical order, then in offset order, keeping the
/// first row with the lowest total.
pub fn best_row<'a>(
    view: ImageView<'_, f32>,
    scale: f32,
    table: &'a ReferenceTable,
    cfg: &GridConfig,
) -> IconScanResult<Option<RowCandidate<'a>>> {
    cfg.validate()?;
    let Some(geometry) = RowGeometry::new(view.width(), view.height(), scale, cfg) else {
        return Ok(None);
    };
    let hasher = SlotHasher::new(geometry.slot_width, geometry.slot_height)?;
    let rows = geometry.rows();

    let _span = trace_span!(
        "locate_row",
        width = view.width(),
        height = view.height(),
        rows = rows.len(),
        offsets = geometry.x_candidates.len()
    )
    .entered();

    let per_row: Vec<Option<RowCandidate<'a>>> = if cfg.parallel {
        score_rows_par(view, &geometry, &hasher, table, cfg, &rows)
    } else {
        rows.iter()
            .map(|&y| best_in_row(view, &geometry, &hasher, table, cfg, y))
            .collect()
    };

    let best = per_row
        .into_iter()
        .flatten()
        .fold(None, |best, candidate| keep_better(best, candidate, cfg.min_ok));

    if let Some(row) = &best {
        trace_event!(
            "best_row",
            x = row.x,
            y = row.y,
            total = row.total,
            ok_count = row.ok_count
        );
    }
    Ok(best)
}

#[cfg(feature = "rayon")]
fn score_rows_par<'a>(
    view: ImageView<'_, f32>,
    geometry: &RowGeometry,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    cfg: &GridConfig,
    rows: &[usize],
) -> Vec<Option<RowCandidate<'a>>> {
    rows.par_iter()
        .map(|&y| best_in_row(view, geometry, hasher, table, cfg, y))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn score_rows_par<'a>(
    view: ImageView<'_, f32>,
    geometry: &RowGeometry,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    cfg: &GridConfig,
    rows: &[usize],
) -> Vec<Option<RowCandidate<'a>>> {
    rows.iter()
        .map(|&y| best_in_row(view, geometry, hasher, table, cfg, y))
        .collect()
}

/// Locates the icon row in `raster` and returns its six keys, or an empty result.
///
/// Fails only on an invalid configuration.
pub fn locate_row(
    raster: &Raster,
    table: &ReferenceTable,
    cfg: &GridConfig,
) -> IconScanResult<ScanResult> {
    cfg.validate()?;
    let luma = raster.to_luma();
    let down = downscale_to_width(luma.view(), cfg.target_width)?;
    let best = best_row(down.image.view(), down.scale, table, cfg)?;

    let result = best
        .and_then(|row| row.accepted(cfg.max_distance))
        .map(|row| ScanResult::from_detections(&row))
        .unwrap_or_default();
    Ok(result)
}
