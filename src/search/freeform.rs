//! Free-form multi-scale scan for screenshots without a known layout.
//!
//! Every window of each candidate icon size is hashed on a fixed pixel step.
//! Windows whose best match is within the threshold become detections, which
//! are deduplicated, grouped into horizontal bands, and reduced to one row of
//! distinct species read left to right.

use crate::candidate::band::{cluster_bands, densest_band, pick_row};
use crate::candidate::dedup::dedup_detections;
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

/// Configuration for the free-form scan.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeformConfig {
    /// Width the screenshot is downscaled to before scanning (never upscaled).
    pub target_width: usize,
    /// Candidate icon sizes `(width, height)` in downscaled pixels.
    pub sizes: Vec<(usize, usize)>,
    /// Window step in both directions.
    pub step: usize,
    /// Largest Hamming distance for a window to count as a detection.
    pub max_distance: u32,
    /// Windows evaluated per size before giving up on that size.
    pub max_checks_per_size: usize,
    /// Centers closer than this are treated as the same icon.
    pub dedup_radius: f32,
    /// Vertical tolerance for joining a band.
    pub band_tolerance: f32,
    /// Leftmost band members considered first when picking the row.
    pub primary_pool: usize,
    /// Leftmost band members considered when the primary pool falls short.
    pub fallback_pool: usize,
    /// Hash windows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for FreeformConfig {
    fn default() -> Self {
        Self {
            target_width: 900,
            sizes: vec![(40, 30), (32, 24), (48, 36)],
            step: 6,
            max_distance: 12,
            max_checks_per_size: 25_000,
            dedup_radius: 28.0,
            band_tolerance: 25.0,
            primary_pool: 10,
            fallback_pool: 20,
            parallel: false,
        }
    }
}

impl FreeformConfig {
    /// Checks that the configuration can drive a scan.
    pub fn validate(&self) -> IconScanResult<()> {
        if self.target_width == 0 {
            return Err(IconScanError::InvalidInput("target_width must be > 0"));
        }
        if self.sizes.is_empty() {
            return Err(IconScanError::InvalidInput("at least one icon size is required"));
        }
        if self.sizes.iter().any(|&(w, h)| w == 0 || h == 0) {
            return Err(IconScanError::InvalidInput("icon sizes must be > 0"));
        }
        if self.step == 0 {
            return Err(IconScanError::InvalidInput("step must be > 0"));
        }
        Ok(())
    }
}

/// Window origins for one size in row-major order, capped at `max_checks`.
fn window_origins(
    width: usize,
    height: usize,
    size: (usize, usize),
    step: usize,
    max_checks: usize,
) -> Vec<(usize, usize)> {
    let (w, h) = size;
    if w > width || h > height {
        return Vec::new();
    }
    (0..=height - h)
        .step_by(step)
        .flat_map(|y| (0..=width - w).step_by(step).map(move |x| (x, y)))
        .take(max_checks)
        .collect()
}

fn detect_at<'a>(
    view: ImageView<'_, f32>,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    max_distance: u32,
    (x, y): (usize, usize),
) -> Option<Detection<'a>> {
    let hash = hasher.hash_at(view, x, y)?;
    let hit = table.nearest(hash);
    (hit.distance <= max_distance).then_some(Detection {
        key: hit.key,
        distance: hit.distance,
        x,
        y,
        width: hasher.width(),
        height: hasher.height(),
    })
}

/// Collects every window within the distance threshold, size by size.
pub fn detect_windows<'a>(
    view: ImageView<'_, f32>,
    table: &'a ReferenceTable,
    cfg: &FreeformConfig,
) -> IconScanResult<Vec<Detection<'a>>> {
    cfg.validate()?;
    let mut detections = Vec::new();
    for &(w, h) in &cfg.sizes {
        let hasher = SlotHasher::new(w, h)?;
        let origins = window_origins(
            view.width(),
            view.height(),
            (w, h),
            cfg.step,
            cfg.max_checks_per_size,
        );
        let found = if cfg.parallel {
            detect_par(view, &hasher, table, cfg.max_distance, &origins)
        } else {
            origins
                .iter()
                .filter_map(|&origin| detect_at(view, &hasher, table, cfg.max_distance, origin))
                .collect()
        };
        detections.extend(found);
    }
    Ok(detections)
}

#[cfg(feature = "rayon")]
fn detect_par<'a>(
    view: ImageView<'_, f32>,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    max_distance: u32,
    origins: &[(usize, usize)],
) -> Vec<Detection<'a>> {
    origins
        .par_iter()
        .filter_map(|&origin| detect_at(view, hasher, table, max_distance, origin))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn detect_par<'a>(
    view: ImageView<'_, f32>,
    hasher: &SlotHasher,
    table: &'a ReferenceTable,
    max_distance: u32,
    origins: &[(usize, usize)],
) -> Vec<Detection<'a>> {
    origins
        .iter()
        .filter_map(|&origin| detect_at(view, hasher, table, max_distance, origin))
        .collect()
}

/// Reduces raw detections to at most six distinct species ordered left to right.
pub fn consolidate<'a>(
    mut detections: Vec<Detection<'a>>,
    cfg: &FreeformConfig,
) -> Vec<Detection<'a>> {
    if detections.is_empty() {
        return Vec::new();
    }
    let deduped = dedup_detections(&mut detections, cfg.dedup_radius);
    let bands = cluster_bands(&deduped, cfg.band_tolerance);
    trace_event!(
        "consolidate",
        raw = detections.len(),
        deduped = deduped.len(),
        bands = bands.len()
    );
    let band = match densest_band(bands) {
        Some(band) => band.items,
        None => deduped,
    };
    pick_row(&band, ROW_SLOTS, cfg.primary_pool, cfg.fallback_pool)
}

/// Scans `raster` without assuming a layout; returns six keys or an empty result.
///
/// Fails only on an invalid configuration.
pub fn scan_freeform(
    raster: &Raster,
    table: &ReferenceTable,
    cfg: &FreeformConfig,
) -> IconScanResult<ScanResult> {
    cfg.validate()?;
    let luma = raster.to_luma();
    let down = downscale_to_width(luma.view(), cfg.target_width)?;
    let view = down.image.view();

    let _span = trace_span!(
        "scan_freeform",
        width = view.width(),
        height = view.height(),
        sizes = cfg.sizes.len()
    )
    .entered();
    let detections = detect_windows(view, table, cfg)?;
    let row = consolidate(detections, cfg);
    Ok(ScanResult::from_detections(&row))
}
