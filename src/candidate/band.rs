//! Horizontal band clustering and row selection.

use crate::candidate::{detection_cmp, Detection};

/// Detections sharing roughly the same vertical center.
#[derive(Clone, Debug)]
pub struct Band<'a> {
    /// Running mean of member vertical centers.
    pub center_y: f32,
    /// Members in insertion order.
    pub items: Vec<Detection<'a>>,
}

/// Groups detections into bands of vertical centers closer than `tolerance`.
///
/// Detections are visited top to bottom; each joins the first band whose
/// running mean is within `tolerance`, or opens a new band.
pub fn cluster_bands<'a>(detections: &[Detection<'a>], tolerance: f32) -> Vec<Band<'a>> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| {
        a.center_y()
            .total_cmp(&b.center_y())
            .then_with(|| a.x.cmp(&b.x))
    });

    let mut bands: Vec<Band<'a>> = Vec::new();
    for det in sorted {
        let cy = det.center_y();
        match bands
            .iter_mut()
            .find(|band| (band.center_y - cy).abs() < tolerance)
        {
            Some(band) => {
                band.items.push(det);
                let n = band.items.len() as f32;
                band.center_y = (band.center_y * (n - 1.0) + cy) / n;
            }
            None => bands.push(Band {
                center_y: cy,
                items: vec![det],
            }),
        }
    }
    bands
}

/// Returns the band with the most members; the topmost wins ties.
pub fn densest_band<'a>(bands: Vec<Band<'a>>) -> Option<Band<'a>> {
    let mut best: Option<Band<'a>> = None;
    for band in bands {
        let better = match &best {
            Some(current) => band.items.len() > current.items.len(),
            None => true,
        };
        if better {
            best = Some(band);
        }
    }
    best
}

/// Picks up to `count` detections with distinct keys from a band.
///
/// Members are ordered left to right. The best matches among the leftmost
/// `primary_pool` are taken first; if that yields fewer than `count` distinct
/// keys, the leftmost `fallback_pool` are consulted. The result is ordered
/// left to right.
pub fn pick_row<'a>(
    band: &[Detection<'a>],
    count: usize,
    primary_pool: usize,
    fallback_pool: usize,
) -> Vec<Detection<'a>> {
    let mut by_x = band.to_vec();
    by_x.sort_by(|a, b| a.x.cmp(&b.x).then_with(|| detection_cmp(a, b)));

    let mut picked: Vec<Detection<'a>> = Vec::with_capacity(count);
    for pool_len in [primary_pool, fallback_pool] {
        if picked.len() >= count {
            break;
        }
        let mut pool: Vec<Detection<'a>> = by_x.iter().take(pool_len).copied().collect();
        pool.sort_by(detection_cmp);
        for det in pool {
            if picked.len() >= count {
                break;
            }
            if picked.iter().any(|p| p.key == det.key) {
                continue;
            }
            picked.push(det);
        }
    }

    picked.sort_by(|a, b| a.x.cmp(&b.x));
    picked
}
