//! Area-averaging resampling for luminance planes.
//!
//! Each destination cell covers an equal-width interval of the source axis and
//! takes the coverage-weighted mean of the source pixels it overlaps. Weights
//! are separable and computed relative to the region origin, so resampling the
//! same pixels at different offsets yields bit-identical output.

use crate::image::{ImageView, OwnedImage};
use crate::util::{IconScanError, IconScanResult};

#[derive(Clone, Debug)]
struct Span {
    start: usize,
    weights: Vec<f32>,
}

/// Precomputed area-resampling weights for one axis.
#[derive(Clone, Debug)]
pub struct AxisWeights {
    src_len: usize,
    spans: Vec<Span>,
}

impl AxisWeights {
    /// Builds weights mapping `src_len` source pixels onto `dst_len` cells.
    pub fn area(src_len: usize, dst_len: usize) -> IconScanResult<Self> {
        if src_len == 0 || dst_len == 0 {
            return Err(IconScanError::InvalidDimensions {
                width: src_len,
                height: dst_len,
            });
        }

        let scale = src_len as f64 / dst_len as f64;
        let mut spans = Vec::with_capacity(dst_len);
        for i in 0..dst_len {
            let lo = i as f64 * scale;
            let hi = ((i + 1) as f64 * scale).min(src_len as f64);
            let start = (lo.floor() as usize).min(src_len - 1);
            let end = (hi.ceil() as usize).clamp(start + 1, src_len);

            let mut weights = Vec::with_capacity(end - start);
            let mut total = 0.0f64;
            for s in start..end {
                let overlap = (hi.min((s + 1) as f64) - lo.max(s as f64)).max(0.0);
                weights.push(overlap);
                total += overlap;
            }
            let weights = if total > 0.0 {
                weights.iter().map(|w| (w / total) as f32).collect()
            } else {
                // Degenerate interval narrower than float precision: take the first pixel.
                let mut unit = vec![0.0f32; weights.len()];
                unit[0] = 1.0;
                unit
            };
            spans.push(Span { start, weights });
        }

        Ok(Self { src_len, spans })
    }

    /// Returns the number of source pixels covered.
    pub fn src_len(&self) -> usize {
        self.src_len
    }

    /// Returns the number of destination cells.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns true when there are no destination cells.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Resamples the region at `(x, y)` sized by the axis weights into `out`.
///
/// `out` must hold `xw.len() * yw.len()` values and is written row-major.
/// Returns `None` without touching `out` when the region leaves the view.
pub fn resample_region_into(
    view: ImageView<'_, f32>,
    x: usize,
    y: usize,
    xw: &AxisWeights,
    yw: &AxisWeights,
    out: &mut [f32],
) -> Option<()> {
    let region_w = xw.src_len();
    let region_h = yw.src_len();
    let out_w = xw.len();
    if !view.contains_rect(x, y, region_w, region_h) || out.len() != out_w * yw.len() {
        return None;
    }

    // Horizontal pass: region_h rows of out_w cells.
    let mut tmp = vec![0.0f32; region_h * out_w];
    for ry in 0..region_h {
        let row = &view.row(y + ry)?[x..x + region_w];
        let dst = &mut tmp[ry * out_w..(ry + 1) * out_w];
        for (cell, span) in dst.iter_mut().zip(xw.spans.iter()) {
            let src = &row[span.start..span.start + span.weights.len()];
            *cell = src
                .iter()
                .zip(span.weights.iter())
                .map(|(value, weight)| value * weight)
                .sum();
        }
    }

    for (oy, span) in yw.spans.iter().enumerate() {
        let dst = &mut out[oy * out_w..(oy + 1) * out_w];
        dst.fill(0.0);
        for (k, weight) in span.weights.iter().enumerate() {
            let src = &tmp[(span.start + k) * out_w..(span.start + k + 1) * out_w];
            for (cell, value) in dst.iter_mut().zip(src.iter()) {
                *cell += value * weight;
            }
        }
    }

    Some(())
}

/// Downscaled luminance plane together with the applied scale factor.
#[derive(Clone, Debug)]
pub struct Downscaled {
    /// Resampled plane.
    pub image: OwnedImage<f32>,
    /// Ratio of output width to input width, never above 1.
    pub scale: f32,
}

/// Returns the scale factor and output size for fitting `width` into `target_width`.
///
/// The factor is clamped to at most 1 so small inputs are never upscaled.
pub fn fit_to_width(width: usize, height: usize, target_width: usize) -> (f32, usize, usize) {
    let scale = (target_width as f32 / width as f32).min(1.0);
    let out_w = ((width as f32 * scale).round() as usize).max(1);
    let out_h = ((height as f32 * scale).round() as usize).max(1);
    (scale, out_w, out_h)
}

/// Proportionally downscales a plane so its width matches `target_width`.
pub fn downscale_to_width(
    src: ImageView<'_, f32>,
    target_width: usize,
) -> IconScanResult<Downscaled> {
    if target_width == 0 {
        return Err(IconScanError::InvalidInput("target width must be > 0"));
    }
    let (scale, out_w, out_h) = fit_to_width(src.width(), src.height(), target_width);
    if out_w == src.width() && out_h == src.height() {
        let mut data = Vec::with_capacity(out_w * out_h);
        for y in 0..out_h {
            let row = src.row(y).ok_or(IconScanError::BufferTooSmall {
                needed: (y + 1) * src.stride(),
                got: src.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        return Ok(Downscaled {
            image: OwnedImage::new(data, out_w, out_h)?,
            scale: 1.0,
        });
    }

    let xw = AxisWeights::area(src.width(), out_w)?;
    let yw = AxisWeights::area(src.height(), out_h)?;
    let mut data = vec![0.0f32; out_w * out_h];
    resample_region_into(src, 0, 0, &xw, &yw, &mut data).ok_or(
        IconScanError::InvalidDimensions {
            width: src.width(),
            height: src.height(),
        },
    )?;
    Ok(Downscaled {
        image: OwnedImage::new(data, out_w, out_h)?,
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::{downscale_to_width, fit_to_width, resample_region_into, AxisWeights};
    use crate::image::ImageView;

    #[test]
    fn area_weights_sum_to_one() {
        let weights = AxisWeights::area(40, 9).unwrap();
        assert_eq!(weights.len(), 9);
        for span in &weights.spans {
            let total: f32 = span.weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn halving_averages_pairs() {
        let data = [0.0f32, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0];
        let view = ImageView::from_slice(&data, 4, 2).unwrap();
        let xw = AxisWeights::area(4, 2).unwrap();
        let yw = AxisWeights::area(2, 1).unwrap();
        let mut out = [0.0f32; 2];
        resample_region_into(view, 0, 0, &xw, &yw, &mut out).unwrap();
        assert!((out[0] - 5.0).abs() < 1e-5);
        assert!((out[1] - 9.0).abs() < 1e-5);
    }

    #[test]
    fn region_outside_view_is_rejected() {
        let data = [0.0f32; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let xw = AxisWeights::area(3, 2).unwrap();
        let yw = AxisWeights::area(3, 2).unwrap();
        let mut out = [0.0f32; 4];
        assert!(resample_region_into(view, 2, 0, &xw, &yw, &mut out).is_none());
        assert!(resample_region_into(view, 1, 1, &xw, &yw, &mut out).is_some());
    }

    #[test]
    fn narrow_inputs_are_never_upscaled() {
        assert_eq!(fit_to_width(640, 480, 1000), (1.0, 640, 480));
        let data = vec![1.0f32; 64 * 32];
        let view = ImageView::from_slice(&data, 64, 32).unwrap();
        let out = downscale_to_width(view, 1000).unwrap();
        assert_eq!(out.image.width(), 64);
        assert_eq!(out.image.height(), 32);
        assert_eq!(out.scale, 1.0);
    }

    #[test]
    fn wide_inputs_shrink_proportionally() {
        let data = vec![3.0f32; 2000 * 500];
        let view = ImageView::from_slice(&data, 2000, 500).unwrap();
        let out = downscale_to_width(view, 1000).unwrap();
        assert_eq!(out.image.width(), 1000);
        assert_eq!(out.image.height(), 250);
        assert!((out.scale - 0.5).abs() < 1e-6);
        assert!(out.image.data().iter().all(|v| (v - 3.0).abs() < 1e-4));
    }
}
