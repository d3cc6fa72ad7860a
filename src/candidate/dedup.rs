//! Spatial deduplication of overlapping detections.

use crate::candidate::{detection_cmp, Detection};

/// Collapses detections whose centers lie closer than `radius` pixels.
///
/// Detections are visited by ascending distance and kept if their center is
/// at least `radius` away (Euclidean) from every previously kept center, so
/// each cluster is represented by its best match.
pub fn dedup_detections<'a>(detections: &mut [Detection<'a>], radius: f32) -> Vec<Detection<'a>> {
    detections.sort_by(detection_cmp);
    if radius <= 0.0 {
        return detections.to_owned();
    }

    let radius_sq = radius * radius;
    let mut kept: Vec<Detection<'a>> = Vec::new();
    'outer: for det in detections.iter().copied() {
        for other in kept.iter() {
            let dx = other.center_x() - det.center_x();
            let dy = other.center_y() - det.center_y();
            if dx * dx + dy * dy < radius_sq {
                continue 'outer;
            }
        }
        kept.push(det);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::dedup_detections;
    use crate::candidate::Detection;

    fn det(key: &str, distance: u32, x: usize, y: usize) -> Detection<'_> {
        Detection {
            key,
            distance,
            x,
            y,
            width: 40,
            height: 30,
        }
    }

    #[test]
    fn overlapping_pair_keeps_lower_distance() {
        let mut dets = [det("mew", 9, 100, 50), det("mew", 3, 106, 50)];
        let kept = dedup_detections(&mut dets, 28.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].distance, 3);
        assert_eq!(kept[0].x, 106);
    }

    #[test]
    fn distant_detections_survive() {
        let mut dets = [det("mew", 9, 0, 0), det("abra", 3, 100, 0)];
        let kept = dedup_detections(&mut dets, 28.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].key, "abra");
    }

    #[test]
    fn zero_radius_only_sorts() {
        let mut dets = [det("a", 5, 0, 0), det("b", 1, 0, 0)];
        let kept = dedup_detections(&mut dets, 0.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].key, "b");
    }
}
