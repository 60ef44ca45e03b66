//! Mathematical helpers for angles, borders and point sets.

/// Wraps an angle in degrees to the range [-180, 180).
pub(crate) fn wrap_deg(angle_deg: f32) -> f32 {
    let mut wrapped = angle_deg % 360.0;
    if wrapped < -180.0 {
        wrapped += 360.0;
    }
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Mirrors an out-of-range index back into `[0, len)` without repeating the edge sample.
///
/// `-1 -> 1`, `len -> len - 2`. Single-element axes always map to 0.
#[inline]
pub(crate) fn reflect101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = idx;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Arithmetic mean of 2D points, `None` when the set is empty.
pub(crate) fn centroid<I>(points: I) -> Option<(f32, f32)>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut count = 0usize;
    for (x, y) in points {
        sum_x += f64::from(x);
        sum_y += f64::from(y);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some(((sum_x / n) as f32, (sum_y / n) as f32))
}

#[cfg(test)]
mod tests {
    use super::{centroid, reflect101, wrap_deg};

    #[test]
    fn wrap_deg_maps_to_expected_range() {
        assert!((wrap_deg(181.0) + 179.0).abs() < 1e-6);
        assert!((wrap_deg(-181.0) - 179.0).abs() < 1e-6);
        assert!((wrap_deg(540.0) + 180.0).abs() < 1e-6);
    }

    #[test]
    fn reflect101_mirrors_without_edge_repeat() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(2, 5), 2);
        assert_eq!(reflect101(-3, 1), 0);
        assert_eq!(reflect101(-1, 2), 1);
        assert_eq!(reflect101(2, 2), 0);
    }

    #[test]
    fn centroid_of_square_corners_is_center() {
        let pts = [(0.0, 0.0), (4.0, 0.0), (0.0, 2.0), (4.0, 2.0)];
        let (cx, cy) = centroid(pts).unwrap();
        assert!((cx - 2.0).abs() < 1e-6);
        assert!((cy - 1.0).abs() < 1e-6);
        assert!(centroid(std::iter::empty()).is_none());
    }
}
