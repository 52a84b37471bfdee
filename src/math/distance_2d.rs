use super::Point2;

/// Returns the squared distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment_dist_sq(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm_squared();
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm_squared()
}

/// Returns the minimum distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    point_to_segment_dist_sq(p, a, b).sqrt()
}

/// Minimum distance from `p` to the boundary of a closed ring.
///
/// Returns `f64::INFINITY` for an empty ring.
#[must_use]
pub fn point_to_ring_dist(p: &Point2, ring: &[Point2]) -> f64 {
    match ring.len() {
        0 => f64::INFINITY,
        1 => (p - ring[0]).norm(),
        n => (0..n)
            .map(|i| point_to_segment_dist_sq(p, &ring[i], &ring[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min)
            .sqrt(),
    }
}

/// Symmetric Hausdorff distance between two closed rings, measured from the
/// vertices of each ring to the boundary of the other.
///
/// Returns `f64::INFINITY` if either ring is empty.
#[must_use]
pub fn hausdorff_distance(a: &[Point2], b: &[Point2]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    let directed = |from: &[Point2], to: &[Point2]| {
        from.iter()
            .map(|p| point_to_ring_dist(p, to))
            .fold(0.0, f64::max)
    };
    directed(a, b).max(directed(b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn segment_distance_projects_and_clamps() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert_abs_diff_eq!(point_to_segment_dist(&Point2::new(5.0, 3.0), &a, &b), 3.0);
        assert_abs_diff_eq!(
            point_to_segment_dist(&Point2::new(13.0, 4.0), &a, &b),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_length_segment() {
        let a = Point2::new(1.0, 1.0);
        assert_abs_diff_eq!(
            point_to_segment_dist(&Point2::new(4.0, 5.0), &a, &a),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn hausdorff_of_nested_squares() {
        let outer = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(11.0, -1.0),
            Point2::new(11.0, 11.0),
            Point2::new(-1.0, 11.0),
        ];
        let inner = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        // Corner to corner is the farthest vertex pairing.
        assert_abs_diff_eq!(
            hausdorff_distance(&outer, &inner),
            2.0_f64.sqrt(),
            epsilon = 1e-12
        );
        assert!(hausdorff_distance(&outer, &[]).is_infinite());
    }
}
