//! Douglas–Peucker polyline simplification.

use super::distance_2d::point_to_segment_dist_sq;
use super::Point2;

/// Simplifies an open polyline, always keeping both endpoints.
#[must_use]
pub fn douglas_peucker(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let tolerance_sq = tolerance.max(0.0).powi(2);
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    mark(points, tolerance_sq, 0, points.len() - 1, &mut keep);
    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Simplifies an implicitly closed ring.
///
/// The ring is split at its first vertex and the vertex farthest from it, and
/// both halves are simplified independently. If simplification would leave
/// fewer than 3 vertices the input is returned unchanged.
#[must_use]
pub fn douglas_peucker_ring(ring: &[Point2], tolerance: f64) -> Vec<Point2> {
    let n = ring.len();
    if n <= 3 {
        return ring.to_vec();
    }
    let anchor = ring[0];
    let mut far = 0;
    let mut far_dist = 0.0;
    for (i, p) in ring.iter().enumerate().skip(1) {
        let d = (p - anchor).norm_squared();
        if d > far_dist {
            far_dist = d;
            far = i;
        }
    }
    if far == 0 {
        return ring.to_vec();
    }

    let first_half = douglas_peucker(&ring[..=far], tolerance);
    let mut second: Vec<Point2> = ring[far..].to_vec();
    second.push(anchor);
    let second_half = douglas_peucker(&second, tolerance);

    // Both halves share `far` and the anchor; drop the duplicates.
    let mut out = first_half;
    out.extend_from_slice(&second_half[1..second_half.len() - 1]);
    if out.len() < 3 {
        return ring.to_vec();
    }
    out
}

fn mark(points: &[Point2], tolerance_sq: f64, start: usize, end: usize, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }
    let a = points[start];
    let b = points[end];
    let mut max_dist_sq = 0.0;
    let mut index = None;
    for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = point_to_segment_dist_sq(p, &a, &b);
        if d > max_dist_sq {
            max_dist_sq = d;
            index = Some(i);
        }
    }
    if let Some(mid) = index {
        if max_dist_sq > tolerance_sq {
            keep[mid] = true;
            mark(points, tolerance_sq, start, mid, keep);
            mark(points, tolerance_sq, mid, end, keep);
        }
    }
}
