use crate::math::polygon_2d::signed_area;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Laplacian weight applied along the axis with the larger margin.
const SMOOTHING_WEIGHT: f64 = 0.25;

/// Approximate margin by moving each vertex along its outward normal.
///
/// Works directly on the polygon without rasterizing:
///
/// 1. Each vertex normal is the normalized sum of the outward unit normals of
///    its two adjacent edges. Vertices with a zero-length adjacent edge or
///    cancelling normals (hairpins) are omitted.
/// 2. Each vertex is displaced by `(nx·mx, ny·my)`, so X and Y margins may
///    differ.
/// 3. One Laplacian pass pulls every vertex toward the midpoint of its
///    neighbors, weighted per axis by that axis' share of the margin.
///
/// # Limitations
///
/// This is an approximation intended for interactive previews. Sharp convex
/// corners are rounded less than a true Minkowski sum would, and concave
/// features whose depth is below the margin produce self-intersecting output
/// that is not resolved. Use the kernel method where exact margins matter.
#[derive(Debug)]
pub struct VertexNormalOffset<'a> {
    points: &'a [Point2],
    margin: Vector2,
}

impl<'a> VertexNormalOffset<'a> {
    /// Creates a new offset of a closed ring by per-axis margins in mm.
    /// Positive margins grow the ring.
    #[must_use]
    pub fn new(points: &'a [Point2], margin: Vector2) -> Self {
        Self { points, margin }
    }

    /// Executes the offset.
    ///
    /// Returns `None` when fewer than 3 usable vertices remain. The output
    /// keeps the orientation of the input.
    #[must_use]
    pub fn execute(&self) -> Option<Vec<Point2>> {
        let n = self.points.len();
        if n < 3 {
            return None;
        }
        let orientation = signed_area(self.points).signum();
        if orientation == 0.0 {
            return None;
        }

        let displaced: Vec<Point2> = (0..n)
            .filter_map(|i| {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                let normal = vertex_normal(&prev, &cur, &next, orientation)?;
                Some(Point2::new(
                    cur.x + normal.x * self.margin.x,
                    cur.y + normal.y * self.margin.y,
                ))
            })
            .collect();
        if displaced.len() < 3 {
            return None;
        }

        Some(self.smooth(&displaced))
    }

    fn smooth(&self, points: &[Point2]) -> Vec<Point2> {
        let (mx, my) = (self.margin.x.abs(), self.margin.y.abs());
        let largest = mx.max(my);
        if largest < TOLERANCE {
            return points.to_vec();
        }
        let lx = SMOOTHING_WEIGHT * mx / largest;
        let ly = SMOOTHING_WEIGHT * my / largest;

        let n = points.len();
        (0..n)
            .map(|i| {
                let p = points[i];
                let mid = nalgebra::center(&points[(i + n - 1) % n], &points[(i + 1) % n]);
                Point2::new(p.x + lx * (mid.x - p.x), p.y + ly * (mid.y - p.y))
            })
            .collect()
    }
}

/// Outward unit normal of the edge `a → b` for a ring with the given
/// orientation sign (+1 CCW).
fn edge_normal(a: &Point2, b: &Point2, orientation: f64) -> Option<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(Vector2::new(d.y, -d.x) * (orientation / len))
}

fn vertex_normal(prev: &Point2, cur: &Point2, next: &Point2, orientation: f64) -> Option<Vector2> {
    let sum = edge_normal(prev, cur, orientation)? + edge_normal(cur, next, orientation)?;
    let len = sum.norm();
    (len > TOLERANCE).then(|| sum / len)
}
