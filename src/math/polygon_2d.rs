use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Absolute enclosed area of a closed polygon.
#[must_use]
pub fn area(points: &[Point2]) -> f64 {
    signed_area(points).abs()
}

/// Area centroid of a closed polygon.
///
/// Falls back to the vertex average when the ring has (near) zero area, and
/// returns `None` for an empty slice.
#[must_use]
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len();
    let a = signed_area(points);
    if a.abs() < TOLERANCE {
        return Some(vertex_mean(points));
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    let k = 1.0 / (6.0 * a);
    Some(Point2::new(cx * k, cy * k))
}

/// Plain average of the vertices.
#[must_use]
pub fn vertex_mean(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return Point2::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum * inv)
}

/// Perimeter of a closed polygon.
#[must_use]
pub fn perimeter(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .sum()
}

/// An axis-aligned bounding box in the slice plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Aabb2 {
    /// Bounding box of a point set, or `None` when empty.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = Self {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bb.include(p);
        }
        Some(bb)
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut bb = *self;
        bb.include(&other.min);
        bb.include(&other.max);
        bb
    }

    /// Box extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }
}

/// Rotates a closed polygon so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Returns the ring in counter-clockwise order.
#[must_use]
pub fn to_ccw(mut points: Vec<Point2>) -> Vec<Point2> {
    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn signed_area_follows_winding() {
        let mut pts = square();
        assert_abs_diff_eq!(signed_area(&pts), 4.0, epsilon = TOLERANCE);
        pts.reverse();
        assert_abs_diff_eq!(signed_area(&pts), -4.0, epsilon = TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn centroid_of_offset_square() {
        let pts: Vec<Point2> = square()
            .iter()
            .map(|p| Point2::new(p.x + 3.0, p.y - 1.0))
            .collect();
        let c = centroid(&pts).unwrap();
        assert_abs_diff_eq!(c.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn centroid_of_collinear_points_is_mean() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let c = centroid(&pts).unwrap();
        assert_abs_diff_eq!(c.x, 1.0, epsilon = 1e-12);
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn perimeter_of_square() {
        assert_abs_diff_eq!(perimeter(&square()), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn aabb_union() {
        let a = Aabb2::from_points(&square()).unwrap();
        let b = Aabb2::from_points(&[Point2::new(-1.0, 5.0)]).unwrap();
        let u = a.union(&b);
        assert_abs_diff_eq!(u.min.x, -1.0);
        assert_abs_diff_eq!(u.max.y, 5.0);
        assert_abs_diff_eq!(u.size().x, 3.0);
        assert!(Aabb2::from_points(&[]).is_none());
    }

    #[test]
    fn canonical_start_rotation() {
        let pts = vec![
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let rotated = rotate_to_canonical_start(&pts);
        assert!(rotated[0].x.abs() < TOLERANCE);
        assert!(rotated[0].y.abs() < TOLERANCE);
    }

    #[test]
    fn ccw_normalization() {
        let mut pts = square();
        pts.reverse();
        assert!(signed_area(&to_ccw(pts)) > 0.0);
    }
}
