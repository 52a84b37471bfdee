use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{self, Aabb2};
use crate::math::{Point2, DUPLICATE_TOLERANCE, MIN_RING_AREA};

/// An implicitly closed ring of in-plane points at a single depth.
///
/// Fields are public so callers can hand over raw geometry; every engine entry
/// point runs [`Contour::sanitized`] before geometric use and drops rings that
/// fail it.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Ring vertices in world millimeters. The last vertex connects back to the first.
    pub points: Vec<Point2>,
    /// Slice depth (Z) in world millimeters.
    pub z: f64,
}

impl Contour {
    /// Creates a contour without validation.
    #[must_use]
    pub fn new(points: Vec<Point2>, z: f64) -> Self {
        Self { points, z }
    }

    /// Decodes a flat `[x, y, z, x, y, z, ...]` buffer.
    ///
    /// The depth is the mean of the z components (zero for an empty buffer).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::FlatBufferLength` if the length is not a multiple of 3.
    pub fn from_flat_xyz(flat: &[f64]) -> Result<Self> {
        if flat.len() % 3 != 0 {
            return Err(GeometryError::FlatBufferLength(flat.len()).into());
        }
        let points: Vec<Point2> = flat
            .chunks_exact(3)
            .map(|c| Point2::new(c[0], c[1]))
            .collect();
        let z = if points.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = points.len() as f64;
            flat.chunks_exact(3).map(|c| c[2]).sum::<f64>() / count
        };
        Ok(Self { points, z })
    }

    /// Encodes the ring as a flat `[x, y, z, ...]` buffer.
    #[must_use]
    pub fn to_flat_xyz(&self) -> Vec<f64> {
        self.points
            .iter()
            .flat_map(|p| [p.x, p.y, self.z])
            .collect()
    }

    /// Returns a cleaned copy suitable for geometric use.
    ///
    /// Consecutive duplicates (including a repeated closing vertex) are removed.
    ///
    /// # Errors
    ///
    /// - `GeometryError::NonFinite` if any coordinate or the depth is not finite
    /// - `GeometryError::TooFewPoints` if fewer than 3 distinct points remain
    /// - `GeometryError::ZeroArea` if the ring encloses (near) zero area
    pub fn sanitized(&self) -> Result<Self> {
        if !self.z.is_finite() {
            return Err(GeometryError::NonFinite(0).into());
        }
        let mut points: Vec<Point2> = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(GeometryError::NonFinite(i).into());
            }
            if points
                .last()
                .is_some_and(|last| (p - last).norm() < DUPLICATE_TOLERANCE)
            {
                continue;
            }
            points.push(*p);
        }
        while points.len() > 1
            && (points[points.len() - 1] - points[0]).norm() < DUPLICATE_TOLERANCE
        {
            points.pop();
        }
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()).into());
        }
        let area = polygon_2d::area(&points);
        if area < MIN_RING_AREA {
            return Err(GeometryError::ZeroArea(area).into());
        }
        Ok(Self { points, z: self.z })
    }

    /// Enclosed area in mm².
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_2d::area(&self.points)
    }

    /// Area centroid of the ring.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2> {
        polygon_2d::centroid(&self.points)
    }

    /// Bounding box of the ring.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb2> {
        Aabb2::from_points(&self.points)
    }
}

/// Sanitizes a batch, dropping contours that fail validation.
#[must_use]
pub fn sanitize_all(contours: &[Contour]) -> Vec<Contour> {
    contours
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c.sanitized() {
            Ok(clean) => Some(clean),
            Err(err) => {
                debug!(index = i, %err, "dropping invalid contour");
                None
            }
        })
        .collect()
}

/// Bounding box of a batch of contours.
#[must_use]
pub fn bounds_of(contours: &[Contour]) -> Option<Aabb2> {
    contours
        .iter()
        .filter_map(Contour::bounds)
        .reduce(|a, b| a.union(&b))
}

/// Area-weighted centroid of a batch of contours.
#[must_use]
pub fn weighted_centroid(contours: &[Contour]) -> Option<Point2> {
    let mut total = 0.0;
    let mut acc = Point2::origin().coords;
    for c in contours {
        let a = c.area();
        if let Some(centroid) = c.centroid() {
            acc += centroid.coords * a;
            total += a;
        }
    }
    (total > 0.0).then(|| Point2::from(acc / total))
}

/// Contours sharing (within tolerance) one depth.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceGroup {
    /// Representative depth: the depth of the first contour in the group.
    pub z: f64,
    /// Contours in input order.
    pub contours: Vec<Contour>,
}

/// Groups contours by depth, sorted by ascending depth.
///
/// Two contours belong to the same group when their depths differ by at most
/// `tolerance` from the group's representative depth.
#[must_use]
pub fn group_by_depth(contours: &[Contour], tolerance: f64) -> Vec<SliceGroup> {
    let mut sorted: Vec<&Contour> = contours.iter().collect();
    sorted.sort_by(|a, b| a.z.total_cmp(&b.z));

    let mut groups: Vec<SliceGroup> = Vec::new();
    for c in sorted {
        match groups.last_mut() {
            Some(group) if (c.z - group.z).abs() <= tolerance => group.contours.push(c.clone()),
            _ => groups.push(SliceGroup {
                z: c.z,
                contours: vec![c.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SlicefieldError;
    use approx::assert_abs_diff_eq;

    fn square(z: f64) -> Contour {
        Contour::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
                Point2::new(0.0, 4.0),
            ],
            z,
        )
    }

    #[test]
    fn sanitize_removes_duplicates_and_closing_vertex() {
        let mut c = square(1.0);
        c.points.insert(1, Point2::new(0.0, 0.0));
        c.points.push(Point2::new(0.0, 0.0));
        let clean = c.sanitized().unwrap();
        assert_eq!(clean.points.len(), 4);
        assert_abs_diff_eq!(clean.area(), 16.0, epsilon = 1e-12);
    }

    #[test]
    fn sanitize_rejects_degenerate_rings() {
        let two = Contour::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], 0.0);
        assert!(matches!(
            two.sanitized(),
            Err(SlicefieldError::Geometry(GeometryError::TooFewPoints(2)))
        ));

        let line = Contour::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
            ],
            0.0,
        );
        assert!(matches!(
            line.sanitized(),
            Err(SlicefieldError::Geometry(GeometryError::ZeroArea(_)))
        ));

        let mut nan = square(0.0);
        nan.points[2].x = f64::NAN;
        assert!(matches!(
            nan.sanitized(),
            Err(SlicefieldError::Geometry(GeometryError::NonFinite(2)))
        ));
    }

    #[test]
    fn sanitize_all_keeps_valid_ones() {
        let bad = Contour::new(vec![Point2::new(0.0, 0.0)], 0.0);
        let kept = sanitize_all(&[square(0.0), bad, square(2.0)]);
        assert_eq!(kept.len(), 2);
        assert_abs_diff_eq!(kept[1].z, 2.0);
    }

    #[test]
    fn flat_buffer_boundary() {
        let c = square(3.0);
        let flat = c.to_flat_xyz();
        assert_eq!(flat.len(), 12);
        let back = Contour::from_flat_xyz(&flat).unwrap();
        assert_eq!(back, c);
        assert!(Contour::from_flat_xyz(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn grouping_sorts_and_merges_close_depths() {
        let groups = group_by_depth(&[square(3.0), square(0.0), square(3.01), square(1.5)], 0.05);
        assert_eq!(groups.len(), 3);
        assert_abs_diff_eq!(groups[0].z, 0.0);
        assert_abs_diff_eq!(groups[1].z, 1.5);
        assert_eq!(groups[2].contours.len(), 2);
    }

    #[test]
    fn weighted_centroid_of_two_squares() {
        let a = square(0.0);
        let mut b = square(0.0);
        for p in &mut b.points {
            p.x += 10.0;
        }
        let c = weighted_centroid(&[a, b]).unwrap();
        assert_abs_diff_eq!(c.x, 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 2.0, epsilon = 1e-12);
        assert!(weighted_centroid(&[]).is_none());
    }
}
