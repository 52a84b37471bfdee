use tracing::debug;

use super::threshold::area_matched_threshold;
use crate::operations::morphology::{close, StructuringKernel};
use crate::raster::{BinaryMask, ScalarField};

/// A synthesized mid-depth shape between two endpoints.
#[derive(Debug, Clone)]
pub struct Pivot {
    /// The pivot region.
    pub mask: BinaryMask,
    /// Cone slope that produced it, in mm of distance per mm of depth.
    /// Reported for diagnostics; the mask is already final.
    pub slope: f64,
}

/// Builds the pivot mask halfway between two slices.
///
/// Each endpoint is swept as a cone toward the pivot depth: a cell is inside
/// when `sdf_a - k·Δ >= 0` or `sdf_b - k·Δ >= 0`, with `Δ` half the depth gap.
/// The slope `k` is chosen so the pivot covers `target_cells` cells, which
/// reduces to an area-matched threshold on `max(sdf_a, sdf_b)`.
///
/// A positive `closing_mm` closes the result with a disk of that radius to
/// remove thin bridges between the two cones.
#[must_use]
pub fn build_pivot(
    sdf_a: &ScalarField,
    sdf_b: &ScalarField,
    depth_gap: f64,
    target_cells: f64,
    closing_mm: f64,
    iterations: usize,
) -> Option<Pivot> {
    let union = sdf_a.zip_with(sdf_b, f64::max);
    let tau = area_matched_threshold(&union, target_cells, iterations)?;
    let half_gap = 0.5 * depth_gap.abs();
    let slope = if half_gap > 0.0 { tau / half_gap } else { 0.0 };

    let mut mask = union.threshold(tau);
    if closing_mm > 0.0 {
        let kernel = StructuringKernel::disk(closing_mm, mask.grid().spacing);
        mask = close(&mask, &kernel);
    }
    debug!(
        slope,
        target_cells,
        cells = mask.count(),
        closing_mm,
        "pivot synthesized"
    );
    Some(Pivot { mask, slope })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use crate::math::{Point2, Vector2};
    use crate::operations::distance::signed_distance_field;
    use crate::raster::Grid;

    fn rect(i0: usize, i1: usize, j0: usize, j1: usize) -> BinaryMask {
        let grid = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), 40, 30);
        let mut m = BinaryMask::new(grid);
        for j in j0..j1 {
            for i in i0..i1 {
                m.set(i, j, true);
            }
        }
        m
    }

    #[test]
    fn pivot_matches_mean_area() {
        let a = rect(5, 15, 10, 20);
        let b = rect(10, 30, 8, 22);
        let target = 0.5 * (a.count() + b.count()) as f64;
        let pivot = build_pivot(
            &signed_distance_field(&a),
            &signed_distance_field(&b),
            10.0,
            target,
            0.0,
            24,
        )
        .unwrap();
        // Level sets of a rectangle's distance field move a whole ring of
        // cells at a time, so only bracket the count.
        let cells = pivot.mask.count();
        assert!(cells > a.count() && cells < 330);
        assert!(pivot.slope > 0.0);
    }

    #[test]
    fn slope_reproduces_the_cone_test() {
        let a = rect(5, 15, 10, 20);
        let b = rect(10, 30, 8, 22);
        let (sdf_a, sdf_b) = (signed_distance_field(&a), signed_distance_field(&b));
        let target = 0.5 * (a.count() + b.count()) as f64;
        let gap = 10.0;
        let pivot = build_pivot(&sdf_a, &sdf_b, gap, target, 0.0, 24).unwrap();
        let drop = pivot.slope * 0.5 * gap;
        for j in 0..30 {
            for i in 0..40 {
                let (va, vb) = (sdf_a.get(i, j), sdf_b.get(i, j));
                if (va.max(vb) - drop).abs() < 1e-9 {
                    continue;
                }
                let cone = va - drop >= 0.0 || vb - drop >= 0.0;
                assert_eq!(cone, pivot.mask.get(i, j), "cell ({i}, {j})");
            }
        }
    }

    #[test]
    fn closing_bridges_small_gaps() {
        let mut a = rect(5, 15, 10, 20);
        a.union_with(&rect(16, 26, 10, 20));
        let sdf = signed_distance_field(&a);
        let target = a.count() as f64;
        let open = build_pivot(&sdf, &sdf, 4.0, target, 0.0, 24).unwrap();
        assert!(!open.mask.get(15, 15));
        let closed = build_pivot(&sdf, &sdf, 4.0, target, 1.5, 24).unwrap();
        assert!(closed.mask.get(15, 15));
    }
}
