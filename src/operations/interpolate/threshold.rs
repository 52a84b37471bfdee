use tracing::trace;

use crate::raster::ScalarField;

/// Bisection steps used when no other count is configured.
pub const DEFAULT_THRESHOLD_ITERATIONS: usize = 24;

/// Finds a cutoff `τ` such that the number of cells with `value >= τ` is as
/// close as possible to `target_cells`.
///
/// The cell count is non-increasing in `τ`, so `iterations` bisection steps
/// over the field's finite range bracket the target; of the two bracket ends
/// the one whose count is nearer the target is returned. Ties go to the
/// lower cutoff (the larger region).
///
/// Returns `None` for a field without finite values.
#[must_use]
pub fn area_matched_threshold(
    field: &ScalarField,
    target_cells: f64,
    iterations: usize,
) -> Option<f64> {
    let (mut lo, mut hi) = field.min_max()?;
    #[allow(clippy::cast_precision_loss)]
    let count = |tau: f64| field.count_at_least(tau) as f64;

    if target_cells >= count(lo) {
        return Some(lo);
    }
    if target_cells <= count(hi) {
        return Some(hi);
    }
    for _ in 0..iterations {
        let mid = 0.5 * (lo + hi);
        if count(mid) >= target_cells {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let tau = if (count(lo) - target_cells).abs() <= (count(hi) - target_cells).abs() {
        lo
    } else {
        hi
    };
    trace!(tau, target_cells, reached = count(tau), "area-matched threshold");
    Some(tau)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Vector2};
    use crate::raster::Grid;

    fn ramp(n: usize) -> ScalarField {
        let grid = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), n, 1);
        #[allow(clippy::cast_precision_loss)]
        let data = (0..n).map(|i| i as f64).collect();
        ScalarField::from_data(grid, data).unwrap()
    }

    #[test]
    fn hits_exact_count_on_a_ramp() {
        let f = ramp(100);
        let tau = area_matched_threshold(&f, 30.0, DEFAULT_THRESHOLD_ITERATIONS).unwrap();
        assert_eq!(f.count_at_least(tau), 30);
    }

    #[test]
    fn clamps_to_field_range() {
        let f = ramp(10);
        let all = area_matched_threshold(&f, 50.0, 24).unwrap();
        assert_eq!(f.count_at_least(all), 10);
        let one = area_matched_threshold(&f, 0.0, 24).unwrap();
        assert_eq!(f.count_at_least(one), 1);
    }

    #[test]
    fn rounds_to_nearest_count() {
        let f = ramp(10);
        let tau = area_matched_threshold(&f, 4.4, 24).unwrap();
        assert_eq!(f.count_at_least(tau), 4);
        let tau = area_matched_threshold(&f, 4.6, 24).unwrap();
        assert_eq!(f.count_at_least(tau), 5);
    }

    #[test]
    fn non_finite_field_has_no_threshold() {
        let grid = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), 2, 1);
        let f = ScalarField::from_data(grid, vec![f64::NAN, f64::INFINITY]).unwrap();
        assert!(area_matched_threshold(&f, 1.0, 24).is_none());
    }
}
