use tracing::debug;

use super::blend::{linear_blend, smooth_min_blend, BlendMode};
use super::pivot::build_pivot;
use super::threshold::area_matched_threshold;
use crate::engine::EngineConfig;
use crate::error::{OperationError, Result};
use crate::geometry::{bounds_of, sanitize_all, weighted_centroid, Contour};
use crate::math::{Point2, Vector2};
use crate::operations::distance::signed_distance_field;
use crate::operations::isocontour::{ExtractIsoContours, LoopSelection};
use crate::operations::rasterize::Rasterize;
use crate::raster::{BinaryMask, Grid, ScalarField};

/// Caller-selectable interpolation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationOptions {
    /// Field blending policy.
    pub blend: BlendMode,
    /// Closing radius in mm applied to the pivot shape; 0 disables it.
    pub closing_mm: f64,
    /// Grid spacing in mm; `None` uses the engine default.
    pub spacing: Option<f64>,
    /// Loop selection; `None` keeps the loop nearest the depth-interpolated
    /// centroid of both endpoints.
    pub selection: Option<LoopSelection>,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            blend: BlendMode::Linear,
            closing_mm: 0.0,
            spacing: None,
            selection: None,
        }
    }
}

/// Synthesizes the contours of an intermediate slice from two neighbors.
///
/// # Algorithm
///
/// 1. Both contour sets are rasterized onto one grid covering their union.
/// 2. Each mask is turned into a signed distance field.
/// 3. The fields are blended according to [`BlendMode`] at
///    `t = (z - za) / (zb - za)`.
/// 4. The blend is thresholded at the cutoff whose foreground area matches the
///    linearly interpolated endpoint area, so areas progress monotonically.
/// 5. The thresholded mask is contoured and tagged with the target depth.
///
/// When one endpoint rasterizes to nothing, its partner's field is scaled by
/// `t` (or `1 - t`) and the area target shrinks toward zero accordingly.
#[derive(Debug)]
pub struct InterpolateSlice<'a> {
    a: &'a [Contour],
    za: f64,
    b: &'a [Contour],
    zb: f64,
    z: f64,
    options: InterpolationOptions,
    config: EngineConfig,
}

impl<'a> InterpolateSlice<'a> {
    /// Creates a new interpolation at depth `z` between `a` (at `za`) and
    /// `b` (at `zb`).
    #[must_use]
    pub fn new(a: &'a [Contour], za: f64, b: &'a [Contour], zb: f64, z: f64) -> Self {
        Self {
            a,
            za,
            b,
            zb,
            z,
            options: InterpolationOptions::default(),
            config: EngineConfig::default(),
        }
    }

    /// Sets the interpolation options.
    #[must_use]
    pub fn with_options(mut self, options: InterpolationOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the interpolation.
    ///
    /// An empty result means there is nothing to interpolate: `z` is not
    /// strictly between the endpoint depths, or neither side has a usable
    /// contour.
    ///
    /// # Errors
    ///
    /// - `OperationError::NonFinite` if a depth or the closing radius is not finite
    /// - `OperationError::NonPositive` if the grid spacing is not positive
    pub fn execute(&self) -> Result<Vec<Contour>> {
        OperationError::require_finite("za", self.za)?;
        OperationError::require_finite("zb", self.zb)?;
        OperationError::require_finite("z", self.z)?;
        OperationError::require_finite("closing_mm", self.options.closing_mm)?;
        let spacing = OperationError::require_positive(
            "spacing",
            self.options
                .spacing
                .unwrap_or(self.config.interpolation_spacing),
        )?;

        let gap = self.zb - self.za;
        let t = (self.z - self.za) / gap;
        if !(t > 0.0 && t < 1.0) {
            debug!(t, "target depth outside the open endpoint interval");
            return Ok(Vec::new());
        }

        let a = sanitize_all(self.a);
        let b = sanitize_all(self.b);
        let all: Vec<Contour> = a.iter().chain(&b).cloned().collect();
        let Some(bounds) = bounds_of(&all) else {
            return Ok(Vec::new());
        };

        let closing = self.options.closing_mm.max(0.0);
        let grid = Grid::covering(
            &bounds,
            Vector2::new(spacing, spacing),
            Vector2::new(closing, closing),
            self.config.padding_cells,
            self.config.max_cells,
        );
        let mask_a = Rasterize::new(&a, grid).execute();
        let mask_b = Rasterize::new(&b, grid).execute();

        let Some((field, target_cells)) = self.blend(&mask_a, &mask_b, t, gap) else {
            return Ok(Vec::new());
        };
        let Some(tau) =
            area_matched_threshold(&field, target_cells, self.config.threshold_iterations)
        else {
            return Ok(Vec::new());
        };
        let mask = field.threshold(tau);
        debug!(
            t,
            width = grid.width,
            height = grid.height,
            target_cells,
            cells = mask.count(),
            "interpolated mask"
        );

        let selection = self
            .options
            .selection
            .or_else(|| interpolated_centroid(&a, &b, t).map(LoopSelection::NearestCentroid))
            .unwrap_or(LoopSelection::All);

        Ok(ExtractIsoContours::new(&mask.to_centered_field())
            .with_depth(self.z)
            .with_selection(selection)
            .with_simplify_tolerance(self.config.simplify_tolerance)
            .with_stitch_tolerance(self.config.stitch_tolerance)
            .with_min_loop_area(self.config.min_loop_area)
            .execute())
    }

    /// Builds the blended field and its area target in cells.
    #[allow(clippy::cast_precision_loss)]
    fn blend(
        &self,
        mask_a: &BinaryMask,
        mask_b: &BinaryMask,
        t: f64,
        gap: f64,
    ) -> Option<(ScalarField, f64)> {
        let (area_a, area_b) = (mask_a.count() as f64, mask_b.count() as f64);
        match (mask_a.is_empty(), mask_b.is_empty()) {
            (true, true) => return None,
            (true, false) => {
                let field = signed_distance_field(mask_b).map(|v| v * t);
                return Some((field, t * area_b));
            }
            (false, true) => {
                let field = signed_distance_field(mask_a).map(|v| v * (1.0 - t));
                return Some((field, (1.0 - t) * area_a));
            }
            (false, false) => {}
        }

        let sdf_a = signed_distance_field(mask_a);
        let sdf_b = signed_distance_field(mask_b);
        let linear_target = (1.0 - t) * area_a + t * area_b;
        match self.options.blend {
            BlendMode::Linear => Some((linear_blend(&sdf_a, &sdf_b, t), linear_target)),
            BlendMode::SmoothMin => {
                let alpha = mask_a.grid().mean_spacing();
                Some((smooth_min_blend(&sdf_a, &sdf_b, t, alpha), linear_target))
            }
            BlendMode::PivotPiecewise => {
                let Some(pivot) = build_pivot(
                    &sdf_a,
                    &sdf_b,
                    gap,
                    0.5 * (area_a + area_b),
                    self.options.closing_mm,
                    self.config.threshold_iterations,
                ) else {
                    return Some((linear_blend(&sdf_a, &sdf_b, t), linear_target));
                };
                let area_p = pivot.mask.count() as f64;
                let sdf_p = signed_distance_field(&pivot.mask);
                if t <= 0.5 {
                    let s = 2.0 * t;
                    Some((linear_blend(&sdf_a, &sdf_p, s), (1.0 - s) * area_a + s * area_p))
                } else {
                    let s = 2.0 * t - 1.0;
                    Some((linear_blend(&sdf_p, &sdf_b, s), (1.0 - s) * area_p + s * area_b))
                }
            }
        }
    }
}

/// Area-weighted centroids of both endpoints, interpolated at `t`.
fn interpolated_centroid(a: &[Contour], b: &[Contour], t: f64) -> Option<Point2> {
    match (weighted_centroid(a), weighted_centroid(b)) {
        (Some(ca), Some(cb)) => Some(ca + (cb - ca) * t),
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SlicefieldError;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn circle(cx: f64, cy: f64, r: f64, z: f64) -> Contour {
        let points = (0..96)
            .map(|k| {
                let a = 2.0 * PI * f64::from(k) / 96.0;
                Point2::new(cx + r * a.cos(), cy + r * a.sin())
            })
            .collect();
        Contour::new(points, z)
    }

    fn total_area(contours: &[Contour]) -> f64 {
        contours.iter().map(Contour::area).sum()
    }

    #[test]
    fn growing_circles_follow_area_trend() {
        let a = [circle(0.0, 0.0, 6.0, 0.0)];
        let b = [circle(0.0, 0.0, 12.0, 4.0)];
        let (area_a, area_b) = (PI * 36.0, PI * 144.0);
        for t in [0.25, 0.5, 0.75] {
            let out = InterpolateSlice::new(&a, 0.0, &b, 4.0, 4.0 * t)
                .execute()
                .unwrap();
            assert_eq!(out.len(), 1);
            let expected = (1.0 - t) * area_a + t * area_b;
            assert_relative_eq!(total_area(&out), expected, max_relative = 0.03);
        }
    }

    #[test]
    fn outside_open_interval_is_empty() {
        let a = [circle(0.0, 0.0, 5.0, 0.0)];
        let b = [circle(0.0, 0.0, 5.0, 2.0)];
        for z in [0.0, 2.0, -1.0, 3.0] {
            assert!(InterpolateSlice::new(&a, 0.0, &b, 2.0, z)
                .execute()
                .unwrap()
                .is_empty());
        }
        // Coincident endpoints give no valid t.
        assert!(InterpolateSlice::new(&a, 1.0, &b, 1.0, 1.0)
            .execute()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn empty_endpoint_shrinks_the_other() {
        let a = [circle(3.0, -2.0, 8.0, 0.0)];
        let out = InterpolateSlice::new(&a, 0.0, &[], 2.0, 1.5)
            .execute()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(total_area(&out), 0.25 * PI * 64.0, max_relative = 0.05);
        let c = out[0].centroid().unwrap();
        assert!((c - Point2::new(3.0, -2.0)).norm() < 0.5);
    }

    #[test]
    fn every_blend_mode_produces_a_contour() {
        let a = [circle(0.0, 0.0, 5.0, 0.0)];
        let b = [circle(4.0, 0.0, 7.0, 6.0)];
        for blend in [BlendMode::Linear, BlendMode::SmoothMin, BlendMode::PivotPiecewise] {
            let options = InterpolationOptions {
                blend,
                closing_mm: 1.0,
                ..InterpolationOptions::default()
            };
            let out = InterpolateSlice::new(&a, 0.0, &b, 6.0, 3.0)
                .with_options(options)
                .execute()
                .unwrap();
            assert_eq!(out.len(), 1, "{blend:?}");
            let expected = 0.5 * (PI * 25.0 + PI * 49.0);
            assert_relative_eq!(total_area(&out), expected, max_relative = 0.05);
            assert_relative_eq!(out[0].z, 3.0);
        }
    }

    #[test]
    fn nearest_centroid_picks_the_dominant_blob() {
        // The area-weighted centroid of both sides sits left of the origin.
        let a = [circle(-15.0, 0.0, 6.0, 0.0), circle(15.0, 0.0, 4.0, 0.0)];
        let b = [circle(-15.0, 0.0, 6.0, 2.0), circle(15.0, 0.0, 4.0, 2.0)];
        let all = InterpolateSlice::new(&a, 0.0, &b, 2.0, 1.0)
            .with_options(InterpolationOptions {
                selection: Some(LoopSelection::All),
                ..InterpolationOptions::default()
            })
            .execute()
            .unwrap();
        assert_eq!(all.len(), 2);
        let picked = InterpolateSlice::new(&a, 0.0, &b, 2.0, 1.0)
            .execute()
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert!(picked[0].centroid().unwrap().x < 0.0);
    }

    #[test]
    fn invalid_parameters_are_errors() {
        let a = [circle(0.0, 0.0, 5.0, 0.0)];
        let err = InterpolateSlice::new(&a, 0.0, &a, f64::NAN, 1.0).execute();
        assert!(matches!(
            err,
            Err(SlicefieldError::Operation(OperationError::NonFinite { .. }))
        ));
        let err = InterpolateSlice::new(&a, 0.0, &a, 2.0, 1.0)
            .with_options(InterpolationOptions {
                spacing: Some(0.0),
                ..InterpolationOptions::default()
            })
            .execute();
        assert!(matches!(
            err,
            Err(SlicefieldError::Operation(OperationError::NonPositive { .. }))
        ));
    }
}
