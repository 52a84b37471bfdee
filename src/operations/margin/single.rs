use tracing::debug;

use super::{apply_margin_2d, MarginMethod};
use crate::engine::EngineConfig;
use crate::error::{OperationError, Result};
use crate::geometry::{bounds_of, sanitize_all, Contour};
use crate::math::{Vector2, TOLERANCE};
use crate::operations::distance::signed_distance_field;
use crate::operations::isocontour::ExtractIsoContours;
use crate::operations::morphology::{margin_field, VertexNormalOffset};
use crate::operations::rasterize::Rasterize;
use crate::raster::{BinaryMask, Grid, ScalarField};

/// Grows (positive margin) or shrinks (negative margin) the contours of one
/// slice.
///
/// The contours are rasterized as a union onto a grid with the given pixel
/// spacing, padded by the margin, transformed according to the configured
/// [`MarginMethod`] and contoured again. Output contours carry the depth of
/// the first input contour.
#[derive(Debug)]
pub struct MarginSingleSlice<'a> {
    contours: &'a [Contour],
    margin: Vector2,
    spacing: Vector2,
    config: EngineConfig,
}

impl<'a> MarginSingleSlice<'a> {
    /// Creates a new margin operation with per-axis margins and pixel spacing
    /// in mm.
    #[must_use]
    pub fn new(contours: &'a [Contour], margin: Vector2, spacing: Vector2) -> Self {
        Self {
            contours,
            margin,
            spacing,
            config: EngineConfig::default(),
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the margin.
    ///
    /// Invalid contours are dropped; if none remain the result is empty. A
    /// zero margin returns the sanitized input.
    ///
    /// # Errors
    ///
    /// - `OperationError::NonFinite` if a margin component is not finite
    /// - `OperationError::NonPositive` if a spacing component is not positive
    pub fn execute(&self) -> Result<Vec<Contour>> {
        OperationError::require_finite("margin.x", self.margin.x)?;
        OperationError::require_finite("margin.y", self.margin.y)?;
        OperationError::require_positive("spacing.x", self.spacing.x)?;
        OperationError::require_positive("spacing.y", self.spacing.y)?;

        let clean = sanitize_all(self.contours);
        let Some(first) = clean.first() else {
            return Ok(Vec::new());
        };
        if self.margin.abs().max() < TOLERANCE {
            return Ok(clean);
        }
        let z = first.z;

        if self.config.margin_method == MarginMethod::VertexNormal {
            let out: Vec<Contour> = clean
                .iter()
                .filter_map(|c| {
                    let points = VertexNormalOffset::new(&c.points, self.margin).execute()?;
                    Contour::new(points, c.z).sanitized().ok()
                })
                .collect();
            return Ok(self.config.margin_selection.select(out));
        }

        let Some(bounds) = bounds_of(&clean) else {
            return Ok(Vec::new());
        };
        let grid = Grid::covering(
            &bounds,
            self.spacing,
            self.margin.map(|m| m.max(0.0)),
            self.config.padding_cells,
            self.config.max_cells,
        );
        let mask = Rasterize::new(&clean, grid).execute();
        let field = self.margin_field(&mask);

        let out = ExtractIsoContours::new(&field)
            .with_depth(z)
            .with_selection(self.config.margin_selection)
            .with_simplify_tolerance(self.config.simplify_tolerance)
            .with_stitch_tolerance(self.config.stitch_tolerance)
            .with_min_loop_area(self.config.min_loop_area)
            .execute();
        debug!(
            inputs = clean.len(),
            outputs = out.len(),
            width = grid.width,
            height = grid.height,
            method = ?self.config.margin_method,
            "single-slice margin"
        );
        Ok(out)
    }

    /// Field whose zero level is the margined boundary.
    fn margin_field(&self, mask: &BinaryMask) -> ScalarField {
        let isotropic = (self.margin.x - self.margin.y).abs() < TOLERANCE;
        if self.config.margin_method == MarginMethod::DistanceField && isotropic {
            margin_field(&signed_distance_field(mask), self.margin.x)
        } else {
            apply_margin_2d(mask, self.margin).to_centered_field()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SlicefieldError;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn square(size: f64, z: f64) -> Contour {
        Contour::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(size, 0.0),
                Point2::new(size, size),
                Point2::new(0.0, size),
            ],
            z,
        )
    }

    fn run(method: MarginMethod, margin: f64) -> Vec<Contour> {
        let input = [square(10.0, 7.0)];
        MarginSingleSlice::new(&input, Vector2::new(margin, margin), Vector2::new(0.25, 0.25))
            .with_config(EngineConfig::default().with_margin_method(method))
            .execute()
            .unwrap()
    }

    #[test]
    fn kernel_dilation_is_a_rounded_square() {
        let out = run(MarginMethod::Kernel, 2.0);
        assert_eq!(out.len(), 1);
        let expected = 100.0 + 4.0 * 10.0 * 2.0 + std::f64::consts::PI * 4.0;
        assert_relative_eq!(out[0].area(), expected, max_relative = 0.02);
        assert_relative_eq!(out[0].z, 7.0);
    }

    #[test]
    fn erosion_shrinks_square() {
        for method in [MarginMethod::Kernel, MarginMethod::DistanceField] {
            let out = run(method, -2.0);
            assert_eq!(out.len(), 1);
            assert_relative_eq!(out[0].area(), 36.0, max_relative = 0.03);
        }
    }

    #[test]
    fn vertex_normal_tracks_circles() {
        let points = (0..64)
            .map(|k| {
                let a = std::f64::consts::TAU * f64::from(k) / 64.0;
                Point2::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        let input = [Contour::new(points, 0.0)];
        let out = MarginSingleSlice::new(&input, Vector2::new(-1.0, -1.0), Vector2::new(0.5, 0.5))
            .with_config(EngineConfig::default().with_margin_method(MarginMethod::VertexNormal))
            .execute()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].area(), std::f64::consts::PI * 81.0, max_relative = 0.02);
    }

    #[test]
    fn zero_margin_returns_sanitized_input() {
        let mut c = square(4.0, 1.0);
        c.points.push(Point2::new(0.0, 0.0));
        let input = [c];
        let out = MarginSingleSlice::new(&input, Vector2::zeros(), Vector2::new(1.0, 1.0))
            .execute()
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points.len(), 4);
    }

    #[test]
    fn invalid_contours_are_dropped() {
        let bad = Contour::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)], 0.0);
        let input = [bad.clone()];
        let out = MarginSingleSlice::new(&input, Vector2::new(1.0, 1.0), Vector2::new(0.5, 0.5))
            .execute()
            .unwrap();
        assert!(out.is_empty());

        let input = [bad, square(5.0, 0.0)];
        let out = MarginSingleSlice::new(&input, Vector2::new(1.0, 1.0), Vector2::new(0.5, 0.5))
            .execute()
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn contract_violations_are_errors() {
        let input = [square(5.0, 0.0)];
        let err = MarginSingleSlice::new(&input, Vector2::new(f64::NAN, 1.0), Vector2::new(0.5, 0.5))
            .execute();
        assert!(matches!(
            err,
            Err(SlicefieldError::Operation(OperationError::NonFinite { .. }))
        ));
        let err = MarginSingleSlice::new(&input, Vector2::new(1.0, 1.0), Vector2::new(-0.5, 0.5))
            .execute();
        assert!(matches!(
            err,
            Err(SlicefieldError::Operation(OperationError::NonPositive { .. }))
        ));
    }
}
