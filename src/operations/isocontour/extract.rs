use tracing::debug;

use super::marching::marching_squares_zero;
use super::select::LoopSelection;
use super::stitch::stitch_polylines;
use crate::geometry::Contour;
use crate::math::polygon_2d::to_ccw;
use crate::math::simplify::douglas_peucker_ring;
use crate::math::Point2;
use crate::raster::ScalarField;

/// Extracts the zero level of a scalar field as world-space contours.
///
/// Runs marching squares, stitches the segments into closed loops, maps them
/// from cell-center indices to world coordinates, simplifies each with
/// Douglas–Peucker, orients them counter-clockwise and drops loops smaller
/// than the minimum area. The loop selection policy is applied last.
///
/// Regions touching the edge of the field produce open chains and are lost,
/// so fields should be built on padded grids.
///
/// Tolerances are given in cells and scaled by the grid's mean spacing.
#[derive(Debug)]
pub struct ExtractIsoContours<'a> {
    field: &'a ScalarField,
    z: f64,
    selection: LoopSelection,
    simplify_tolerance: f64,
    stitch_tolerance: f64,
    min_loop_area: f64,
}

impl<'a> ExtractIsoContours<'a> {
    /// Creates a new extraction with 0.1-cell simplification, no loop
    /// filtering and all loops kept.
    #[must_use]
    pub fn new(field: &'a ScalarField) -> Self {
        Self {
            field,
            z: 0.0,
            selection: LoopSelection::All,
            simplify_tolerance: 0.1,
            stitch_tolerance: 1e-6,
            min_loop_area: 0.0,
        }
    }

    /// Sets the depth assigned to every output contour.
    #[must_use]
    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Sets the loop selection policy.
    #[must_use]
    pub fn with_selection(mut self, selection: LoopSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Douglas–Peucker tolerance in cells; 0 disables simplification.
    #[must_use]
    pub fn with_simplify_tolerance(mut self, cells: f64) -> Self {
        self.simplify_tolerance = cells;
        self
    }

    /// Endpoint snapping distance in cells.
    #[must_use]
    pub fn with_stitch_tolerance(mut self, cells: f64) -> Self {
        self.stitch_tolerance = cells;
        self
    }

    /// Loops enclosing fewer than this many cells are dropped.
    #[must_use]
    pub fn with_min_loop_area(mut self, cells: f64) -> Self {
        self.min_loop_area = cells;
        self
    }

    /// Executes the extraction.
    #[must_use]
    pub fn execute(&self) -> Vec<Contour> {
        let grid = self.field.grid();
        let segments = marching_squares_zero(self.field.data(), grid.width, grid.height);
        let loops = stitch_polylines(&segments, self.stitch_tolerance);

        let tolerance = self.simplify_tolerance * grid.mean_spacing();
        let min_area = self.min_loop_area * grid.cell_area();
        let contours: Vec<Contour> = loops
            .iter()
            .filter_map(|ring| {
                let world: Vec<Point2> = ring.iter().map(|p| grid.to_world(p.x, p.y)).collect();
                let simplified = if tolerance > 0.0 {
                    douglas_peucker_ring(&world, tolerance)
                } else {
                    world
                };
                let contour = Contour::new(to_ccw(simplified), self.z).sanitized().ok()?;
                (contour.area() >= min_area).then_some(contour)
            })
            .collect();

        debug!(
            segments = segments.len(),
            loops = loops.len(),
            kept = contours.len(),
            "iso-contours extracted"
        );
        self.selection.select(contours)
    }
}
