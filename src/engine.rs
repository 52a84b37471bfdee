//! Public call surface of the engine.
//!
//! A [`ContourEngine`] holds an [`EngineConfig`] and exposes the four
//! operations an editing application needs. It carries no other state, so one
//! engine can be shared freely between threads and calls.

use tracing::debug;

use crate::error::Result;
use crate::geometry::{sanitize_all, Contour};
use crate::math::{Vector2, Vector3};
use crate::operations::interpolate::{
    InterpolateSlice, InterpolationOptions, DEFAULT_THRESHOLD_ITERATIONS,
};
use crate::operations::isocontour::LoopSelection;
use crate::operations::margin::{MarginMethod, MarginMultiSlice, MarginSingleSlice};
use crate::operations::rasterize::Rasterize;
use crate::raster::{BinaryMask, Grid, DEFAULT_MAX_CELLS};

/// Tuning shared by every engine operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Hard ceiling on the number of cells of any grid or volume. Larger
    /// requests are coarsened.
    pub max_cells: usize,
    /// Extra cells around each grid's bounding box.
    pub padding_cells: usize,
    /// Grid spacing in mm for interpolation when the caller gives none.
    pub interpolation_spacing: f64,
    /// Douglas-Peucker tolerance for extracted contours, in cells.
    pub simplify_tolerance: f64,
    /// Node snapping tolerance for segment stitching, in cells.
    pub stitch_tolerance: f64,
    /// Loops smaller than this many cells are dropped as artifacts.
    pub min_loop_area: f64,
    /// How single-slice margins are computed.
    pub margin_method: MarginMethod,
    /// Which loops margin operations return.
    pub margin_selection: LoopSelection,
    /// Bisection steps for area matching and pivot search.
    pub threshold_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cells: DEFAULT_MAX_CELLS,
            padding_cells: 3,
            interpolation_spacing: 0.5,
            simplify_tolerance: 0.1,
            stitch_tolerance: 1e-6,
            min_loop_area: 1.0,
            margin_method: MarginMethod::Kernel,
            margin_selection: LoopSelection::All,
            threshold_iterations: DEFAULT_THRESHOLD_ITERATIONS,
        }
    }
}

impl EngineConfig {
    /// Sets the cell ceiling.
    #[must_use]
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Sets the bounding box padding in cells.
    #[must_use]
    pub fn with_padding_cells(mut self, padding_cells: usize) -> Self {
        self.padding_cells = padding_cells;
        self
    }

    /// Sets the default interpolation grid spacing in mm.
    #[must_use]
    pub fn with_interpolation_spacing(mut self, spacing: f64) -> Self {
        self.interpolation_spacing = spacing;
        self
    }

    /// Sets the simplification tolerance in cells.
    #[must_use]
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }

    /// Sets the stitching tolerance in cells.
    #[must_use]
    pub fn with_stitch_tolerance(mut self, tolerance: f64) -> Self {
        self.stitch_tolerance = tolerance;
        self
    }

    /// Sets the minimum loop area in cells.
    #[must_use]
    pub fn with_min_loop_area(mut self, area: f64) -> Self {
        self.min_loop_area = area;
        self
    }

    /// Sets the single-slice margin method.
    #[must_use]
    pub fn with_margin_method(mut self, method: MarginMethod) -> Self {
        self.margin_method = method;
        self
    }

    /// Sets the loop selection for margin output.
    #[must_use]
    pub fn with_margin_selection(mut self, selection: LoopSelection) -> Self {
        self.margin_selection = selection;
        self
    }

    /// Sets the number of bisection steps.
    #[must_use]
    pub fn with_threshold_iterations(mut self, iterations: usize) -> Self {
        self.threshold_iterations = iterations;
        self
    }
}

/// Entry point for contour margin, interpolation and preview rasterization.
#[derive(Debug, Clone, Default)]
pub struct ContourEngine {
    config: EngineConfig,
}

impl ContourEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Grows (`margin_mm > 0`) or shrinks (`margin_mm < 0`) the contours of
    /// one slice by an isotropic margin. `spacing` is the raster pixel size in
    /// mm.
    ///
    /// # Errors
    ///
    /// Returns an error if the margin is not finite or the spacing is not
    /// positive.
    pub fn margin_single_slice(
        &self,
        contours: &[Contour],
        margin_mm: f64,
        spacing: Vector2,
    ) -> Result<Vec<Contour>> {
        MarginSingleSlice::new(contours, Vector2::new(margin_mm, margin_mm), spacing)
            .with_config(self.config)
            .execute()
    }

    /// Applies per-axis margins to a structure spread over slices
    /// `slice_thickness` mm apart. Output is sorted by depth.
    ///
    /// # Errors
    ///
    /// Returns an error if a margin component is not finite, or the spacing
    /// or slice thickness is not positive.
    pub fn margin_multi_slice(
        &self,
        contours: &[Contour],
        margin: Vector3,
        spacing: Vector2,
        slice_thickness: f64,
    ) -> Result<Vec<Contour>> {
        MarginMultiSlice::new(contours, margin, spacing, slice_thickness)
            .with_config(self.config)
            .execute()
    }

    /// Synthesizes the contours at depth `z` from slices `a` at `za` and `b`
    /// at `zb`.
    ///
    /// # Errors
    ///
    /// Returns an error if a depth or the closing radius is not finite, or
    /// the grid spacing is not positive.
    pub fn interpolate_slice(
        &self,
        a: &[Contour],
        za: f64,
        b: &[Contour],
        zb: f64,
        z: f64,
        options: InterpolationOptions,
    ) -> Result<Vec<Contour>> {
        InterpolateSlice::new(a, za, b, zb, z)
            .with_options(options)
            .with_config(self.config)
            .execute()
    }

    /// Rasterizes contours onto a caller-provided grid for overlay display.
    /// Grids above the cell ceiling are coarsened over the same extent.
    #[must_use]
    pub fn rasterize_for_preview(&self, contours: &[Contour], grid: &Grid) -> BinaryMask {
        let grid = grid.capped(self.config.max_cells);
        let clean = sanitize_all(contours);
        debug!(
            contours = clean.len(),
            width = grid.width,
            height = grid.height,
            "preview rasterization"
        );
        Rasterize::new(&clean, grid).execute()
    }
}
