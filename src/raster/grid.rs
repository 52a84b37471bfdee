use tracing::warn;

use super::MAX_COARSEN_ROUNDS;
use crate::math::polygon_2d::Aabb2;
use crate::math::{Point2, Vector2};

/// A rectangular raster parameterization of one slice plane.
///
/// Cell `(i, j)` covers `[ox + i·sx, ox + (i+1)·sx) × [oy + j·sy, oy + (j+1)·sy)`
/// and is sampled at its center. Buffers over a grid are row-major with `i`
/// varying fastest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// World position of the lower-left corner of cell `(0, 0)`.
    pub origin: Point2,
    /// Cell size per axis in mm; both components are positive.
    pub spacing: Vector2,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Grid {
    /// Creates a grid from explicit parameters.
    #[must_use]
    pub fn new(origin: Point2, spacing: Vector2, width: usize, height: usize) -> Self {
        Self {
            origin,
            spacing,
            width,
            height,
        }
    }

    /// Builds a grid covering `bounds` plus `pad_mm` on each side plus
    /// `padding_cells` extra cells, coarsened until it holds at most
    /// `max_cells` cells.
    #[must_use]
    pub fn covering(
        bounds: &Aabb2,
        spacing: Vector2,
        pad_mm: Vector2,
        padding_cells: usize,
        max_cells: usize,
    ) -> Self {
        Self::covering_with_depth(bounds, spacing, pad_mm, padding_cells, max_cells, 1)
    }

    /// Like [`Grid::covering`], but the cell budget is shared by `depth` slices.
    ///
    /// The result never holds more than `max_cells` cells over all slices as
    /// long as `max_cells >= depth`: padding cells are clamped to what one
    /// plane's share allows, and if coarsening alone cannot reach the ceiling
    /// the padded bounds collapse into a single cell per axis.
    pub(crate) fn covering_with_depth(
        bounds: &Aabb2,
        spacing: Vector2,
        pad_mm: Vector2,
        padding_cells: usize,
        max_cells: usize,
        depth: usize,
    ) -> Self {
        let depth = depth.max(1);
        let plane_budget = (max_cells / depth).max(1);
        let padding_cells = padding_cells.min(max_padding_cells(plane_budget));
        let mut spacing = spacing;
        let mut grid = Self::layout(bounds, spacing, pad_mm, padding_cells);
        for _ in 0..MAX_COARSEN_ROUNDS {
            let cells = grid.len().saturating_mul(depth);
            if cells <= max_cells {
                return grid;
            }
            #[allow(clippy::cast_precision_loss)]
            let factor = (cells as f64 / max_cells.max(1) as f64).sqrt() * 1.01;
            warn!(
                cells,
                max_cells,
                factor,
                "grid exceeds cell ceiling, coarsening resolution"
            );
            spacing *= factor;
            grid = Self::layout(bounds, spacing, pad_mm, padding_cells);
        }
        if grid.len().saturating_mul(depth) <= max_cells {
            return grid;
        }

        let core = bounds.size() + pad_mm.abs() * 2.0;
        let one_cell = |extent: f64, s: f64| {
            if extent > 0.0 {
                s.max(extent * (1.0 + 1e-6))
            } else {
                s
            }
        };
        let spacing = Vector2::new(one_cell(core.x, spacing.x), one_cell(core.y, spacing.y));
        warn!(
            cells = grid.len().saturating_mul(depth),
            max_cells,
            padding_cells,
            "coarsening did not reach the cell ceiling, using one cell per axis"
        );
        Self::layout(bounds, spacing, pad_mm, padding_cells)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn layout(bounds: &Aabb2, spacing: Vector2, pad_mm: Vector2, padding_cells: usize) -> Self {
        let pad = Vector2::new(
            pad_mm.x.abs() + padding_cells as f64 * spacing.x,
            pad_mm.y.abs() + padding_cells as f64 * spacing.y,
        );
        let extent = bounds.size() + pad * 2.0;
        let width = ((extent.x / spacing.x).ceil() as usize).max(1);
        let height = ((extent.y / spacing.y).ceil() as usize).max(1);
        Self {
            origin: bounds.min - pad,
            spacing,
            width,
            height,
        }
    }

    /// Returns a grid over the same extent with at most `max_cells` cells.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn capped(&self, max_cells: usize) -> Self {
        let extent = Vector2::new(
            self.width as f64 * self.spacing.x,
            self.height as f64 * self.spacing.y,
        );
        let mut grid = *self;
        for _ in 0..MAX_COARSEN_ROUNDS {
            if grid.len() <= max_cells {
                break;
            }
            let factor = (grid.len() as f64 / max_cells.max(1) as f64).sqrt() * 1.01;
            warn!(cells = grid.len(), max_cells, factor, "coarsening preview grid");
            grid.spacing *= factor;
            grid.width = ((extent.x / grid.spacing.x).ceil() as usize).max(1);
            grid.height = ((extent.y / grid.spacing.y).ceil() as usize).max(1);
        }
        grid
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat buffer index of cell `(i, j)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    /// Area of one cell in mm².
    #[must_use]
    pub fn cell_area(&self) -> f64 {
        self.spacing.x * self.spacing.y
    }

    /// Mean of the per-axis cell sizes.
    #[must_use]
    pub fn mean_spacing(&self) -> f64 {
        0.5 * (self.spacing.x + self.spacing.y)
    }

    /// World position of the center of cell `(i, j)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, i: usize, j: usize) -> Point2 {
        self.to_world(i as f64, j as f64)
    }

    /// Converts a fractional cell-center index to world coordinates.
    #[must_use]
    pub fn to_world(&self, fx: f64, fy: f64) -> Point2 {
        Point2::new(
            self.origin.x + (fx + 0.5) * self.spacing.x,
            self.origin.y + (fy + 0.5) * self.spacing.y,
        )
    }

    /// Converts world coordinates to a fractional cell-center index.
    #[must_use]
    pub fn to_cell(&self, p: &Point2) -> (f64, f64) {
        (
            (p.x - self.origin.x) / self.spacing.x - 0.5,
            (p.y - self.origin.y) / self.spacing.y - 0.5,
        )
    }
}

/// Largest padding `p` whose padded single cell, `(2p + 1)²`, fits in `budget`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn max_padding_cells(budget: usize) -> usize {
    let side = (budget as f64).sqrt().floor() as usize;
    side.saturating_sub(1) / 2
}
