use crate::geometry::Contour;
use crate::math::Point2;
use crate::raster::{BinaryMask, Grid};

/// Scanline polygon fill.
///
/// For every grid row, crossings of the row's center line with the contour
/// edges are collected (half-open rule, so a vertex on the line counts once),
/// sorted, and the cells whose centers fall in `[x_a, x_b)` between successive
/// pairs are filled. Contours are OR-ed together.
///
/// Contours with fewer than 3 points contribute nothing.
#[derive(Debug)]
pub struct Rasterize<'a> {
    contours: &'a [Contour],
    grid: Grid,
}

impl<'a> Rasterize<'a> {
    /// Creates a new rasterization.
    #[must_use]
    pub fn new(contours: &'a [Contour], grid: Grid) -> Self {
        Self { contours, grid }
    }

    /// Executes the fill.
    #[must_use]
    pub fn execute(&self) -> BinaryMask {
        let mut mask = BinaryMask::new(self.grid);
        let mut crossings = Vec::new();
        for contour in self.contours {
            fill_ring(&contour.points, &self.grid, &mut mask, &mut crossings);
        }
        mask
    }
}

/// Fills one ring into `mask`. `crossings` is scratch space.
pub(crate) fn fill_ring(
    ring: &[Point2],
    grid: &Grid,
    mask: &mut BinaryMask,
    crossings: &mut Vec<f64>,
) {
    let n = ring.len();
    if n < 3 || grid.is_empty() {
        return;
    }
    for j in 0..grid.height {
        let y = grid.cell_center(0, j).y;
        crossings.clear();
        for k in 0..n {
            let a = ring[k];
            let b = ring[(k + 1) % n];
            if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
                let t = (y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        if crossings.len() < 2 {
            continue;
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let (first, last) = column_span(grid, pair[0], pair[1]);
            for i in first..last {
                mask.set(i, j, true);
            }
        }
    }
}

/// Column range `[first, last)` whose cell centers lie in `[xa, xb)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn column_span(grid: &Grid, xa: f64, xb: f64) -> (usize, usize) {
    let fa = (xa - grid.origin.x) / grid.spacing.x - 0.5;
    let fb = (xb - grid.origin.x) / grid.spacing.x - 0.5;
    let w = grid.width as f64;
    let first = fa.ceil().clamp(0.0, w) as usize;
    let last = fb.ceil().clamp(0.0, w) as usize;
    (first, last.max(first))
}
