use tracing::debug;

use crate::geometry::Contour;
use crate::math::polygon_2d::to_ccw;
use crate::math::simplify::douglas_peucker_ring;
use crate::math::Point2;
use crate::raster::BinaryMask;

/// Moore neighborhood, clockwise (y up) starting east.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Index of west in [`DIRECTIONS`].
const WEST: usize = 4;

/// Step budget per grid cell.
const STEPS_PER_CELL: usize = 4;

/// Traces the outer boundary of one foreground region with 8-connected
/// Moore-neighbor following.
///
/// The trace starts at the first foreground cell in row-major order (lowest
/// row, then leftmost column), which always borders background or the grid
/// edge. From each cell the neighbors are searched clockwise starting just
/// after the background cell we backtracked from, and the walk ends when it
/// is about to repeat its first move out of the start cell, or when a step
/// budget proportional to the grid size runs out. The vertices are cell centers in world coordinates,
/// simplified with Douglas–Peucker and returned counter-clockwise.
///
/// One call yields one region. To collect several disjoint regions, clear the
/// traced region from the mask and call again.
#[derive(Debug)]
pub struct ExtractBoundary<'a> {
    mask: &'a BinaryMask,
    z: f64,
    tolerance: Option<f64>,
}

impl<'a> ExtractBoundary<'a> {
    /// Creates a new boundary extraction.
    #[must_use]
    pub fn new(mask: &'a BinaryMask) -> Self {
        Self {
            mask,
            z: 0.0,
            tolerance: None,
        }
    }

    /// Sets the depth assigned to the output contour.
    #[must_use]
    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Overrides the simplification tolerance in mm (default: half a cell).
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Executes the trace.
    ///
    /// Returns `None` for an empty mask, a region too small to form a ring,
    /// or when the step budget is exhausted.
    #[must_use]
    pub fn execute(&self) -> Option<Contour> {
        let cells = self.trace()?;
        let grid = self.mask.grid();
        #[allow(clippy::cast_precision_loss)]
        let ring: Vec<Point2> = cells
            .iter()
            .map(|&(i, j)| grid.to_world(i as f64, j as f64))
            .collect();
        let tolerance = self.tolerance.unwrap_or(0.5 * grid.mean_spacing());
        let simplified = douglas_peucker_ring(&ring, tolerance);
        Contour::new(to_ccw(simplified), self.z).sanitized().ok()
    }

    /// Returns the traced boundary cells, or `None` on failure.
    fn trace(&self) -> Option<Vec<(isize, isize)>> {
        let grid = self.mask.grid();
        let start = first_foreground(self.mask)?;
        let budget = grid.len().saturating_mul(STEPS_PER_CELL).max(16);

        let mut boundary = vec![start];
        let mut current = start;
        let mut backtrack = WEST;
        let mut second = None;

        for _ in 0..budget {
            // `None` here means an isolated cell.
            let (dir, prev) = self.next_step(current, backtrack)?;
            let (dx, dy) = DIRECTIONS[dir];
            let next = (current.0 + dx, current.1 + dy);

            if current == start {
                match second {
                    None => second = Some(next),
                    Some(s) if s == next => {
                        // The closing step re-entered `start`; drop the repeat.
                        boundary.pop();
                        return (boundary.len() >= 3).then_some(boundary);
                    }
                    Some(_) => {}
                }
            }

            let (px, py) = DIRECTIONS[prev];
            backtrack = direction_index(px - dx, py - dy)?;
            current = next;
            boundary.push(current);
        }

        debug!(budget, "boundary trace exceeded step budget");
        None
    }

    /// Finds the first foreground neighbor clockwise after `backtrack`.
    ///
    /// Returns the direction to it and the direction of the background
    /// neighbor checked just before it.
    fn next_step(&self, (ci, cj): (isize, isize), backtrack: usize) -> Option<(usize, usize)> {
        (1..=8).find_map(|k| {
            let dir = (backtrack + k) % 8;
            let (dx, dy) = DIRECTIONS[dir];
            self.mask
                .get_or_background(ci + dx, cj + dy)
                .then_some((dir, (backtrack + k - 1) % 8))
        })
    }
}

fn first_foreground(mask: &BinaryMask) -> Option<(isize, isize)> {
    let width = mask.grid().width;
    let idx = mask.data().iter().position(|&v| v != 0)?;
    let i = isize::try_from(idx % width).ok()?;
    let j = isize::try_from(idx / width).ok()?;
    Some((i, j))
}

fn direction_index(dx: isize, dy: isize) -> Option<usize> {
    DIRECTIONS.iter().position(|&d| d == (dx, dy))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::{perimeter, signed_area};
    use crate::math::Vector2;
    use crate::operations::rasterize::Rasterize;
    use crate::raster::Grid;
    use std::f64::consts::PI;

    fn grid() -> Grid {
        Grid::new(Point2::new(-2.0, -2.0), Vector2::new(0.1, 0.1), 140, 140)
    }

    fn polygon(points: &[(f64, f64)]) -> Contour {
        Contour::new(
            points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
            0.0,
        )
    }

    fn assert_round_trip(contour: &Contour) {
        let g = grid();
        let mask = Rasterize::new(std::slice::from_ref(contour), g).execute();
        let traced = ExtractBoundary::new(&mask).execute().unwrap();
        let tolerance = perimeter(&contour.points) * g.spacing.x;
        let delta = (traced.area() - contour.area()).abs();
        assert!(
            delta <= tolerance,
            "area {} vs {} (tolerance {tolerance})",
            traced.area(),
            contour.area()
        );
        assert!(signed_area(&traced.points) > 0.0);
    }

    #[test]
    fn square_round_trip() {
        assert_round_trip(&polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn circle_round_trip() {
        let pts: Vec<(f64, f64)> = (0..128)
            .map(|k| {
                let a = 2.0 * PI * f64::from(k) / 128.0;
                (5.0 + 4.0 * a.cos(), 5.0 + 4.0 * a.sin())
            })
            .collect();
        assert_round_trip(&polygon(&pts));
    }

    #[test]
    fn concave_round_trip() {
        assert_round_trip(&polygon(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (6.0, 10.0),
            (6.0, 3.0),
            (4.0, 3.0),
            (4.0, 10.0),
            (0.0, 10.0),
        ]));
    }

    #[test]
    fn square_trace_simplifies_to_corners() {
        let g = grid();
        let c = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let mask = Rasterize::new(&[c], g).execute();
        let traced = ExtractBoundary::new(&mask).with_depth(7.5).execute().unwrap();
        assert_eq!(traced.points.len(), 4);
        assert!((traced.z - 7.5).abs() < 1e-12);
    }

    #[test]
    fn empty_and_isolated_masks_yield_none() {
        let g = grid();
        let mut mask = BinaryMask::new(g);
        assert!(ExtractBoundary::new(&mask).execute().is_none());
        mask.set(10, 10, true);
        assert!(ExtractBoundary::new(&mask).execute().is_none());
    }

    #[test]
    fn region_touching_grid_edge_is_traced() {
        let g = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), 6, 6);
        let mut mask = BinaryMask::new(g);
        for j in 0..6 {
            for i in 0..3 {
                mask.set(i, j, true);
            }
        }
        let traced = ExtractBoundary::new(&mask).with_tolerance(0.1).execute().unwrap();
        // Cell centers span [0.5, 2.5] x [0.5, 5.5].
        assert!((traced.area() - 10.0).abs() < 1e-9);
    }
}
