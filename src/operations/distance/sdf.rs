use tracing::trace;

use super::edt::{edt2d_scaled, EDT_INF};
use crate::raster::{BinaryMask, ScalarField};

/// Builds the signed distance field of a mask: positive inside, negative
/// outside, in world mm.
///
/// Two separable transforms are run, one seeded at background cells
/// (distance to outside, for foreground cells) and one seeded at foreground
/// cells (distance to inside, for background cells). Axis spacing enters as
/// parabola weights in each 1D pass, so distances are measured in world mm
/// between cell centers before the branches are combined.
///
/// Center-to-center distances put the nearest opposite cell one cell away,
/// while the pixel boundary lies half a cell away; half the mean spacing is
/// subtracted from both branches so the zero level follows the pixel
/// boundary. For anisotropic spacing this correction is exact only along the
/// axis whose spacing equals the mean.
///
/// An empty mask yields a field of `-L` and a full mask `+L`, with `L` the
/// grid diagonal.
#[must_use]
pub fn signed_distance_field(mask: &BinaryMask) -> ScalarField {
    let grid = *mask.grid();
    #[allow(clippy::cast_precision_loss)]
    let diagonal =
        (grid.width as f64 * grid.spacing.x).hypot(grid.height as f64 * grid.spacing.y);

    let count = mask.count();
    if count == 0 {
        return ScalarField::filled(grid, -diagonal);
    }
    if count == grid.len() {
        return ScalarField::filled(grid, diagonal);
    }

    let data = mask.data();
    let seeds_outside: Vec<f64> = data
        .iter()
        .map(|&v| if v == 0 { 0.0 } else { EDT_INF })
        .collect();
    let seeds_inside: Vec<f64> = data
        .iter()
        .map(|&v| if v == 0 { EDT_INF } else { 0.0 })
        .collect();

    let (sx, sy) = (grid.spacing.x, grid.spacing.y);
    let to_outside = edt2d_scaled(&seeds_outside, grid.width, grid.height, sx, sy);
    let to_inside = edt2d_scaled(&seeds_inside, grid.width, grid.height, sx, sy);

    let half = 0.5 * grid.mean_spacing();
    let sdf = data
        .iter()
        .zip(to_outside.iter().zip(&to_inside))
        .map(|(&v, (&out_sq, &in_sq))| {
            if v == 0 {
                -(in_sq.sqrt() - half)
            } else {
                out_sq.sqrt() - half
            }
        })
        .collect();

    trace!(
        width = grid.width,
        height = grid.height,
        foreground = count,
        "signed distance field built"
    );
    ScalarField::from_parts(grid, sdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Point2, Vector2};
    use crate::raster::Grid;
    use approx::assert_abs_diff_eq;

    fn grid(sx: f64, sy: f64) -> Grid {
        Grid::new(Point2::origin(), Vector2::new(sx, sy), 11, 11)
    }

    #[test]
    fn single_cell_distances() {
        let mut mask = BinaryMask::new(grid(1.0, 1.0));
        mask.set(5, 5, true);
        let sdf = signed_distance_field(&mask);
        assert_abs_diff_eq!(sdf.get(5, 5), 0.5);
        assert_abs_diff_eq!(sdf.get(6, 5), -0.5);
        assert_abs_diff_eq!(sdf.get(8, 9), -4.5, epsilon = 1e-12);
    }

    #[test]
    fn anisotropic_spacing_weights_axes() {
        let mut mask = BinaryMask::new(grid(1.0, 2.0));
        mask.set(5, 5, true);
        let sdf = signed_distance_field(&mask);
        // Two rows at 2 mm, half of the mean spacing (1.5 mm) removed.
        assert_abs_diff_eq!(sdf.get(5, 7), -(4.0 - 0.75), epsilon = 1e-12);
        assert_abs_diff_eq!(sdf.get(8, 5), -(3.0 - 0.75), epsilon = 1e-12);
    }

    #[test]
    fn positive_inside_negative_outside() {
        let mut mask = BinaryMask::new(grid(0.5, 0.5));
        for j in 2..9 {
            for i in 2..9 {
                mask.set(i, j, true);
            }
        }
        let sdf = signed_distance_field(&mask);
        // Center cell is 4 cells (2 mm) from the nearest background cell.
        assert_abs_diff_eq!(sdf.get(5, 5), 1.75, epsilon = 1e-12);
        assert!(sdf.get(2, 2) > 0.0);
        assert!(sdf.get(1, 5) < 0.0);
        assert_abs_diff_eq!(sdf.get(0, 5), -0.75, epsilon = 1e-12);
    }

    #[test]
    fn empty_and_full_masks() {
        let g = grid(1.0, 1.0);
        let empty = signed_distance_field(&BinaryMask::new(g));
        assert!(empty.data().iter().all(|&v| v < 0.0));
        let mut full = BinaryMask::new(g);
        full.data_mut().fill(1);
        let full = signed_distance_field(&full);
        assert!(full.data().iter().all(|&v| v > 0.0));
    }
}
