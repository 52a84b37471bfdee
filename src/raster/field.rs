use super::{BinaryMask, Grid};

/// A real-valued raster over a [`Grid`].
///
/// Signed distance fields use the convention positive inside, negative
/// outside, magnitude in world mm.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    grid: Grid,
    data: Vec<f64>,
}

impl ScalarField {
    /// Creates a field filled with `value`.
    #[must_use]
    pub fn filled(grid: Grid, value: f64) -> Self {
        Self {
            grid,
            data: vec![value; grid.len()],
        }
    }

    /// Wraps an existing buffer. The length must match the grid.
    pub(crate) fn from_parts(grid: Grid, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), grid.len());
        Self { grid, data }
    }

    /// Wraps an existing buffer; returns `None` if its length does not match the grid.
    #[must_use]
    pub fn from_data(grid: Grid, data: Vec<f64>) -> Option<Self> {
        (data.len() == grid.len()).then_some(Self { grid, data })
    }

    /// The grid this field lives on.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Raw row-major values.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at cell `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.grid.index(i, j)]
    }

    /// Applies `f` to every value.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            grid: self.grid,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combines two fields on the same grid cell by cell.
    #[must_use]
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.grid, other.grid);
        Self {
            grid: self.grid,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Smallest and largest finite values, or `None` if there are none.
    #[must_use]
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of cells with `value >= threshold`.
    #[must_use]
    pub fn count_at_least(&self, threshold: f64) -> usize {
        self.data.iter().filter(|&&v| v >= threshold).count()
    }

    /// Mask of cells with `value >= threshold`.
    #[must_use]
    pub fn threshold(&self, threshold: f64) -> BinaryMask {
        let data = self.data.iter().map(|&v| u8::from(v >= threshold)).collect();
        // Lengths match by construction.
        BinaryMask::from_data(self.grid, data).unwrap_or_else(|| BinaryMask::new(self.grid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Vector2};

    fn field() -> ScalarField {
        let grid = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), 3, 2);
        ScalarField::from_data(grid, vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn threshold_counts() {
        let f = field();
        assert_eq!(f.count_at_least(0.0), 4);
        assert_eq!(f.threshold(1.5).count(), 2);
        assert_eq!(f.min_max(), Some((-2.0, 3.0)));
    }

    #[test]
    fn min_max_skips_non_finite() {
        let grid = Grid::new(Point2::origin(), Vector2::new(1.0, 1.0), 2, 1);
        let f = ScalarField::from_data(grid, vec![f64::NEG_INFINITY, 4.0]).unwrap();
        assert_eq!(f.min_max(), Some((4.0, 4.0)));
    }

    #[test]
    fn map_and_zip() {
        let f = field();
        let g = f.map(|v| v * 2.0);
        let h = f.zip_with(&g, |a, b| b - a);
        assert!((h.get(2, 1) - 3.0).abs() < 1e-12);
    }
}
