use super::{Grid, ScalarField};
use crate::math::Point2;

/// A binary raster over a [`Grid`]: 1 = inside, 0 = outside.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    grid: Grid,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Creates an all-zero mask.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            data: vec![0; grid.len()],
        }
    }

    /// Wraps an existing buffer; returns `None` if its length does not match the grid.
    #[must_use]
    pub fn from_data(grid: Grid, data: Vec<u8>) -> Option<Self> {
        (data.len() == grid.len()).then_some(Self { grid, data })
    }

    /// The grid this mask lives on.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Raw row-major cell values.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw cell values.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether cell `(i, j)` is foreground.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.data[self.grid.index(i, j)] != 0
    }

    /// Foreground test that treats out-of-range cells as background.
    #[must_use]
    pub fn get_or_background(&self, i: isize, j: isize) -> bool {
        match (usize::try_from(i), usize::try_from(j)) {
            (Ok(i), Ok(j)) if i < self.grid.width && j < self.grid.height => self.get(i, j),
            _ => false,
        }
    }

    /// Sets cell `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        let idx = self.grid.index(i, j);
        self.data[idx] = u8::from(value);
    }

    /// Number of foreground cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Whether no cell is foreground.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Foreground area in mm².
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn area(&self) -> f64 {
        self.count() as f64 * self.grid.cell_area()
    }

    /// Mean world position of the foreground cell centers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point2> {
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut n = 0usize;
        for j in 0..self.grid.height {
            for i in 0..self.grid.width {
                if self.get(i, j) {
                    sx += i as f64;
                    sy += j as f64;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| self.grid.to_world(sx / n as f64, sy / n as f64))
    }

    /// Cell-wise union with another mask on the same grid.
    pub fn union_with(&mut self, other: &Self) {
        debug_assert_eq!(self.grid, other.grid);
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a |= b;
        }
    }

    /// Converts to a field of `value − 0.5`, whose zero level runs halfway
    /// between foreground and background cell centers.
    #[must_use]
    pub fn to_centered_field(&self) -> ScalarField {
        let data = self
            .data
            .iter()
            .map(|&v| if v != 0 { 0.5 } else { -0.5 })
            .collect();
        ScalarField::from_parts(self.grid, data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector2;
    use approx::assert_abs_diff_eq;

    fn grid() -> Grid {
        Grid::new(Point2::origin(), Vector2::new(0.5, 0.5), 4, 3)
    }

    #[test]
    fn set_get_count() {
        let mut m = BinaryMask::new(grid());
        assert!(m.is_empty());
        m.set(1, 2, true);
        m.set(3, 0, true);
        assert!(m.get(1, 2));
        assert!(!m.get(0, 0));
        assert_eq!(m.count(), 2);
        assert_abs_diff_eq!(m.area(), 0.5);
    }

    #[test]
    fn out_of_range_is_background() {
        let mut m = BinaryMask::new(grid());
        m.data_mut().fill(1);
        assert!(m.get_or_background(0, 0));
        assert!(!m.get_or_background(-1, 0));
        assert!(!m.get_or_background(4, 0));
        assert!(!m.get_or_background(0, 3));
    }

    #[test]
    fn centered_field_signs() {
        let mut m = BinaryMask::new(grid());
        m.set(2, 1, true);
        let f = m.to_centered_field();
        assert_abs_diff_eq!(f.get(2, 1), 0.5);
        assert_abs_diff_eq!(f.get(0, 0), -0.5);
    }

    #[test]
    fn centroid_and_union() {
        let mut a = BinaryMask::new(grid());
        a.set(0, 0, true);
        let mut b = BinaryMask::new(grid());
        b.set(2, 0, true);
        a.union_with(&b);
        let c = a.centroid().unwrap();
        assert_abs_diff_eq!(c.x, 0.75);
        assert_abs_diff_eq!(c.y, 0.25);
        assert!(BinaryMask::new(grid()).centroid().is_none());
        assert!(BinaryMask::from_data(grid(), vec![0; 3]).is_none());
    }
}
