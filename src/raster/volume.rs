use super::{BinaryMask, Grid};
use crate::math::polygon_2d::Aabb2;
use crate::math::Vector2;

/// A stack of equally spaced slice grids sharing one in-plane layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGrid {
    /// In-plane layout shared by every slice.
    pub plane: Grid,
    /// Depth of slice 0 in mm.
    pub z0: f64,
    /// Distance between consecutive slices in mm.
    pub dz: f64,
    /// Number of slices.
    pub depth: usize,
}

impl VolumeGrid {
    /// Builds a volume covering `bounds` in-plane and `depth` slices from
    /// `z0`, coarsening the in-plane resolution until the whole volume holds
    /// at most `max_cells` cells.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn covering(
        bounds: &Aabb2,
        spacing: Vector2,
        pad_mm: Vector2,
        padding_cells: usize,
        max_cells: usize,
        z0: f64,
        dz: f64,
        depth: usize,
    ) -> Self {
        let plane = Grid::covering_with_depth(
            bounds,
            spacing,
            pad_mm,
            padding_cells,
            max_cells,
            depth,
        );
        Self {
            plane,
            z0,
            dz,
            depth,
        }
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plane.len().saturating_mul(self.depth)
    }

    /// Whether the volume has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of slice `k`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slice_z(&self, k: usize) -> f64 {
        self.z0 + k as f64 * self.dz
    }

    /// Flat buffer index of cell `(i, j, k)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        k * self.plane.len() + self.plane.index(i, j)
    }
}

/// A binary raster over a [`VolumeGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryVolume {
    grid: VolumeGrid,
    data: Vec<u8>,
}

impl BinaryVolume {
    /// Creates an all-zero volume.
    #[must_use]
    pub fn new(grid: VolumeGrid) -> Self {
        Self {
            grid,
            data: vec![0; grid.len()],
        }
    }

    /// Wraps an existing buffer; returns `None` if its length does not match the layout.
    #[must_use]
    pub fn from_data(grid: VolumeGrid, data: Vec<u8>) -> Option<Self> {
        (data.len() == grid.len()).then_some(Self { grid, data })
    }

    /// Raw cell values, slice after slice.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The volume layout.
    #[must_use]
    pub fn grid(&self) -> &VolumeGrid {
        &self.grid
    }

    /// Whether cell `(i, j, k)` is foreground.
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> bool {
        self.data[self.grid.index(i, j, k)] != 0
    }

    /// Sets cell `(i, j, k)`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: bool) {
        let idx = self.grid.index(i, j, k);
        self.data[idx] = u8::from(value);
    }

    /// Number of foreground cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Copies slice `k` out as a 2D mask.
    #[must_use]
    pub fn slice(&self, k: usize) -> BinaryMask {
        let n = self.grid.plane.len();
        let data = self.data[k * n..(k + 1) * n].to_vec();
        BinaryMask::from_data(self.grid.plane, data)
            .unwrap_or_else(|| BinaryMask::new(self.grid.plane))
    }

    /// Overwrites slice `k` with `mask`, which must live on the volume's plane grid.
    pub fn set_slice(&mut self, k: usize, mask: &BinaryMask) {
        debug_assert_eq!(*mask.grid(), self.grid.plane);
        let n = self.grid.plane.len();
        self.data[k * n..(k + 1) * n].copy_from_slice(mask.data());
    }

    /// Adds the foreground of `mask` to slice `k`, keeping what is already there.
    pub fn union_slice(&mut self, k: usize, mask: &BinaryMask) {
        debug_assert_eq!(*mask.grid(), self.grid.plane);
        let n = self.grid.plane.len();
        for (a, &b) in self.data[k * n..(k + 1) * n].iter_mut().zip(mask.data()) {
            *a |= b;
        }
    }
}
