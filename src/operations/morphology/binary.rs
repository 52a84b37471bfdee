//! Binary dilation and erosion with run-decomposed structuring kernels.
//!
//! Cells outside the raster count as background for both operations: dilation
//! never reads them (a no-op at the edge), while erosion sees them as missing
//! neighbors and clears every cell whose footprint leaves the raster.

use super::kernel::{KernelRow, StructuringKernel};
use crate::raster::{BinaryMask, BinaryVolume};

/// Raster dimensions: `width` cells per row, `height` rows per slice, `depth` slices.
#[derive(Debug, Clone, Copy)]
struct Shape {
    width: usize,
    height: usize,
    depth: usize,
}

impl Shape {
    fn row_start(self, j: usize, k: usize) -> usize {
        (k * self.height + j) * self.width
    }
}

/// Binary dilation of a 2D mask (output cell = max over the footprint).
///
/// Kernel rows off the slice plane are ignored.
#[must_use]
pub fn dilate(mask: &BinaryMask, kernel: &StructuringKernel) -> BinaryMask {
    let grid = *mask.grid();
    let shape = Shape {
        width: grid.width,
        height: grid.height,
        depth: 1,
    };
    let data = dilate_raw(mask.data(), shape, &planar_rows(kernel));
    BinaryMask::from_data(grid, data).unwrap_or_else(|| BinaryMask::new(grid))
}

/// Binary erosion of a 2D mask (output cell = min over the reflected footprint).
///
/// Kernel rows off the slice plane are ignored.
#[must_use]
pub fn erode(mask: &BinaryMask, kernel: &StructuringKernel) -> BinaryMask {
    let grid = *mask.grid();
    let shape = Shape {
        width: grid.width,
        height: grid.height,
        depth: 1,
    };
    let data = erode_raw(mask.data(), shape, &planar_rows(kernel));
    BinaryMask::from_data(grid, data).unwrap_or_else(|| BinaryMask::new(grid))
}

/// Morphological closing: dilation followed by erosion with the same kernel.
#[must_use]
pub fn close(mask: &BinaryMask, kernel: &StructuringKernel) -> BinaryMask {
    erode(&dilate(mask, kernel), kernel)
}

/// Binary dilation of a volume.
#[must_use]
pub fn dilate_volume(volume: &BinaryVolume, kernel: &StructuringKernel) -> BinaryVolume {
    let grid = *volume.grid();
    let data = dilate_raw(volume.data(), volume_shape(volume), &kernel.rows());
    BinaryVolume::from_data(grid, data).unwrap_or_else(|| BinaryVolume::new(grid))
}

/// Binary erosion of a volume.
#[must_use]
pub fn erode_volume(volume: &BinaryVolume, kernel: &StructuringKernel) -> BinaryVolume {
    let grid = *volume.grid();
    let data = erode_raw(volume.data(), volume_shape(volume), &kernel.rows());
    BinaryVolume::from_data(grid, data).unwrap_or_else(|| BinaryVolume::new(grid))
}

/// Volume closing.
#[must_use]
pub fn close_volume(volume: &BinaryVolume, kernel: &StructuringKernel) -> BinaryVolume {
    erode_volume(&dilate_volume(volume, kernel), kernel)
}

fn volume_shape(volume: &BinaryVolume) -> Shape {
    let grid = volume.grid();
    Shape {
        width: grid.plane.width,
        height: grid.plane.height,
        depth: grid.depth,
    }
}

fn planar_rows(kernel: &StructuringKernel) -> Vec<KernelRow> {
    kernel.rows().into_iter().filter(|r| r.dz == 0).collect()
}

/// `base + delta` if it lands in `[0, len)`.
fn shifted(base: usize, delta: isize, len: usize) -> Option<usize> {
    base.checked_add_signed(delta).filter(|&v| v < len)
}

/// Foreground runs `[start, end)` of one row.
fn runs(row: &[u8]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < row.len() && row[i] == 0 {
            i += 1;
        }
        if i >= row.len() {
            return None;
        }
        let start = i;
        while i < row.len() && row[i] != 0 {
            i += 1;
        }
        Some((start, i))
    })
}

fn dilate_raw(src: &[u8], shape: Shape, rows: &[KernelRow]) -> Vec<u8> {
    let mut out = vec![0u8; src.len()];
    for k in 0..shape.depth {
        for j in 0..shape.height {
            let row = &src[shape.row_start(j, k)..][..shape.width];
            for (start, end) in runs(row) {
                for kr in rows {
                    let (Some(tj), Some(tk)) = (
                        shifted(j, kr.dy, shape.height),
                        shifted(k, kr.dz, shape.depth),
                    ) else {
                        continue;
                    };
                    let lo = start.saturating_sub(kr.half_width);
                    let hi = (end + kr.half_width).min(shape.width);
                    let base = shape.row_start(tj, tk);
                    out[base + lo..base + hi].fill(1);
                }
            }
        }
    }
    out
}

fn erode_raw(src: &[u8], shape: Shape, rows: &[KernelRow]) -> Vec<u8> {
    // For a foreground cell, the exclusive end of its run; for background, itself.
    let mut run_end = vec![0usize; src.len()];
    for k in 0..shape.depth {
        for j in 0..shape.height {
            let base = shape.row_start(j, k);
            let mut end = 0;
            for i in (0..shape.width).rev() {
                if src[base + i] == 0 {
                    run_end[base + i] = i;
                } else {
                    if i + 1 == shape.width || src[base + i + 1] == 0 {
                        end = i + 1;
                    }
                    run_end[base + i] = end;
                }
            }
        }
    }

    let mut out = vec![0u8; src.len()];
    for k in 0..shape.depth {
        for j in 0..shape.height {
            let base = shape.row_start(j, k);
            for i in 0..shape.width {
                if src[base + i] == 0 {
                    continue;
                }
                let kept = rows.iter().all(|kr| {
                    let (Some(sj), Some(sk)) = (
                        shifted(j, -kr.dy, shape.height),
                        shifted(k, -kr.dz, shape.depth),
                    ) else {
                        return false;
                    };
                    let a = kr.half_width;
                    if i < a || i + a >= shape.width {
                        return false;
                    }
                    run_end[shape.row_start(sj, sk) + i - a] > i + a
                });
                if kept {
                    out[base + i] = 1;
                }
            }
        }
    }
    out
}
