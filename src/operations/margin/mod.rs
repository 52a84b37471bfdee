//! Growing and shrinking structures by a margin.

mod multi;
mod single;

pub use multi::MarginMultiSlice;
pub use single::MarginSingleSlice;

use crate::math::{Vector2, Vector3};
use crate::operations::morphology::{
    dilate, dilate_volume, erode, erode_volume, StructuringKernel,
};
use crate::raster::{BinaryMask, BinaryVolume};

/// How a single-slice margin is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginMethod {
    /// Binary dilation/erosion with an elliptical kernel.
    #[default]
    Kernel,
    /// Shift the signed distance field and contour its zero level. Only
    /// isotropic margins take this path; anisotropic ones fall back to
    /// [`MarginMethod::Kernel`].
    DistanceField,
    /// Approximate per-vertex normal offset without rasterizing. See
    /// [`crate::operations::morphology::VertexNormalOffset`].
    VertexNormal,
}

/// Splits signed per-axis margins into the radii to grow by and the radii
/// to shrink by.
fn split_signs3(margin: Vector3) -> (Vector3, Vector3) {
    (margin.map(|m| m.max(0.0)), margin.map(|m| (-m).max(0.0)))
}

/// Applies a signed X/Y margin to a mask: dilation by the positive
/// components, then erosion by the negative ones.
fn apply_margin_2d(mask: &BinaryMask, margin: Vector2) -> BinaryMask {
    let spacing = mask.grid().spacing;
    let grow = margin.map(|m| m.max(0.0));
    let shrink = margin.map(|m| (-m).max(0.0));
    let mut out = mask.clone();
    if grow.max() > 0.0 {
        out = dilate(&out, &StructuringKernel::ellipse(grow, spacing));
    }
    if shrink.max() > 0.0 {
        out = erode(&out, &StructuringKernel::ellipse(shrink, spacing));
    }
    out
}

/// Volume counterpart of [`apply_margin_2d`].
fn apply_margin_3d(volume: &BinaryVolume, margin: Vector3) -> BinaryVolume {
    let grid = volume.grid();
    let spacing = Vector3::new(grid.plane.spacing.x, grid.plane.spacing.y, grid.dz);
    let (grow, shrink) = split_signs3(margin);
    let mut out = volume.clone();
    if grow.max() > 0.0 {
        out = dilate_volume(&out, &StructuringKernel::ellipsoid(grow, spacing));
    }
    if shrink.max() > 0.0 {
        out = erode_volume(&out, &StructuringKernel::ellipsoid(shrink, spacing));
    }
    out
}
