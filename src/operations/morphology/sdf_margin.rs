use crate::raster::{BinaryMask, ScalarField};

/// Shifts a signed distance field by a margin: the zero level of the result is
/// the input boundary moved outward by `margin_mm` (inward if negative).
///
/// Feeding the result straight to the iso-contour extractor avoids the
/// staircase of a thresholded mask.
#[must_use]
pub fn margin_field(sdf: &ScalarField, margin_mm: f64) -> ScalarField {
    sdf.map(|v| v + margin_mm)
}

/// Binary version of [`margin_field`]: cells with `sdf >= -margin_mm`.
#[must_use]
pub fn margin_mask(sdf: &ScalarField, margin_mm: f64) -> BinaryMask {
    sdf.threshold(-margin_mm)
}
