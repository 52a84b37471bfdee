use crate::raster::ScalarField;

/// How two endpoint distance fields are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// `(1 - t)·a + t·b`.
    #[default]
    Linear,
    /// Log-sum-exp soft minimum; rounder joins where the shapes disagree.
    SmoothMin,
    /// Blend toward a synthesized mid-depth pivot shape in two halves.
    PivotPiecewise,
}

/// Linear blend of two fields on the same grid.
#[must_use]
pub fn linear_blend(a: &ScalarField, b: &ScalarField, t: f64) -> ScalarField {
    a.zip_with(b, |va, vb| (1.0 - t) * va + t * vb)
}

/// Smooth-minimum blend `-α·ln((1-t)·e^(-a/α) + t·e^(-b/α))`.
///
/// Evaluated in log-sum-exp form so large distances do not overflow. `t` must
/// lie strictly inside `(0, 1)` and `alpha` must be positive.
#[must_use]
pub fn smooth_min_blend(a: &ScalarField, b: &ScalarField, t: f64, alpha: f64) -> ScalarField {
    let (wa, wb) = ((1.0 - t).ln(), t.ln());
    a.zip_with(b, |va, vb| {
        let x = wa - va / alpha;
        let y = wb - vb / alpha;
        let m = x.max(y);
        -alpha * (m + ((x - m).exp() + (y - m).exp()).ln())
    })
}
