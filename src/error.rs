use thiserror::Error;

/// Top-level error type for the slicefield engine.
#[derive(Debug, Error)]
pub enum SlicefieldError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised while validating contour geometry.
///
/// These never escape the batch entry points: a contour that fails validation
/// is dropped and the operation continues with the remaining ones.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("contour has {0} usable points, at least 3 are required")]
    TooFewPoints(usize),

    #[error("non-finite coordinate at point {0}")]
    NonFinite(usize),

    #[error("degenerate ring: |area| = {0:e}")]
    ZeroArea(f64),

    #[error("flat buffer length {0} is not a multiple of 3")]
    FlatBufferLength(usize),
}

/// Errors caused by an invalid call contract.
#[derive(Debug, Error, PartialEq)]
pub enum OperationError {
    #[error("parameter {parameter} = {value} must be finite")]
    NonFinite { parameter: &'static str, value: f64 },

    #[error("parameter {parameter} = {value} must be positive")]
    NonPositive { parameter: &'static str, value: f64 },
}

impl OperationError {
    /// Checks that `value` is finite.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NonFinite` otherwise.
    pub fn require_finite(parameter: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { parameter, value }.into())
        }
    }

    /// Checks that `value` is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NonFinite` or `OperationError::NonPositive`.
    pub fn require_positive(parameter: &'static str, value: f64) -> Result<f64> {
        let value = Self::require_finite(parameter, value)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NonPositive { parameter, value }.into())
        }
    }
}

/// Convenience type alias for results using [`SlicefieldError`].
pub type Result<T> = std::result::Result<T, SlicefieldError>;
