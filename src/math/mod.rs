pub mod distance_2d;
pub mod polygon_2d;
pub mod simplify;

/// 2D point type (in-plane world millimeters).
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type, used for per-axis margins.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Two consecutive contour points closer than this are treated as duplicates.
pub const DUPLICATE_TOLERANCE: f64 = 1e-9;

/// Rings with an absolute area below this (mm²) are degenerate.
pub const MIN_RING_AREA: f64 = 1e-9;
