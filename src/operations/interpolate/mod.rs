//! Synthesis of intermediate slices from their neighbors.

mod blend;
mod pivot;
mod slice;
mod threshold;

pub use blend::{linear_blend, smooth_min_blend, BlendMode};
pub use pivot::{build_pivot, Pivot};
pub use slice::{InterpolateSlice, InterpolationOptions};
pub use threshold::{area_matched_threshold, DEFAULT_THRESHOLD_ITERATIONS};
