//! Structuring-kernel morphology and margin primitives.

mod binary;
mod kernel;
mod normal_offset;
mod sdf_margin;

pub use binary::{close, close_volume, dilate, dilate_volume, erode, erode_volume};
pub use kernel::{KernelRow, StructuringKernel};
pub use normal_offset::VertexNormalOffset;
pub use sdf_margin::{margin_field, margin_mask};
