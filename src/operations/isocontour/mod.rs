//! Scalar field → vector contours.

mod extract;
mod marching;
mod select;
mod stitch;

pub use extract::ExtractIsoContours;
pub use marching::{marching_squares_zero, Segment};
pub use select::LoopSelection;
pub use stitch::stitch_polylines;
