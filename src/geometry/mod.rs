pub mod contour;

pub use contour::{
    bounds_of, group_by_depth, sanitize_all, weighted_centroid, Contour, SliceGroup,
};
