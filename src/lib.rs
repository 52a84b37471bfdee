//! Slice-based contour geometry on raster grids.
//!
//! Contours (closed rings at a fixed depth) are rasterized onto grids, turned
//! into signed distance fields, grown or shrunk by morphology, blended between
//! slices, and traced back into contours with marching squares.
//!
//! [`ContourEngine`] is the usual entry point; the operation structs under
//! [`operations`] expose the individual steps.

pub mod engine;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod raster;

pub use engine::{ContourEngine, EngineConfig};
pub use error::{Result, SlicefieldError};
pub use geometry::Contour;
pub use operations::interpolate::{BlendMode, InterpolationOptions};
pub use operations::isocontour::LoopSelection;
pub use operations::margin::MarginMethod;
pub use raster::{BinaryMask, Grid, ScalarField};
