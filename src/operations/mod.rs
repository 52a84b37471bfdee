pub mod distance;
pub mod interpolate;
pub mod isocontour;
pub mod margin;
pub mod morphology;
pub mod rasterize;
