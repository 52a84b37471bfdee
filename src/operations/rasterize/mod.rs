//! Polygon ⇄ binary-mask conversion.

mod boundary;
mod scanline;

pub use boundary::ExtractBoundary;
pub use scanline::Rasterize;
