//! Transient raster working state: grids, binary masks, scalar fields.
//!
//! Every buffer here is owned by a single operation call and rebuilt per call.

mod field;
mod grid;
mod mask;
mod volume;

pub use field::ScalarField;
pub use grid::Grid;
pub use mask::BinaryMask;
pub use volume::{BinaryVolume, VolumeGrid};

/// Default ceiling on the number of cells a single grid or volume may hold.
pub const DEFAULT_MAX_CELLS: usize = 4_000_000;

/// Upper bound on coarsening rounds; after this the grid is already tiny.
const MAX_COARSEN_ROUNDS: usize = 64;
