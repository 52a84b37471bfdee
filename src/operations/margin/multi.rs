use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

use super::apply_margin_3d;
use crate::engine::EngineConfig;
use crate::error::{OperationError, Result};
use crate::geometry::{bounds_of, group_by_depth, sanitize_all, Contour, SliceGroup};
use crate::math::polygon_2d::Aabb2;
use crate::math::{Vector2, Vector3, TOLERANCE};
use crate::operations::isocontour::ExtractIsoContours;
use crate::operations::rasterize::Rasterize;
use crate::raster::{BinaryMask, BinaryVolume, VolumeGrid};

/// Contours whose depths differ by less than this fraction of the slice
/// thickness are treated as one slice.
const SLICE_DEPTH_TOLERANCE: f64 = 0.25;

/// In-plane cells each slice keeps before the slice spacing is coarsened.
const MIN_PLANE_CELLS: usize = 1024;

/// Applies a 3D margin to a structure made of contours on parallel slices.
///
/// Slices are stacked into a binary volume with spacing `slice_thickness`
/// (padded in every direction by the positive margin), the volume is dilated
/// by the positive margin components and then eroded by the negative ones
/// with ellipsoidal kernels, and every slice of the result is contoured.
///
/// Rasterization and extraction run per slice in parallel; the output is
/// ordered by depth. Slices created by the margin get depths on the input
/// slice lattice. When the stack would exceed the cell ceiling the lattice
/// spacing is coarsened; input slices that land on the same lattice slice are
/// unioned there.
#[derive(Debug)]
pub struct MarginMultiSlice<'a> {
    contours: &'a [Contour],
    margin: Vector3,
    spacing: Vector2,
    slice_thickness: f64,
    config: EngineConfig,
}

impl<'a> MarginMultiSlice<'a> {
    /// Creates a new multi-slice margin with per-axis margins in mm.
    #[must_use]
    pub fn new(
        contours: &'a [Contour],
        margin: Vector3,
        spacing: Vector2,
        slice_thickness: f64,
    ) -> Self {
        Self {
            contours,
            margin,
            spacing,
            slice_thickness,
            config: EngineConfig::default(),
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the margin.
    ///
    /// # Errors
    ///
    /// - `OperationError::NonFinite` if a margin component is not finite
    /// - `OperationError::NonPositive` if a spacing component or the slice
    ///   thickness is not positive
    pub fn execute(&self) -> Result<Vec<Contour>> {
        OperationError::require_finite("margin.x", self.margin.x)?;
        OperationError::require_finite("margin.y", self.margin.y)?;
        OperationError::require_finite("margin.z", self.margin.z)?;
        OperationError::require_positive("spacing.x", self.spacing.x)?;
        OperationError::require_positive("spacing.y", self.spacing.y)?;
        let dz = OperationError::require_positive("slice_thickness", self.slice_thickness)?;

        let clean = sanitize_all(self.contours);
        let groups = group_by_depth(&clean, SLICE_DEPTH_TOLERANCE * dz);
        let (Some(first), Some(bounds)) = (groups.first(), bounds_of(&clean)) else {
            return Ok(Vec::new());
        };
        if self.margin.abs().max() < TOLERANCE {
            return Ok(groups.into_iter().flat_map(|g| g.contours).collect());
        }

        let (layout, grid) = self.plan_volume(&groups, first.z, dz, &bounds);

        let masks: Vec<BinaryMask> = groups
            .as_slice()
            .into_par_iter()
            .map(|g| Rasterize::new(&g.contours, grid.plane).execute())
            .collect();
        let mut volume = BinaryVolume::new(grid);
        for (&k, mask) in layout.slots.iter().zip(&masks) {
            volume.union_slice(k, mask);
        }

        let volume = apply_margin_3d(&volume, self.margin);

        let per_slice: Vec<Vec<Contour>> = (0..grid.depth)
            .into_par_iter()
            .map(|k| {
                let z = layout.depth_of(k, &groups, &grid);
                let field = volume.slice(k).to_centered_field();
                ExtractIsoContours::new(&field)
                    .with_depth(z)
                    .with_selection(self.config.margin_selection)
                    .with_simplify_tolerance(self.config.simplify_tolerance)
                    .with_stitch_tolerance(self.config.stitch_tolerance)
                    .with_min_loop_area(self.config.min_loop_area)
                    .execute()
            })
            .collect();

        let out: Vec<Contour> = per_slice.into_iter().flatten().collect();
        debug!(
            slices_in = groups.len(),
            slices = grid.depth,
            contours = out.len(),
            width = grid.plane.width,
            height = grid.plane.height,
            "multi-slice margin"
        );
        Ok(out)
    }

    /// Places the slice groups on a volume lattice that fits the cell ceiling.
    ///
    /// The lattice starts at the slice thickness and doubles until the slice
    /// count leaves every plane at least [`MIN_PLANE_CELLS`] cells; groups
    /// that then share a lattice slice are merged into it.
    fn plan_volume(
        &self,
        groups: &[SliceGroup],
        z_first: f64,
        dz: f64,
        bounds: &Aabb2,
    ) -> (SliceLayout, VolumeGrid) {
        let max_depth = (self.config.max_cells / MIN_PLANE_CELLS).max(3);
        let mut step = dz;
        let mut layout = SliceLayout::new(groups, z_first, step, self.margin.z);
        while layout.depth > max_depth && step.is_finite() {
            step *= 2.0;
            layout = SliceLayout::new(groups, z_first, step, self.margin.z);
        }
        if step > dz {
            warn!(
                slice_thickness = dz,
                step,
                slices = layout.depth,
                max_cells = self.config.max_cells,
                "volume exceeds cell ceiling, coarsening slice spacing"
            );
        }
        let merged = layout.slots.windows(2).filter(|w| w[0] == w[1]).count();
        if merged > 0 {
            debug!(merged, "slice groups share a lattice slice");
        }

        let grid = VolumeGrid::covering(
            bounds,
            self.spacing,
            Vector2::new(self.margin.x.max(0.0), self.margin.y.max(0.0)),
            self.config.padding_cells,
            self.config.max_cells,
            layout.z0,
            step,
            layout.depth,
        );
        (layout, grid)
    }
}

/// Placement of the input slices inside the padded volume.
struct SliceLayout {
    /// Depth of volume slice 0.
    z0: f64,
    /// Number of volume slices.
    depth: usize,
    /// Volume slice index of each input group.
    slots: Vec<usize>,
}

impl SliceLayout {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn new(groups: &[SliceGroup], z_first: f64, dz: f64, margin_z: f64) -> Self {
        let pad = (margin_z.max(0.0) / dz).ceil() as usize;
        let offsets: Vec<usize> = groups
            .iter()
            .map(|g| ((g.z - z_first) / dz).round().max(0.0) as usize)
            .collect();
        let span = offsets.last().copied().unwrap_or(0).saturating_add(1);
        Self {
            z0: z_first - pad as f64 * dz,
            depth: span.saturating_add(pad.saturating_mul(2)),
            slots: offsets.into_iter().map(|o| o.saturating_add(pad)).collect(),
        }
    }

    /// Output depth of volume slice `k`: the input depth where one exists,
    /// otherwise the lattice depth.
    fn depth_of(&self, k: usize, groups: &[SliceGroup], grid: &VolumeGrid) -> f64 {
        self.slots
            .iter()
            .position(|&s| s == k)
            .map_or_else(|| grid.slice_z(k), |g| groups[g].z)
    }
}
