use crate::math::{Vector2, Vector3};

/// Slack on the inclusion test so cells exactly at the margin survive rounding.
const INCLUSION_SLACK: f64 = 1e-9;

/// A centered, symmetric structuring element over a small 3D cell block.
///
/// 2D kernels have a Z radius of 0. `data` is laid out like a volume buffer
/// (x fastest, then y, then z) over `(2rx+1) × (2ry+1) × (2rz+1)` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuringKernel {
    radii: [usize; 3],
    data: Vec<u8>,
}

/// One horizontal run of a kernel: cells `dx ∈ [-half_width, half_width]` at
/// row offset `(dy, dz)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelRow {
    /// Row offset along Y.
    pub dy: isize,
    /// Row offset along Z.
    pub dz: isize,
    /// Half the run length, in cells.
    pub half_width: usize,
}

impl StructuringKernel {
    /// Disk of radius `margin_mm` on a grid with the given cell sizes.
    #[must_use]
    pub fn disk(margin_mm: f64, spacing: Vector2) -> Self {
        Self::ellipse(Vector2::new(margin_mm, margin_mm), spacing)
    }

    /// Ellipse with per-axis radii in mm.
    #[must_use]
    pub fn ellipse(radii_mm: Vector2, spacing: Vector2) -> Self {
        Self::ellipsoid(
            Vector3::new(radii_mm.x, radii_mm.y, 0.0),
            Vector3::new(spacing.x, spacing.y, 1.0),
        )
    }

    /// Sphere of radius `margin_mm` on a volume with the given cell sizes.
    #[must_use]
    pub fn sphere(margin_mm: f64, spacing: Vector3) -> Self {
        Self::ellipsoid(Vector3::new(margin_mm, margin_mm, margin_mm), spacing)
    }

    /// Ellipsoid with per-axis radii in mm.
    ///
    /// A cell offset is included iff `Σ (d·s / r)² ≤ 1` over the axes with a
    /// positive radius; axes with a zero radius only admit offset 0. For equal
    /// radii this is "world distance from the center ≤ radius".
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ellipsoid(radii_mm: Vector3, spacing: Vector3) -> Self {
        let radius = |r: f64, s: f64| -> usize {
            if r > 0.0 && s > 0.0 {
                (r.abs() / s + INCLUSION_SLACK).floor() as usize
            } else {
                0
            }
        };
        let radii = [
            radius(radii_mm.x, spacing.x),
            radius(radii_mm.y, spacing.y),
            radius(radii_mm.z, spacing.z),
        ];
        let dims = radii.map(|r| 2 * r + 1);
        let mut data = vec![0u8; dims[0] * dims[1] * dims[2]];

        let term = |d: usize, r: usize, rmm: f64, s: f64| -> f64 {
            if r == 0 {
                return 0.0;
            }
            #[allow(clippy::cast_precision_loss)]
            let offset = d.abs_diff(r) as f64 * s / rmm.abs();
            offset * offset
        };

        for z in 0..dims[2] {
            let tz = term(z, radii[2], radii_mm.z, spacing.z);
            for y in 0..dims[1] {
                let ty = term(y, radii[1], radii_mm.y, spacing.y);
                for x in 0..dims[0] {
                    let tx = term(x, radii[0], radii_mm.x, spacing.x);
                    if tx + ty + tz <= 1.0 + INCLUSION_SLACK {
                        data[(z * dims[1] + y) * dims[0] + x] = 1;
                    }
                }
            }
        }
        Self { radii, data }
    }

    /// Per-axis radii in cells.
    #[must_use]
    pub fn radii(&self) -> [usize; 3] {
        self.radii
    }

    /// Raw footprint buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of cells in the footprint.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Whether the footprint contains offset `(dx, dy, dz)`.
    #[must_use]
    pub fn contains(&self, dx: isize, dy: isize, dz: isize) -> bool {
        let [rx, ry, rz] = self.radii;
        let inside = |d: isize, r: usize| d.unsigned_abs() <= r;
        if !(inside(dx, rx) && inside(dy, ry) && inside(dz, rz)) {
            return false;
        }
        let dims = self.radii.map(|r| 2 * r + 1);
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
        let at = |d: isize, r: usize| (d + r as isize) as usize;
        self.data[(at(dz, rz) * dims[1] + at(dy, ry)) * dims[0] + at(dx, rx)] != 0
    }

    /// The footprint as horizontal runs. Ellipsoids are convex and symmetric,
    /// so every non-empty row is a single centered run.
    #[must_use]
    pub fn rows(&self) -> Vec<KernelRow> {
        let [rx, ry, rz] = self.radii;
        let dims = self.radii.map(|r| 2 * r + 1);
        let mut rows = Vec::new();
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                let row = &self.data[(z * dims[1] + y) * dims[0]..][..dims[0]];
                let count = row.iter().filter(|&&v| v != 0).count();
                if count == 0 {
                    continue;
                }
                #[allow(clippy::cast_possible_wrap)]
                let (dy, dz) = (y as isize - ry as isize, z as isize - rz as isize);
                rows.push(KernelRow {
                    dy,
                    dz,
                    half_width: (count - 1) / 2,
                });
                debug_assert!(row[rx] != 0);
            }
        }
        rows
    }
}
