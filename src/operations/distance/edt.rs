//! Felzenszwalb–Huttenlocher squared distance transform.
//!
//! The 1D transform computes the lower envelope of the parabolas rooted at
//! every sample, `w·(q − p)² + f(p)`, in linear time. Running it along every
//! column and then along every row of the column result gives the exact 2D
//! squared Euclidean distance transform.

/// Sentinel for "no seed here". Large but finite so parabola intersections
/// never produce `inf − inf`.
pub const EDT_INF: f64 = 1e20;

/// Exact 1D squared distance transform in index units.
///
/// `f[i]` is 0 at seeds and [`EDT_INF`] elsewhere (any non-negative sampled
/// function works). The output is `min_p (i − p)² + f[p]`.
#[must_use]
pub fn edt1d(f: &[f64]) -> Vec<f64> {
    edt1d_weighted(f, 1.0)
}

/// 1D squared distance transform with parabola weight `w`, i.e.
/// `min_p w·(i − p)² + f[p]`. With `w = s²` the result is in squared world
/// units for a sample spacing `s`.
#[must_use]
pub fn edt1d_weighted(f: &[f64], w: f64) -> Vec<f64> {
    let mut d = vec![0.0; f.len()];
    let mut scratch = Scratch::new(f.len());
    transform(f, w, &mut d, &mut scratch);
    d
}

/// Exact 2D squared distance transform in grid-cell units.
///
/// `field` is row-major with `width` columns; seeds are 0.
#[must_use]
pub fn edt2d(field: &[f64], width: usize, height: usize) -> Vec<f64> {
    edt2d_scaled(field, width, height, 1.0, 1.0)
}

/// Separable 2D squared distance transform with per-axis cell sizes.
///
/// The column pass uses weight `sy²` and the row pass `sx²`, so the result is
/// the squared world distance between cell centers.
#[must_use]
pub fn edt2d_scaled(field: &[f64], width: usize, height: usize, sx: f64, sy: f64) -> Vec<f64> {
    debug_assert_eq!(field.len(), width * height);
    let mut out = field.to_vec();
    if width == 0 || height == 0 {
        return out;
    }

    let mut scratch = Scratch::new(width.max(height));
    let mut line = vec![0.0; height];
    let mut result = vec![0.0; height];
    let wy = sy * sy;
    for i in 0..width {
        for (j, v) in line.iter_mut().enumerate() {
            *v = out[j * width + i];
        }
        transform(&line, wy, &mut result, &mut scratch);
        for (j, v) in result.iter().enumerate() {
            out[j * width + i] = *v;
        }
    }

    let mut line = vec![0.0; width];
    let mut result = vec![0.0; width];
    let wx = sx * sx;
    for row in out.chunks_exact_mut(width) {
        line.copy_from_slice(row);
        transform(&line, wx, &mut result, &mut scratch);
        row.copy_from_slice(&result);
    }
    out
}

/// Envelope bookkeeping reused across lines.
struct Scratch {
    /// Roots of the parabolas on the lower envelope.
    v: Vec<usize>,
    /// Boundaries between envelope parabolas; `z[k]..z[k+1]` belongs to `v[k]`.
    z: Vec<f64>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            v: vec![0; n.max(1)],
            z: vec![0.0; n.max(1) + 1],
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn transform(f: &[f64], w: f64, d: &mut [f64], scratch: &mut Scratch) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let Scratch { v, z } = scratch;

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let qf = q as f64;
        let mut s = intersection(f, w, q, qf, v[k]);
        while k > 0 && s <= z[k] {
            k -= 1;
            s = intersection(f, w, q, qf, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate().take(n) {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k] as f64;
        *out = w * (qf - p) * (qf - p) + f[v[k]];
    }
}

/// Abscissa where the parabolas rooted at `q` and `p` intersect.
#[allow(clippy::cast_precision_loss)]
fn intersection(f: &[f64], w: f64, q: usize, qf: f64, p: usize) -> f64 {
    let pf = p as f64;
    ((f[q] + w * qf * qf) - (f[p] + w * pf * pf)) / (2.0 * w * (qf - pf))
}
