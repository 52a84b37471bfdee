//! Marching squares over the zero level of a sampled field.
//!
//! Samples sit at cell centers; a "block" is the square between four
//! neighboring samples `(i, j)`, `(i+1, j)`, `(i+1, j+1)`, `(i, j+1)`. Values
//! `>= 0` are inside. Output coordinates are fractional cell-center indices.

use crate::math::Point2;

/// An undirected zero-crossing segment inside one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First endpoint, in fractional cell-center indices.
    pub a: Point2,
    /// Second endpoint, in fractional cell-center indices.
    pub b: Point2,
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

use Edge::{Bottom, Left, Right, Top};

/// Edge pairs per case; bit 0 is the lower-left corner, then counter-clockwise.
/// Saddles (5 and 10) are resolved separately.
const CASES: [&[(Edge, Edge)]; 16] = [
    &[],
    &[(Left, Bottom)],
    &[(Bottom, Right)],
    &[(Left, Right)],
    &[(Right, Top)],
    &[],
    &[(Bottom, Top)],
    &[(Left, Top)],
    &[(Top, Left)],
    &[(Bottom, Top)],
    &[],
    &[(Right, Top)],
    &[(Left, Right)],
    &[(Bottom, Right)],
    &[(Left, Bottom)],
    &[],
];

/// Extracts the zero-level segments of a row-major `width × height` field.
///
/// Ambiguous blocks are disambiguated by the mean of their four corners: a
/// non-negative mean joins the two inside corners. Crossings on a shared edge
/// are always interpolated from the same corner, so neighboring blocks
/// produce bit-identical endpoints.
#[must_use]
pub fn marching_squares_zero(values: &[f64], width: usize, height: usize) -> Vec<Segment> {
    debug_assert_eq!(values.len(), width * height);
    let mut segments = Vec::new();
    if width < 2 || height < 2 {
        return segments;
    }

    for j in 0..height - 1 {
        for i in 0..width - 1 {
            let corners = [
                values[j * width + i],
                values[j * width + i + 1],
                values[(j + 1) * width + i + 1],
                values[(j + 1) * width + i],
            ];
            let case = corners
                .iter()
                .enumerate()
                .fold(0usize, |acc, (bit, &v)| acc | (usize::from(v >= 0.0) << bit));

            let saddle: [(Edge, Edge); 2];
            let pairs: &[(Edge, Edge)] = match case {
                5 | 10 => {
                    let joined = corners.iter().sum::<f64>() * 0.25 >= 0.0;
                    saddle = match (case, joined) {
                        (5, true) | (10, false) => [(Bottom, Right), (Top, Left)],
                        _ => [(Left, Bottom), (Right, Top)],
                    };
                    &saddle
                }
                _ => CASES[case],
            };

            for &(e0, e1) in pairs {
                let a = crossing(e0, i, j, &corners);
                let b = crossing(e1, i, j, &corners);
                if a != b {
                    segments.push(Segment { a, b });
                }
            }
        }
    }
    segments
}

/// Zero crossing on one block edge, interpolated from the edge's lower-index
/// corner.
#[allow(clippy::cast_precision_loss)]
fn crossing(edge: Edge, i: usize, j: usize, c: &[f64; 4]) -> Point2 {
    let (x, y) = (i as f64, j as f64);
    match edge {
        Bottom => Point2::new(x + lerp(c[0], c[1]), y),
        Right => Point2::new(x + 1.0, y + lerp(c[1], c[2])),
        Top => Point2::new(x + lerp(c[3], c[2]), y + 1.0),
        Left => Point2::new(x, y + lerp(c[0], c[3])),
    }
}

/// Fraction along `v0 → v1` where the linear interpolant crosses zero.
fn lerp(v0: f64, v1: f64) -> f64 {
    let denom = v0 - v1;
    if denom == 0.0 {
        return 0.5;
    }
    (v0 / denom).clamp(0.0, 1.0)
}
