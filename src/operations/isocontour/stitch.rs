use std::collections::HashMap;

use tracing::debug;

use super::marching::Segment;
use crate::math::Point2;

/// Joins undirected segments into closed loops.
///
/// Endpoints are snapped to a lattice of pitch `tolerance` so that nearly
/// coincident endpoints become the same node. Edges are then walked in input
/// order; each walk follows the first unused edge at every node until it
/// returns to its start node (kept) or runs out of edges (open chain,
/// discarded). Every edge is used at most once, and the walk is additionally
/// capped so malformed input cannot spin.
///
/// Loops are returned without a closing duplicate, in the order their first
/// edge appears in `segments`.
#[must_use]
pub fn stitch_polylines(segments: &[Segment], tolerance: f64) -> Vec<Vec<Point2>> {
    let graph = Graph::build(segments, tolerance);
    let edge_count = graph.edges.len();
    let mut used = vec![false; edge_count];
    let mut loops = Vec::new();
    let mut budget = edge_count.saturating_mul(2) + 16;
    let mut open_chains = 0usize;

    for first in 0..edge_count {
        if used[first] {
            continue;
        }
        used[first] = true;
        let (start, mut current) = graph.edges[first];
        let mut path = vec![graph.nodes[start], graph.nodes[current]];

        let closed = loop {
            if current == start {
                break true;
            }
            if budget == 0 {
                debug!(edges = edge_count, "stitching budget exhausted");
                return loops;
            }
            budget -= 1;

            let next = graph.incident[current]
                .iter()
                .copied()
                .find(|&e| !used[e]);
            let Some(edge) = next else {
                break false;
            };
            used[edge] = true;
            let (a, b) = graph.edges[edge];
            current = if a == current { b } else { a };
            path.push(graph.nodes[current]);
        };

        if closed {
            path.pop();
            if path.len() >= 3 {
                loops.push(path);
            }
        } else {
            open_chains += 1;
        }
    }

    if open_chains > 0 {
        debug!(open_chains, "discarded open chains while stitching");
    }
    loops
}

struct Graph {
    nodes: Vec<Point2>,
    edges: Vec<(usize, usize)>,
    incident: Vec<Vec<usize>>,
}

impl Graph {
    fn build(segments: &[Segment], tolerance: f64) -> Self {
        let pitch = if tolerance > 0.0 { tolerance } else { f64::EPSILON };
        let mut keys: HashMap<(i64, i64), usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut edges = Vec::with_capacity(segments.len());
        let mut incident: Vec<Vec<usize>> = Vec::new();

        let mut node_of = |p: Point2, nodes: &mut Vec<Point2>, incident: &mut Vec<Vec<usize>>| {
            #[allow(clippy::cast_possible_truncation)]
            let key = ((p.x / pitch).round() as i64, (p.y / pitch).round() as i64);
            *keys.entry(key).or_insert_with(|| {
                nodes.push(p);
                incident.push(Vec::new());
                nodes.len() - 1
            })
        };

        for s in segments {
            let a = node_of(s.a, &mut nodes, &mut incident);
            let b = node_of(s.b, &mut nodes, &mut incident);
            if a == b {
                continue;
            }
            let id = edges.len();
            edges.push((a, b));
            incident[a].push(id);
            incident[b].push(id);
        }

        Self {
            nodes,
            edges,
            incident,
        }
    }
}
