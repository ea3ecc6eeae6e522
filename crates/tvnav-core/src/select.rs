//! Closest selector — pick one node out of the valid candidates.
//!
//! Two rules, in order:
//!
//! 1. A **preferred** node (the entered container's remembered child) wins
//!    whenever it is among the candidates, however far it is.
//! 2. Otherwise the candidate with the smallest directional
//!    [`distance`](Metric::distance) wins. Equal distances (two tiles both
//!    touching the source, one straight ahead and one at a corner) fall
//!    back to center distance, and after that to candidate order.

use crate::geometry::{Direction, Metric, center_distance};
use crate::tree::{FocusGraph, NodeId};

/// Choose the candidate to move to from `source` in `direction`.
///
/// Ties on directional distance are broken geometrically, by center
/// distance, before candidate order is consulted. A tile straight ahead
/// therefore beats one touching only at a corner even when the corner
/// tile comes first. With a single candidate no distance is computed.
pub fn select_closest<G: FocusGraph + ?Sized>(
    graph: &G,
    source: NodeId,
    candidates: &[NodeId],
    direction: Direction,
    metric: &Metric,
    preferred: Option<NodeId>,
) -> Option<NodeId> {
    match candidates {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }

    if let Some(p) = preferred.filter(|p| candidates.contains(p)) {
        return Some(p);
    }

    let origin = graph.bounds(source);
    min_by_score(candidates, |c| {
        let rect = graph.bounds(c);
        (
            metric.distance(origin, rect, direction),
            center_distance(origin, rect),
        )
    })
}

/// Candidate whose center is nearest to `source`'s center.
///
/// Used when entering a container that enters at the closest leaf rather
/// than at its remembered one.
pub fn select_nearest_center<G: FocusGraph + ?Sized>(
    graph: &G,
    source: NodeId,
    candidates: &[NodeId],
) -> Option<NodeId> {
    let origin = graph.bounds(source);
    min_by_score(candidates, |c| (center_distance(origin, graph.bounds(c)), 0.0))
}

/// First candidate with the lowest score, compared lexicographically.
/// Scores containing NaN never win.
fn min_by_score(candidates: &[NodeId], score: impl Fn(NodeId) -> (f64, f64)) -> Option<NodeId> {
    let mut best: Option<(NodeId, (f64, f64))> = None;
    for &c in candidates {
        let s = score(c);
        if s.0.is_nan() || s.1.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| s < b) {
            best = Some((c, s));
        }
    }
    best.map(|(id, _)| id)
}
