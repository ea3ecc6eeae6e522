//! Candidate filter — which nodes a move in a given direction may land on.

use crate::geometry::{Direction, Metric};
use crate::tree::{FocusGraph, NodeId};

/// Keep the members of `pool` that lie ahead of `source` in `direction`.
///
/// `source` itself and zero-area (collapsed, hidden) nodes are dropped.
/// Output keeps pool order, which later breaks distance ties.
pub fn filter_valid<G: FocusGraph + ?Sized>(
    graph: &G,
    source: NodeId,
    pool: &[NodeId],
    direction: Direction,
    metric: &Metric,
) -> Vec<NodeId> {
    let origin = graph.bounds(source);
    pool.iter()
        .copied()
        .filter(|&candidate| candidate != source)
        .filter(|&candidate| {
            let rect = graph.bounds(candidate);
            !rect.is_empty() && metric.is_ahead(origin, rect, direction)
        })
        .collect()
}
