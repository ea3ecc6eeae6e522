//! Container tree walker — climb out of containers, dig into them.
//!
//! Moving focus by index works in two phases:
//!
//! ```text
//!            page (vertical)                 ↓ pressed on "a2"
//!           /              \
//!     row A (horizontal)   row B (horizontal, active = 1)
//!     a1  [a2]  a3          b1   b2   b3
//!
//!  climb: a2 → row A (horizontal, can't go down) → page (vertical, 0 → 1) ✓
//!  dig:   row B → child at active index 1 → "b2"
//! ```
//!
//! **Climb** walks up from the focused node until it finds a container that
//! runs along the direction of travel and still has a sibling to move to.
//! **Dig** walks down from the sibling it picked, following each
//! container's remembered active child, until it reaches a visible leaf.
//!
//! Both walks are loops, not recursion, and stop after `max_steps` nodes or
//! on the first node seen twice. A well-formed tree never hits either bound;
//! a malformed [`FocusGraph`] gets a warning and "no target".

use std::collections::HashSet;

use log::{debug, warn};

use crate::geometry::Direction;
use crate::tree::{FocusGraph, NodeId};

/// A container climbing stopped at, and the move it can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub container: NodeId,
    /// Index of the child focus is leaving.
    pub from: usize,
    /// Index of the child focus moves into. Always in range and `!= from`.
    pub to: usize,
}

/// Clamp a stored active index into `[0, len - 1]`. `None` when there are
/// no children.
#[must_use]
pub const fn clamp_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else if index >= len {
        Some(len - 1)
    } else {
        Some(index)
    }
}

/// `index + offset` if it stays inside `0..len`.
fn offset_index(index: usize, offset: isize, len: usize) -> Option<usize> {
    index.checked_add_signed(offset).filter(|&i| i < len)
}

/// Read-only walks over a focus graph.
pub struct Walker<'g, G: FocusGraph + ?Sized> {
    graph: &'g G,
    max_steps: usize,
}

impl<'g, G: FocusGraph + ?Sized> Walker<'g, G> {
    #[must_use]
    pub const fn new(graph: &'g G, max_steps: usize) -> Self {
        Self { graph, max_steps }
    }

    /// A focusable leaf with a non-empty rect.
    #[must_use]
    pub fn is_visible_leaf(&self, node: NodeId) -> bool {
        self.graph.is_focusable(node) && !self.graph.bounds(node).is_empty()
    }

    /// Whether `node` is, or contains, a visible focusable leaf.
    #[must_use]
    pub fn has_visible_focusable(&self, node: NodeId) -> bool {
        self.is_visible_leaf(node)
            || self
                .graph
                .descendants(node)
                .into_iter()
                .any(|n| self.is_visible_leaf(n))
    }

    /// Visible focusable leaves below `node`, in document order.
    #[must_use]
    pub fn visible_leaves(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .focusable_descendants(node)
            .into_iter()
            .filter(|&n| self.is_visible_leaf(n))
            .collect()
    }

    /// The child a move in `direction` would select inside `container`:
    /// the one at `active + offset`, or the active child itself when that
    /// would leave the container.
    #[must_use]
    pub fn next_child(&self, container: NodeId, direction: Direction) -> Option<NodeId> {
        let children = self.graph.children(container);
        let active = clamp_index(self.graph.active_index(container), children.len())?;
        let next = offset_index(active, direction.offset(), children.len()).unwrap_or(active);
        Some(children[next])
    }

    /// Follow active indices from `node` down to a leaf, never sideways.
    ///
    /// This is the leaf a container "remembers". `None` if the path ends in
    /// an empty container.
    #[must_use]
    pub fn remembered_leaf(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        let mut seen = HashSet::new();
        for _ in 0..self.max_steps {
            if !seen.insert(current) {
                warn!("cycle at {} while following active children", self.graph.label(current));
                return None;
            }
            if self.graph.is_focusable(current) {
                return Some(current);
            }
            let children = self.graph.children(current);
            let active = clamp_index(self.graph.active_index(current), children.len())?;
            current = children[active];
        }
        warn!("gave up following active children after {} steps", self.max_steps);
        None
    }

    /// Walk up from `node` to the first container that can move focus in
    /// `direction`.
    ///
    /// Leaves, containers with nothing visible to focus, containers laid
    /// out along the other axis, and containers already at their first or
    /// last child are passed through. `None` means focus is at the edge of
    /// the layout.
    #[must_use]
    pub fn climb(&self, node: NodeId, direction: Direction) -> Option<Step> {
        let g = self.graph;
        let mut current = node;
        // Index of the child the ascent came through.
        let mut through: Option<usize> = None;
        let mut seen = HashSet::new();

        for _ in 0..self.max_steps {
            if !seen.insert(current) {
                warn!("cycle at {} while climbing", g.label(current));
                return None;
            }
            debug!("climbing from {}", g.label(current));

            let stop = if g.is_focusable(current) {
                debug!("{} is a leaf", g.label(current));
                None
            } else if !self.has_visible_focusable(current) {
                debug!("{} has no visible focusable children", g.label(current));
                None
            } else if g.orientation(current) != Some(direction.axis()) {
                debug!(
                    "{} is {:?}, moving {direction}",
                    g.label(current),
                    g.orientation(current)
                );
                None
            } else {
                let len = g.children(current).len();
                let from = match through {
                    Some(i) => Some(i),
                    None => clamp_index(g.active_index(current), len),
                };
                match from.and_then(|f| offset_index(f, direction.offset(), len).map(|t| (f, t))) {
                    Some((from, to)) => Some(Step {
                        container: current,
                        from,
                        to,
                    }),
                    None => {
                        debug!("no sibling {direction} inside {}", g.label(current));
                        None
                    }
                }
            };

            if let Some(step) = stop {
                debug!(
                    "climbed to {}, moving {} -> {}",
                    g.label(step.container),
                    step.from,
                    step.to
                );
                return Some(step);
            }

            through = g.index_in_parent(current);
            match g.parent(current) {
                Some(parent) => current = parent,
                None => {
                    debug!("reached the root, nothing further {direction}");
                    return None;
                }
            }
        }

        warn!("climb gave up after {} steps", self.max_steps);
        None
    }

    /// Walk down from `node` to the leaf that should receive focus.
    ///
    /// Containers are entered at their active child, or at the visible
    /// child nearest to it when the active one is hidden. A starting node
    /// with nothing visible to focus is replaced by its next sibling in
    /// `direction`; running out of siblings yields `None`.
    #[must_use]
    pub fn dig(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        let g = self.graph;
        let mut current = node;
        let mut seen = HashSet::new();

        for _ in 0..self.max_steps {
            if !seen.insert(current) {
                warn!("cycle at {} while digging", g.label(current));
                return None;
            }
            debug!("digging from {}", g.label(current));

            if self.is_visible_leaf(current) {
                return Some(current);
            }

            if !self.has_visible_focusable(current) {
                debug!("{} has no visible focusable children", g.label(current));
                let parent = g.parent(current)?;
                let siblings = g.children(parent);
                let index = g.index_in_parent(current)?;
                let next = offset_index(index, direction.offset(), siblings.len()).unwrap_or(index);
                if next == index {
                    debug!("no sibling {direction} of {}", g.label(current));
                    return None;
                }
                current = siblings[next];
                continue;
            }

            let children = g.children(current);
            let active = clamp_index(g.active_index(current), children.len())?;
            current = if self.has_visible_focusable(children[active]) {
                children[active]
            } else {
                debug!("active child of {} is hidden", g.label(current));
                self.nearest_visible_child(children, active)?
            };
        }

        warn!("dig gave up after {} steps", self.max_steps);
        None
    }

    /// The child closest in index to `active` that can take focus. Lower
    /// indices win ties.
    fn nearest_visible_child(&self, children: &[NodeId], active: usize) -> Option<NodeId> {
        (1..children.len()).find_map(|d| {
            [active.checked_sub(d), active.checked_add(d)]
                .into_iter()
                .flatten()
                .filter_map(|i| children.get(i).copied())
                .find(|&c| self.has_visible_focusable(c))
        })
    }
}

/// Record `leaf` as the active path: every ancestor's active index is set
/// to the child leading down to it.
pub fn mark_active<G: FocusGraph + ?Sized>(graph: &mut G, leaf: NodeId, max_steps: usize) {
    let mut child = leaf;
    let mut seen = HashSet::from([leaf]);
    for _ in 0..max_steps {
        let Some(parent) = graph.parent(child) else {
            return;
        };
        let Some(index) = graph.index_in_parent(child) else {
            return;
        };
        if !seen.insert(parent) {
            warn!("cycle at {} while marking the active path", graph.label(parent));
            return;
        }
        debug!("setting {} active index to {index}", graph.label(parent));
        graph.set_active_index(parent, index);
        child = parent;
    }
    warn!("marking the active path gave up after {max_steps} steps");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Orientation, Rect};
    use crate::tree::{Behavior, FocusTree};
    use pretty_assertions::assert_eq;

    const STEPS: usize = 64;

    fn tile(col: u8, row: u8) -> Rect {
        Rect::new(f64::from(col) * 100.0, f64::from(row) * 100.0, 100.0, 100.0)
    }

    /// page(v) → [rowA(h) → a0 a1 a2, rowB(h) → b0 b1 b2]
    fn two_rows() -> (FocusTree, NodeId, [NodeId; 3], [NodeId; 3]) {
        let mut t = FocusTree::new("page", Orientation::Vertical);
        let page = t.root();
        let row_a = t.add_container(page, "rowA", Orientation::Horizontal).unwrap();
        let row_b = t.add_container(page, "rowB", Orientation::Horizontal).unwrap();
        let mut a = [page; 3];
        let mut b = [page; 3];
        for i in 0..3_u8 {
            a[usize::from(i)] = t.add_focusable(row_a, format!("a{i}"), tile(i, 0)).unwrap();
            b[usize::from(i)] = t.add_focusable(row_b, format!("b{i}"), tile(i, 1)).unwrap();
        }
        (t, page, a, b)
    }

    // ── Index helpers ────────────────────────────────────────────────────

    #[test]
    fn clamp_index_bounds() {
        assert_eq!(clamp_index(0, 0), None);
        assert_eq!(clamp_index(5, 3), Some(2));
        assert_eq!(clamp_index(1, 3), Some(1));
    }

    #[test]
    fn next_child_steps_and_clamps() {
        let (mut t, _, a, _) = two_rows();
        let row_a = t.parent(a[0]).unwrap();
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.next_child(row_a, Direction::Right), Some(a[1]));
        assert_eq!(w.next_child(row_a, Direction::Left), Some(a[0]));

        t.set_active_index(row_a, 9);
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.next_child(row_a, Direction::Right), Some(a[2]));
        assert_eq!(w.next_child(row_a, Direction::Left), Some(a[1]));
    }

    #[test]
    fn next_child_of_empty_container_is_none() {
        let mut t = FocusTree::new("root", Orientation::Vertical);
        let empty = t.add_container(t.root(), "empty", Orientation::Vertical).unwrap();
        assert_eq!(Walker::new(&t, STEPS).next_child(empty, Direction::Down), None);
    }

    // ── Visibility ───────────────────────────────────────────────────────

    #[test]
    fn visibility_follows_area() {
        let (mut t, page, a, _) = two_rows();
        let row_a = t.parent(a[0]).unwrap();
        for id in a {
            t.set_bounds(id, Some(Rect::EMPTY)).unwrap();
        }
        let w = Walker::new(&t, STEPS);
        assert!(!w.is_visible_leaf(a[0]));
        assert!(!w.has_visible_focusable(row_a));
        assert!(w.has_visible_focusable(page));
        assert_eq!(w.visible_leaves(page).len(), 3);
    }

    // ── Climb ────────────────────────────────────────────────────────────

    #[test]
    fn climb_within_row() {
        let (t, _, a, _) = two_rows();
        let row_a = t.parent(a[0]).unwrap();
        let step = Walker::new(&t, STEPS).climb(a[0], Direction::Right);
        assert_eq!(
            step,
            Some(Step {
                container: row_a,
                from: 0,
                to: 1
            })
        );
    }

    #[test]
    fn climb_skips_mismatched_orientation() {
        let (t, page, a, _) = two_rows();
        let step = Walker::new(&t, STEPS).climb(a[1], Direction::Down);
        assert_eq!(
            step,
            Some(Step {
                container: page,
                from: 0,
                to: 1
            })
        );
    }

    #[test]
    fn climb_at_edge_is_none() {
        let (t, _, a, b) = two_rows();
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.climb(a[0], Direction::Up), None);
        assert_eq!(w.climb(a[0], Direction::Left), None);
        assert_eq!(w.climb(b[2], Direction::Right), None);
        assert_eq!(w.climb(b[2], Direction::Down), None);
    }

    #[test]
    fn climb_uses_path_not_stale_memory() {
        let (mut t, _, a, _) = two_rows();
        let row_a = t.parent(a[0]).unwrap();
        // Memory says a0 is active, but focus is on a2.
        t.set_active_index(row_a, 0);
        assert_eq!(Walker::new(&t, STEPS).climb(a[2], Direction::Right), None);
    }

    #[test]
    fn climb_from_container_uses_active_index() {
        let (mut t, _, a, _) = two_rows();
        let row_a = t.parent(a[0]).unwrap();
        t.set_active_index(row_a, 1);
        let step = Walker::new(&t, STEPS).climb(row_a, Direction::Right).unwrap();
        assert_eq!((step.from, step.to), (1, 2));
    }

    #[test]
    fn climb_skips_container_without_visible_focusables() {
        let mut t = FocusTree::new("page", Orientation::Horizontal);
        let page = t.root();
        let left = t.add_focusable(page, "left", tile(0, 0)).unwrap();
        let hidden = t.add_container(page, "hidden", Orientation::Horizontal).unwrap();
        let ghost = t.add_focusable(hidden, "ghost", Rect::EMPTY).unwrap();
        t.add_focusable(hidden, "ghost2", Rect::EMPTY).unwrap();
        // Starting on an invisible leaf: its row has nothing visible, so the
        // walk goes up to page and moves from index 1.
        let step = Walker::new(&t, STEPS).climb(ghost, Direction::Left).unwrap();
        assert_eq!(step.container, page);
        assert_eq!((step.from, step.to), (1, 0));
        assert_eq!(t.children(page)[step.to], left);
    }

    // ── Dig ──────────────────────────────────────────────────────────────

    #[test]
    fn dig_follows_active_index() {
        let (mut t, _, _, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        t.set_active_index(row_b, 2);
        assert_eq!(Walker::new(&t, STEPS).dig(row_b, Direction::Down), Some(b[2]));
    }

    #[test]
    fn dig_clamps_stale_active_index() {
        let (mut t, _, _, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        t.set_active_index(row_b, 40);
        assert_eq!(Walker::new(&t, STEPS).dig(row_b, Direction::Down), Some(b[2]));
    }

    #[test]
    fn dig_leaf_returns_itself() {
        let (t, _, a, _) = two_rows();
        assert_eq!(Walker::new(&t, STEPS).dig(a[1], Direction::Up), Some(a[1]));
    }

    #[test]
    fn dig_skips_empty_sibling_in_direction() {
        let mut t = FocusTree::new("page", Orientation::Vertical);
        let page = t.root();
        let empty = t.add_container(page, "empty", Orientation::Horizontal).unwrap();
        let full = t.add_container(page, "full", Orientation::Horizontal).unwrap();
        let item = t.add_focusable(full, "item", tile(0, 1)).unwrap();
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.dig(empty, Direction::Down), Some(item));
        // Going up from the empty one there is nothing before it.
        assert_eq!(w.dig(empty, Direction::Up), None);
    }

    #[test]
    fn dig_skips_collapsed_leaf() {
        let mut t = FocusTree::new("row", Orientation::Horizontal);
        let row = t.root();
        let collapsed = t.add_focusable(row, "collapsed", Rect::EMPTY).unwrap();
        let shown = t.add_focusable(row, "shown", tile(1, 0)).unwrap();
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.dig(row, Direction::Right), Some(shown));
        assert_eq!(w.dig(collapsed, Direction::Left), None);
    }

    #[test]
    fn dig_past_hidden_active_child_takes_nearest_visible() {
        let (mut t, _, _, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        t.set_bounds(b[1], Some(Rect::EMPTY)).unwrap();
        t.set_bounds(b[2], Some(Rect::EMPTY)).unwrap();
        t.set_active_index(row_b, 2);
        let w = Walker::new(&t, STEPS);
        assert_eq!(w.dig(row_b, Direction::Down), Some(b[0]));
        assert_eq!(w.dig(row_b, Direction::Right), Some(b[0]));
    }

    #[test]
    fn dig_hidden_active_child_prefers_lower_index_on_tie() {
        let (mut t, _, _, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        t.set_bounds(b[1], Some(Rect::EMPTY)).unwrap();
        t.set_active_index(row_b, 1);
        assert_eq!(Walker::new(&t, STEPS).dig(row_b, Direction::Right), Some(b[0]));
    }

    #[test]
    fn dig_into_empty_root_is_none() {
        let t = FocusTree::new("root", Orientation::Vertical);
        assert_eq!(Walker::new(&t, STEPS).dig(t.root(), Direction::Down), None);
    }

    // ── Remembered leaf ──────────────────────────────────────────────────

    #[test]
    fn remembered_leaf_follows_memory() {
        let (mut t, page, _, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        t.set_active_index(page, 1);
        t.set_active_index(row_b, 1);
        assert_eq!(Walker::new(&t, STEPS).remembered_leaf(page), Some(b[1]));
    }

    #[test]
    fn remembered_leaf_of_empty_is_none() {
        let t = FocusTree::new("root", Orientation::Vertical);
        assert_eq!(Walker::new(&t, STEPS).remembered_leaf(t.root()), None);
    }

    // ── mark_active ──────────────────────────────────────────────────────

    #[test]
    fn mark_active_sets_whole_path() {
        let (mut t, page, a, b) = two_rows();
        let row_b = t.parent(b[0]).unwrap();
        mark_active(&mut t, b[2], STEPS);
        assert_eq!(t.active_index(row_b), 2);
        assert_eq!(t.active_index(page), 1);

        mark_active(&mut t, a[1], STEPS);
        assert_eq!(t.active_index(page), 0);
        // Row B keeps its memory.
        assert_eq!(t.active_index(row_b), 2);
    }

    // ── Malformed graphs ─────────────────────────────────────────────────

    /// Containers 1 and 2 claim each other as parent; 3 is a visible leaf
    /// under 2. Node 0 is an unrelated root.
    struct Loop {
        active: [usize; 4],
    }

    static N: [NodeId; 4] = [NodeId::new(0), NodeId::new(1), NodeId::new(2), NodeId::new(3)];
    static ONE_KIDS: [NodeId; 1] = [NodeId::new(2)];
    static TWO_KIDS: [NodeId; 2] = [NodeId::new(1), NodeId::new(3)];

    impl FocusGraph for Loop {
        fn root(&self) -> NodeId {
            N[0]
        }
        fn contains(&self, id: NodeId) -> bool {
            id.index() < 4
        }
        fn label(&self, id: NodeId) -> &str {
            ["root", "one", "two", "leaf"][id.index()]
        }
        fn is_focusable(&self, id: NodeId) -> bool {
            id == N[3]
        }
        fn is_container(&self, id: NodeId) -> bool {
            id != N[3]
        }
        fn orientation(&self, id: NodeId) -> Option<Orientation> {
            match id.index() {
                0 | 2 => Some(Orientation::Vertical),
                1 => Some(Orientation::Horizontal),
                _ => None,
            }
        }
        fn behavior(&self, _: NodeId) -> Behavior {
            Behavior::Default
        }
        fn children(&self, id: NodeId) -> &[NodeId] {
            match id.index() {
                1 => &ONE_KIDS[..],
                2 => &TWO_KIDS[..],
                _ => &[],
            }
        }
        fn parent(&self, id: NodeId) -> Option<NodeId> {
            match id.index() {
                1 | 3 => Some(N[2]),
                2 => Some(N[1]),
                _ => None,
            }
        }
        fn bounds(&self, id: NodeId) -> Rect {
            if id == N[3] {
                tile(0, 0)
            } else {
                Rect::EMPTY
            }
        }
        fn active_index(&self, id: NodeId) -> usize {
            self.active[id.index()]
        }
        fn set_active_index(&mut self, id: NodeId, index: usize) {
            self.active[id.index()] = index;
        }
    }

    #[test]
    fn cycles_end_walks() {
        let mut g = Loop { active: [0; 4] };
        let w = Walker::new(&g, STEPS);
        assert_eq!(w.climb(N[3], Direction::Down), None);
        assert_eq!(w.dig(N[1], Direction::Down), None);
        assert_eq!(w.remembered_leaf(N[1]), None);

        mark_active(&mut g, N[3], STEPS);
        assert_eq!(g.active[2], 1);
        assert_eq!(g.active[1], 0);
    }

    #[test]
    fn step_bound_ends_deep_walks() {
        // A chain deeper than the step bound.
        let mut t = FocusTree::new("c0", Orientation::Horizontal);
        let mut parent = t.root();
        for i in 1..10 {
            parent = t
                .add_container(parent, format!("c{i}"), Orientation::Horizontal)
                .unwrap();
        }
        let leaf = t.add_focusable(parent, "leaf", tile(0, 0)).unwrap();
        let w = Walker::new(&t, 4);
        assert_eq!(w.dig(t.root(), Direction::Down), None);
        assert_eq!(w.remembered_leaf(t.root()), None);
        assert_eq!(w.climb(leaf, Direction::Right), None);

        let w = Walker::new(&t, STEPS);
        assert_eq!(w.dig(t.root(), Direction::Down), Some(leaf));
    }
}
