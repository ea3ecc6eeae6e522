//! Focus navigator — the one call a host makes per arrow key.
//!
//! ```text
//! key → Direction → Navigator::resolve_next_focus(graph, focused, dir)
//!                      │
//!                      ├─ Indexed:   climb → step → closest | dig
//!                      └─ Geometric: scan container → widen to siblings
//!                      │
//!                      └─ mark_active(target)   (only on success)
//! ```
//!
//! The navigator owns no focus state. The host keeps the current focus and
//! passes it in; the tree keeps each container's memory. A failed move
//! leaves both untouched.

use std::collections::HashSet;

use log::{debug, warn};

use crate::filter::filter_valid;
use crate::geometry::Direction;
use crate::options::{NavOptions, Strategy};
use crate::select::{select_closest, select_nearest_center};
use crate::tree::{Behavior, FocusGraph, NodeId};
use crate::walker::{Walker, mark_active};

/// The side of the host that owns "current focus".
pub trait FocusHost {
    /// The node holding focus, if any.
    fn focused(&self) -> Option<NodeId>;

    /// Move input focus to `node`.
    fn set_focus(&mut self, node: NodeId);
}

/// Resolves directional moves over a [`FocusGraph`].
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    options: NavOptions,
}

impl Navigator {
    #[must_use]
    pub const fn new(options: NavOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &NavOptions {
        &self.options
    }

    pub const fn options_mut(&mut self) -> &mut NavOptions {
        &mut self.options
    }

    /// The node focus should move to from `source` in `direction`.
    ///
    /// On success every container from the target up to the root records
    /// the child on the target's path. `None` means "stay put" and changes
    /// nothing.
    pub fn resolve_next_focus<G: FocusGraph + ?Sized>(
        &self,
        graph: &mut G,
        source: NodeId,
        direction: Direction,
    ) -> Option<NodeId> {
        if !graph.contains(source) {
            debug!("focus source {source} is not in the tree");
            return None;
        }
        debug!("moving {direction} from {}", graph.label(source));

        let target = match self.options.strategy {
            Strategy::Indexed => self.resolve_indexed(&*graph, source, direction),
            Strategy::Geometric => self.resolve_geometric(&*graph, source, direction),
        };

        let Some(target) = target else {
            debug!("nothing focusable {direction} of {}", graph.label(source));
            return None;
        };
        debug!(
            "moving from {} to {}",
            graph.label(source),
            graph.label(target)
        );
        mark_active(graph, target, self.options.max_steps);
        Some(target)
    }

    fn resolve_indexed<G: FocusGraph + ?Sized>(
        &self,
        graph: &G,
        source: NodeId,
        direction: Direction,
    ) -> Option<NodeId> {
        let walker = Walker::new(graph, self.options.max_steps);
        let step = walker.climb(source, direction)?;
        let next = *graph.children(step.container).get(step.to)?;

        if graph.is_container(next) && graph.behavior(next) == Behavior::Closest {
            let leaves = walker.visible_leaves(next);
            if let Some(closest) = select_nearest_center(graph, source, &leaves) {
                debug!("{} enters at its closest leaf", graph.label(next));
                return Some(closest);
            }
        }
        walker.dig(next, direction)
    }

    fn resolve_geometric<G: FocusGraph + ?Sized>(
        &self,
        graph: &G,
        source: NodeId,
        direction: Direction,
    ) -> Option<NodeId> {
        let walker = Walker::new(graph, self.options.max_steps);
        let metric = self.options.metric();

        let mut container = if graph.is_container(source) {
            source
        } else {
            graph.parent(source)?
        };
        let mut preferred = None;
        let mut seen = HashSet::new();

        for _ in 0..self.options.max_steps {
            if !seen.insert(container) {
                warn!("revisited {} while scanning", graph.label(container));
                return None;
            }

            let pool = graph.focusable_descendants(container);
            let valid = filter_valid(graph, source, &pool, direction, &metric);
            if !valid.is_empty() {
                return select_closest(graph, source, &valid, direction, &metric, preferred);
            }
            debug!("nothing {direction} inside {}", graph.label(container));

            let parent = graph.parent(container)?;
            let siblings = graph.container_descendants(parent);
            let ahead = filter_valid(graph, container, &siblings, direction, &metric);

            match select_closest(graph, source, &ahead, direction, &metric, None) {
                Some(next) => {
                    debug!("trying container {}", graph.label(next));
                    preferred = if self.options.prefer_active {
                        walker.remembered_leaf(next)
                    } else {
                        None
                    };
                    container = next;
                }
                None => {
                    // No sibling ahead: widen the scan to the whole parent.
                    preferred = None;
                    container = parent;
                }
            }
        }

        warn!("scan gave up after {} steps", self.options.max_steps);
        None
    }

    /// Record a focus change that did not come from navigation (a click, a
    /// tab key). Returns `false` if `node` is not a focusable node in the tree.
    pub fn focus_changed<G: FocusGraph + ?Sized>(&self, graph: &mut G, node: NodeId) -> bool {
        if !graph.is_focusable(node) {
            debug!("ignoring focus change to {node}");
            return false;
        }
        mark_active(graph, node, self.options.max_steps);
        true
    }

    /// Where focus goes when the page first appears: the root's remembered
    /// path, or the first visible focusable when that path is hidden.
    pub fn initial_focus<G: FocusGraph + ?Sized>(&self, graph: &mut G) -> Option<NodeId> {
        let root = graph.root();
        let target = {
            let walker = Walker::new(&*graph, self.options.max_steps);
            walker
                .dig(root, Direction::Down)
                .or_else(|| walker.visible_leaves(root).first().copied())
        }?;
        mark_active(graph, target, self.options.max_steps);
        Some(target)
    }

    /// Check that `current` can still hold focus. If it was removed or
    /// collapsed, pick a new target.
    ///
    /// Returns `current` itself when it is fine, `None` when nothing in the
    /// tree can take focus.
    pub fn recover_focus<G: FocusGraph + ?Sized>(
        &self,
        graph: &mut G,
        current: Option<NodeId>,
    ) -> Option<NodeId> {
        let root = graph.root();
        let target = {
            let walker = Walker::new(&*graph, self.options.max_steps);
            if let Some(node) = current.filter(|&n| graph.contains(n) && walker.is_visible_leaf(n)) {
                return Some(node);
            }
            warn!("lost focus, recapturing");
            walker
                .remembered_leaf(root)
                .filter(|&n| walker.is_visible_leaf(n))
                .or_else(|| walker.visible_leaves(root).first().copied())
        }?;
        mark_active(graph, target, self.options.max_steps);
        Some(target)
    }

    /// Move the host's focus one step in `direction`. Returns the new focus,
    /// or `None` if it stayed where it was (or the host had none).
    pub fn navigate<G, H>(&self, graph: &mut G, host: &mut H, direction: Direction) -> Option<NodeId>
    where
        G: FocusGraph + ?Sized,
        H: FocusHost + ?Sized,
    {
        let source = host.focused()?;
        let target = self.resolve_next_focus(graph, source, direction)?;
        host.set_focus(target);
        Some(target)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
