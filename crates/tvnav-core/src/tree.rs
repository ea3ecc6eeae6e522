//! Focus tree — the nodes navigation walks over.
//!
//! Every element taking part in navigation is a node with a [`Role`]:
//! either a **focusable** leaf the user can act on, or a **container** that
//! groups other nodes along one axis and remembers which child was last
//! active.
//!
//! # Architecture
//!
//! ```text
//! page (vertical)
//! ├── menu (horizontal)
//! │   ├── "page one"      ← focusable
//! │   └── "page two"      ← focusable
//! └── row (horizontal, active_index = 2)
//!     ├── item 1
//!     ├── item 2
//!     └── item 3          ← remembered: re-entering the row lands here
//! ```
//!
//! The engine talks to the tree only through the [`FocusGraph`] trait, so a
//! host can expose its own widget tree directly. [`FocusTree`] is the
//! ready-made implementation: an arena of nodes addressed by [`NodeId`]
//! with parent back-references stored as indices, never as owning pointers.
//!
//! # Bounds
//!
//! Leaves carry their own rect. A container may carry one too; otherwise
//! it reports the union of its descendants' rects, recomputed on every
//! query because layout can change between two key presses.

use std::collections::HashSet;
use std::fmt;

use crate::error::TreeError;
use crate::geometry::{Orientation, Rect};

/// Handle of a node in a focus graph.
///
/// A [`FocusTree`] never reuses the id of a removed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw index. Hosts implementing [`FocusGraph`] over their own
    /// storage mint ids with this.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a container picks its entry point when focus moves into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Resume at the remembered active child.
    #[default]
    Default,
    /// Enter at the leaf geometrically nearest to where focus came from.
    Closest,
}

/// What a node is for navigation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A terminal, user-actionable element.
    Focusable,
    /// A group of nodes navigable along `orientation`.
    Container {
        orientation: Orientation,
        behavior: Behavior,
    },
}

// ---------------------------------------------------------------------------
// FocusGraph
// ---------------------------------------------------------------------------

/// Read access to a focus tree, plus the one piece of state navigation
/// writes: each container's active index.
///
/// Queries on ids that are not (or no longer) in the tree return neutral
/// values (`false`, `None`, an empty slice, [`Rect::EMPTY`]), so a stale id
/// simply finds nothing.
pub trait FocusGraph {
    fn root(&self) -> NodeId;

    /// Whether `id` names a live node.
    fn contains(&self, id: NodeId) -> bool;

    /// Diagnostic name, used in log output.
    fn label(&self, id: NodeId) -> &str;

    fn is_focusable(&self, id: NodeId) -> bool;

    fn is_container(&self, id: NodeId) -> bool;

    /// Orientation of a container; `None` for leaves.
    fn orientation(&self, id: NodeId) -> Option<Orientation>;

    fn behavior(&self, id: NodeId) -> Behavior;

    /// Direct children in visual order.
    fn children(&self, id: NodeId) -> &[NodeId];

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Current on-screen bounds. Must reflect the latest layout.
    fn bounds(&self, id: NodeId) -> Rect;

    /// Stored active index. May be out of range after children changed;
    /// readers clamp it.
    fn active_index(&self, id: NodeId) -> usize;

    fn set_active_index(&mut self, id: NodeId, index: usize);

    // -- Provided traversals -------------------------------------------------

    /// All nodes below `id` in pre-order (document order), excluding `id`.
    ///
    /// A node reached twice (a malformed, cyclic graph) is visited once.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Focusable nodes below `id`, in document order.
    fn focusable_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_focusable(n))
            .collect()
    }

    /// Container nodes below `id`, in document order.
    fn container_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_container(n))
            .collect()
    }

    /// Parent chain from `id`'s parent up to the root. Stops on a cycle.
    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parent(id);
        while let Some(node) = current {
            if !seen.insert(node) {
                break;
            }
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Position of `id` among its parent's children.
    fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }
}

// ---------------------------------------------------------------------------
// FocusTree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Node {
    label: String,
    role: Role,
    /// Explicit bounds. Containers without them report their content's union.
    bounds: Option<Rect>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    active_index: usize,
}

/// Arena-backed focus tree.
///
/// Slots of removed nodes stay empty, so a [`NodeId`] never comes back to
/// life pointing at a different node. Slots are never reused either: a
/// page that keeps removing and re-adding nodes grows the arena by one
/// slot per add, and [`len`](Self::len) counts only the live ones.
#[derive(Debug, Clone)]
pub struct FocusTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl FocusTree {
    /// Create a tree whose root is a container with the given orientation.
    #[must_use]
    pub fn new(label: impl Into<String>, orientation: Orientation) -> Self {
        let root = Node {
            label: label.into(),
            role: Role::Container {
                orientation,
                behavior: Behavior::Default,
            },
            bounds: None,
            children: Vec::new(),
            parent: None,
            active_index: 0,
        };
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    // -- Building --------------------------------------------------------------

    /// Append a container as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `parent` is not live,
    /// [`TreeError::LeafParent`] if it is a focusable leaf.
    pub fn add_container(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        orientation: Orientation,
    ) -> Result<NodeId, TreeError> {
        self.insert(
            parent,
            label.into(),
            Role::Container {
                orientation,
                behavior: Behavior::Default,
            },
            None,
        )
    }

    /// Append a focusable leaf with the given bounds as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`add_container`](Self::add_container).
    pub fn add_focusable(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        bounds: Rect,
    ) -> Result<NodeId, TreeError> {
        self.insert(parent, label.into(), Role::Focusable, Some(bounds))
    }

    fn insert(
        &mut self,
        parent: NodeId,
        label: String,
        role: Role,
        bounds: Option<Rect>,
    ) -> Result<NodeId, TreeError> {
        self.check_parent(parent)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            label,
            role,
            bounds,
            children: Vec::new(),
            parent: Some(parent),
            active_index: 0,
        }));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn check_parent(&self, parent: NodeId) -> Result<(), TreeError> {
        match self.node(parent) {
            None => Err(TreeError::UnknownNode(parent)),
            Some(n) if n.role == Role::Focusable => Err(TreeError::LeafParent(parent)),
            Some(_) => Ok(()),
        }
    }

    // -- Mutation ----------------------------------------------------------------

    /// Replace the bounds of a node (a re-layout). `None` on a container
    /// switches it back to reporting its content's union.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` is not live.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<Rect>) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.bounds = match node.role {
            // A leaf without bounds is a collapsed leaf.
            Role::Focusable => Some(bounds.unwrap_or(Rect::EMPTY)),
            Role::Container { .. } => bounds,
        };
        Ok(())
    }

    /// Change a container's entry behavior. Ignored on leaves.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` is not live.
    pub fn set_behavior(&mut self, id: NodeId, behavior: Behavior) -> Result<(), TreeError> {
        if let Role::Container { behavior: b, .. } = &mut self.node_mut(id)?.role {
            *b = behavior;
        }
        Ok(())
    }

    /// Change a container's orientation. Ignored on leaves.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` is not live.
    pub fn set_orientation(
        &mut self,
        id: NodeId,
        orientation: Orientation,
    ) -> Result<(), TreeError> {
        if let Role::Container { orientation: o, .. } = &mut self.node_mut(id)?.role {
            *o = orientation;
        }
        Ok(())
    }

    /// Detach `id` and drop its whole subtree. Returns the number of nodes removed.
    ///
    /// The parent's active index is left as is; readers clamp it.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` is not live,
    /// [`TreeError::RootRemoval`] for the root.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        let parent = self.node(id).ok_or(TreeError::UnknownNode(id))?.parent;

        let mut doomed = self.descendants(id);
        doomed.push(id);

        if let Some(p) = parent.and_then(|p| self.node_mut(p).ok()) {
            p.children.retain(|&c| c != id);
        }
        for n in &doomed {
            self.nodes[n.0] = None;
        }
        Ok(doomed.len())
    }

    /// Re-parent `id` as the last child of `new_parent`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] / [`TreeError::LeafParent`] as for
    /// insertion, [`TreeError::RootRemoval`] when moving the root, and
    /// [`TreeError::Cycle`] when `new_parent` is `id` or one of its
    /// descendants.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownNode(id));
        }
        self.check_parent(new_parent)?;
        if new_parent == id || self.ancestors(new_parent).contains(&id) {
            return Err(TreeError::Cycle {
                node: id,
                parent: new_parent,
            });
        }

        if let Some(old) = self.parent(id) {
            self.node_mut(old)?.children.retain(|&c| c != id);
        }
        self.node_mut(new_parent)?.children.push(id);
        self.node_mut(id)?.parent = Some(new_parent);
        Ok(())
    }

    // -- Queries ----------------------------------------------------------------

    /// First node in document order whose label equals `label`.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<NodeId> {
        if self.label(self.root) == label {
            return Some(self.root);
        }
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.label(n) == label)
    }

    #[must_use]
    pub fn role(&self, id: NodeId) -> Option<Role> {
        self.node(id).map(|n| n.role)
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// A tree always has its root, so this is never `true`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }
}

impl FocusGraph for FocusTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn label(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.label.as_str())
    }

    fn is_focusable(&self, id: NodeId) -> bool {
        matches!(self.role(id), Some(Role::Focusable))
    }

    fn is_container(&self, id: NodeId) -> bool {
        matches!(self.role(id), Some(Role::Container { .. }))
    }

    fn orientation(&self, id: NodeId) -> Option<Orientation> {
        match self.role(id)? {
            Role::Container { orientation, .. } => Some(orientation),
            Role::Focusable => None,
        }
    }

    fn behavior(&self, id: NodeId) -> Behavior {
        match self.role(id) {
            Some(Role::Container { behavior, .. }) => behavior,
            _ => Behavior::Default,
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    fn bounds(&self, id: NodeId) -> Rect {
        let Some(node) = self.node(id) else {
            return Rect::EMPTY;
        };
        if let Some(rect) = node.bounds {
            return rect;
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.node(n).and_then(|n| n.bounds))
            .fold(Rect::EMPTY, Rect::union)
    }

    fn active_index(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.active_index)
    }

    fn set_active_index(&mut self, id: NodeId, index: usize) {
        if let Ok(node) = self.node_mut(id) {
            node.active_index = index;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
