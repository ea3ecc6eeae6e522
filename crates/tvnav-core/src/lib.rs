//! # tvnav-core — Focus navigation engine for tvnav
//!
//! Given a focused element and an arrow-key direction, decide which element
//! receives focus next. The engine combines screen geometry with a tree of
//! focus containers that remember their last active child:
//!
//! - **[`geometry`]** — `Rect`, `Direction`, `Orientation`, and the
//!   "is ahead" / "how far" classifier
//! - **[`tree`]** — the `FocusGraph` collaborator trait and the `FocusTree`
//!   arena that implements it
//! - **[`filter`]** — candidates that are geometrically valid for a direction
//! - **[`select`]** — pick the closest candidate, honoring a preferred one
//! - **[`walker`]** — climb out of containers, dig into them, remember the
//!   active child
//! - **[`navigator`]** — the single entry point: source + direction → target
//! - **[`options`]** — `:set`-style configuration of the algorithm
//! - **[`error`]** — structural and option errors
//!
//! Navigation itself never fails: "nothing further in that direction" is
//! `None`, and the host keeps its current focus.

pub mod error;
pub mod filter;
pub mod geometry;
pub mod navigator;
pub mod options;
pub mod select;
pub mod tree;
pub mod walker;

pub use error::{OptionError, TreeError};
pub use geometry::{Direction, Metric, Orientation, Rect};
pub use navigator::{FocusHost, Navigator};
pub use options::{NavOptions, Strategy};
pub use tree::{Behavior, FocusGraph, FocusTree, NodeId, Role};
