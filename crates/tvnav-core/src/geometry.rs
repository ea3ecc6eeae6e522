//! Geometry — rectangles, directions, and the directional classifier.
//!
//! Two questions drive every navigation decision:
//!
//! - **Is B ahead of A?** A strict half-plane test: for `Down`, B must start
//!   at or below A's bottom edge. Touching edges count by default, so two
//!   tiles laid out edge to edge can always reach each other.
//! - **How far is B from A?** The gap along the movement axis
//!   ("tangential"), combined with the gap across it ("orthogonal") when the
//!   two rects do not overlap on the cross axis:
//!
//! ```text
//!   ┌────┐                      ┌────┐
//!   │ A  │  overlap on x:       │ A  │  no overlap on x:
//!   └────┘  distance = dy       └────┘  distance = hypot(dy, w·dx)
//!     ↕ dy                          ↘
//!   ┌────────┐                         ┌────┐
//!   │   B    │                    dx → │ B  │
//!   └────────┘                         └────┘
//! ```
//!
//! The orthogonal weight `w` biases selection toward candidates in the same
//! row or column over diagonal ones. It defaults to 1 (plain Euclidean gap).

use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;

/// An axis-aligned rectangle in screen units.
///
/// Coordinates grow right (`x`) and down (`y`). A rect with zero width or
/// zero height has zero area and is treated as not visible.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// A zero-area rect at the origin.
    pub const EMPTY: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from edges. Inverted edges collapse to zero extent.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    #[inline]
    #[must_use]
    pub const fn left(self) -> f64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn top(self) -> f64 {
        self.y
    }

    #[inline]
    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[inline]
    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Center point `(x, y)`.
    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn area(self) -> f64 {
        self.width * self.height
    }

    /// Zero area: collapsed by layout or hidden.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rect covering both. Empty rects do not contribute.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// The axis along which a container's children are navigable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children stacked top to bottom; moved through with `Up` / `Down`.
    Vertical,
    /// Children laid out left to right; moved through with `Left` / `Right`.
    Horizontal,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        })
    }
}

impl FromStr for Orientation {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" | "v" => Ok(Self::Vertical),
            "horizontal" | "h" => Ok(Self::Horizontal),
            _ => Err(OptionError::InvalidValue {
                name: "orientation".into(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A navigation direction, one per arrow key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in arrow-key order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The container orientation that can satisfy a move in this direction.
    #[must_use]
    pub const fn axis(self) -> Orientation {
        match self {
            Self::Up | Self::Down => Orientation::Vertical,
            Self::Left | Self::Right => Orientation::Horizontal,
        }
    }

    /// Child-index step: `-1` toward the start, `+1` toward the end.
    #[must_use]
    pub const fn offset(self) -> isize {
        match self {
            Self::Up | Self::Left => -1,
            Self::Down | Self::Right => 1,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Map a DOM-style key name (`"ArrowUp"`, ...) to a direction.
    ///
    /// Any other key is not a navigation key and yields `None`.
    #[must_use]
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "k" => Ok(Self::Up),
            "down" | "j" => Ok(Self::Down),
            "left" | "h" => Ok(Self::Left),
            "right" | "l" => Ok(Self::Right),
            _ => Err(OptionError::InvalidValue {
                name: "direction".into(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// Tunable parameters of the directional classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    /// Multiplier on the cross-axis gap for non-overlapping candidates.
    pub orthogonal_weight: f64,
    /// Whether touching edges (`candidate.bottom == source.top`) count as ahead.
    pub inclusive_edges: bool,
}

impl Default for Metric {
    fn default() -> Self {
        Self {
            orthogonal_weight: 1.0,
            inclusive_edges: true,
        }
    }
}

impl Metric {
    /// Whether `candidate` lies entirely ahead of `source` in `direction`.
    #[must_use]
    pub fn is_ahead(&self, source: Rect, candidate: Rect, direction: Direction) -> bool {
        // (edge of the candidate facing the source, edge of the source facing it),
        // normalized so that "ahead" always means `near >= far`.
        let (near, far) = match direction {
            Direction::Up => (source.top(), candidate.bottom()),
            Direction::Down => (candidate.top(), source.bottom()),
            Direction::Left => (source.left(), candidate.right()),
            Direction::Right => (candidate.left(), source.right()),
        };
        if self.inclusive_edges {
            near >= far
        } else {
            near > far
        }
    }

    /// Directional distance from `source` to `candidate`. Never negative.
    #[must_use]
    pub fn distance(&self, source: Rect, candidate: Rect, direction: Direction) -> f64 {
        let (tangential, source_span, candidate_span) = match direction {
            Direction::Up => (
                source.top() - candidate.bottom(),
                (source.left(), source.right()),
                (candidate.left(), candidate.right()),
            ),
            Direction::Down => (
                candidate.top() - source.bottom(),
                (source.left(), source.right()),
                (candidate.left(), candidate.right()),
            ),
            Direction::Left => (
                source.left() - candidate.right(),
                (source.top(), source.bottom()),
                (candidate.top(), candidate.bottom()),
            ),
            Direction::Right => (
                candidate.left() - source.right(),
                (source.top(), source.bottom()),
                (candidate.top(), candidate.bottom()),
            ),
        };
        let tangential = tangential.max(0.0);

        let orthogonal = span_gap(source_span, candidate_span);
        if orthogonal <= 0.0 {
            return tangential;
        }
        tangential.hypot(orthogonal * self.orthogonal_weight)
    }
}

/// Gap between two closed intervals; 0 when they overlap or touch.
fn span_gap(a: (f64, f64), b: (f64, f64)) -> f64 {
    if a.0 > b.1 {
        a.0 - b.1
    } else if b.0 > a.1 {
        b.0 - a.1
    } else {
        0.0
    }
}

/// [`Metric::is_ahead`] with default parameters (inclusive edges).
#[must_use]
pub fn is_ahead(source: Rect, candidate: Rect, direction: Direction) -> bool {
    Metric::default().is_ahead(source, candidate, direction)
}

/// [`Metric::distance`] with default parameters (unweighted).
#[must_use]
pub fn distance(source: Rect, candidate: Rect, direction: Direction) -> f64 {
    Metric::default().distance(source, candidate, direction)
}

/// Euclidean distance between the centers of two rects.
#[must_use]
pub fn center_distance(a: Rect, b: Rect) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    (ax - bx).hypot(ay - by)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
