//! Navigation options — the `:set` system.
//!
//! The algorithm's knobs live on [`NavOptions`]. Hosts configure them with
//! Vim-style `:set` directives, parsed here and applied with
//! [`NavOptions::apply`].
//!
//! # Supported syntax
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `option`        | Enable boolean / show value   |
//! | `nooption`      | Disable boolean               |
//! | `option!`       | Toggle boolean                |
//! | `option?`       | Query current value           |
//! | `option=value`  | Assign a value                |
//! | *(empty)*       | Show changed options          |
//! | `all`           | Show all options              |
//!
//! # Option names
//!
//! | Full name      | Abbrev | Type    | Default   |
//! |----------------|--------|---------|-----------|
//! | `strategy`     | `st`   | enum    | `indexed` |
//! | `weight`       | `ow`   | float   | `1`       |
//! | `inclusive`    | `inc`  | bool    | true      |
//! | `preferactive` | `pa`   | bool    | true      |
//! | `maxsteps`     | `ms`   | integer | 64        |

use std::fmt;
use std::str::FromStr;

use crate::error::OptionError;
use crate::geometry::Metric;

/// A parsed `:set` directive.
///
/// Produced by [`parse_set`]. Names are kept as typed; [`NavOptions::apply`]
/// resolves abbreviations and reports unknown names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option`: enable a boolean option.
    On(String),

    /// `nooption`: disable a boolean option.
    Off(String),

    /// `option!`: toggle a boolean option.
    Toggle(String),

    /// `option?`: query the current value.
    Query(String),

    /// `option=value`: assign a value.
    Assign(String, String),

    /// No arguments: show changed options.
    ShowChanged,

    /// `all`: show all options.
    ShowAll,
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How the navigator resolves a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Climb to a container that can move, step its index, dig back down.
    #[default]
    Indexed,
    /// Scan rects inside the nearest container, widening to sibling
    /// containers when nothing is ahead.
    Geometric,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Indexed => "indexed",
            Self::Geometric => "geometric",
        })
    }
}

impl FromStr for Strategy {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indexed" | "index" | "i" => Ok(Self::Indexed),
            "geometric" | "geo" | "g" => Ok(Self::Geometric),
            _ => Err(OptionError::InvalidValue {
                name: "strategy".into(),
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opt {
    Strategy,
    Weight,
    Inclusive,
    PreferActive,
    MaxSteps,
}

impl Opt {
    const ALL: [Self; 5] = [
        Self::Strategy,
        Self::Weight,
        Self::Inclusive,
        Self::PreferActive,
        Self::MaxSteps,
    ];

    fn lookup(name: &str) -> Option<Self> {
        match name {
            "strategy" | "st" => Some(Self::Strategy),
            "weight" | "ow" => Some(Self::Weight),
            "inclusive" | "inc" => Some(Self::Inclusive),
            "preferactive" | "pa" => Some(Self::PreferActive),
            "maxsteps" | "ms" => Some(Self::MaxSteps),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Weight => "weight",
            Self::Inclusive => "inclusive",
            Self::PreferActive => "preferactive",
            Self::MaxSteps => "maxsteps",
        }
    }

    const fn is_bool(self) -> bool {
        matches!(self, Self::Inclusive | Self::PreferActive)
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    Opt::lookup(name).is_some_and(Opt::is_bool)
}

/// Returns `true` if `name` is a known option that takes a value.
#[must_use]
pub fn is_value_option(name: &str) -> bool {
    Opt::lookup(name).is_some_and(|o| !o.is_bool())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a whole directive string into directives.
///
/// Arguments are whitespace separated (`strategy=geometric noinc`). An
/// empty string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `no` prefix only when the rest is a boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // A bare value option shows its value.
    if is_value_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// NavOptions
// ---------------------------------------------------------------------------

/// Tunable behavior of the navigator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavOptions {
    pub strategy: Strategy,
    /// Weight of the cross-axis gap in directional distance.
    pub orthogonal_weight: f64,
    /// Whether rects sharing an edge count as ahead of each other.
    pub inclusive_edges: bool,
    /// Geometric strategy: enter a container at its remembered leaf when
    /// that leaf is a valid candidate.
    pub prefer_active: bool,
    /// Upper bound on nodes visited by any single walk.
    pub max_steps: usize,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Indexed,
            orthogonal_weight: 1.0,
            inclusive_edges: true,
            prefer_active: true,
            max_steps: 64,
        }
    }
}

impl NavOptions {
    /// Classifier parameters derived from these options.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        Metric {
            orthogonal_weight: self.orthogonal_weight,
            inclusive_edges: self.inclusive_edges,
        }
    }

    /// Parse and apply a directive string. Returns the display output of
    /// every query in it.
    ///
    /// # Errors
    ///
    /// Stops at the first directive that fails; earlier ones stay applied.
    pub fn apply_all(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(out) = self.apply(&directive)? {
                shown.push(out);
            }
        }
        Ok(shown)
    }

    /// Apply one directive. Queries return `Some(display)`.
    ///
    /// # Errors
    ///
    /// [`OptionError::UnknownOption`] for names that are not options,
    /// [`OptionError::NotBoolean`] for on/off/toggle on a value option,
    /// [`OptionError::InvalidValue`] when an assigned value does not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::On(name) => self.set_bool(name, |_| true).map(|()| None),
            SetDirective::Off(name) => self.set_bool(name, |_| false).map(|()| None),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v).map(|()| None),
            SetDirective::Query(name) => Ok(Some(self.show(lookup(name)?))),
            SetDirective::Assign(name, value) => self.assign(lookup(name)?, value).map(|()| None),
            SetDirective::ShowChanged => Ok(Some(self.show_changed())),
            SetDirective::ShowAll => Ok(Some(self.show_all())),
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<(), OptionError> {
        let slot = match lookup(name)? {
            Opt::Inclusive => &mut self.inclusive_edges,
            Opt::PreferActive => &mut self.prefer_active,
            _ => return Err(OptionError::NotBoolean(name.to_string())),
        };
        *slot = f(*slot);
        Ok(())
    }

    fn assign(&mut self, opt: Opt, value: &str) -> Result<(), OptionError> {
        let invalid = || OptionError::InvalidValue {
            name: opt.name().to_string(),
            value: value.to_string(),
        };
        match opt {
            Opt::Strategy => self.strategy = value.parse()?,
            Opt::Weight => {
                let w: f64 = value.parse().map_err(|_| invalid())?;
                if !w.is_finite() || w < 0.0 {
                    return Err(invalid());
                }
                self.orthogonal_weight = w;
            }
            Opt::MaxSteps => {
                let n: usize = value.parse().map_err(|_| invalid())?;
                if n == 0 {
                    return Err(invalid());
                }
                self.max_steps = n;
            }
            // Booleans are set with `name` / `noname`, not `name=value`.
            Opt::Inclusive | Opt::PreferActive => return Err(invalid()),
        }
        Ok(())
    }

    fn show(&self, opt: Opt) -> String {
        match opt {
            Opt::Strategy => format!("strategy={}", self.strategy),
            Opt::Weight => format!("weight={}", self.orthogonal_weight),
            Opt::Inclusive => format_bool("inclusive", self.inclusive_edges),
            Opt::PreferActive => format_bool("preferactive", self.prefer_active),
            Opt::MaxSteps => format!("maxsteps={}", self.max_steps),
        }
    }

    /// Options that differ from their defaults, space separated.
    #[must_use]
    pub fn show_changed(&self) -> String {
        let defaults = Self::default();
        Opt::ALL
            .into_iter()
            .filter(|&o| self.show(o) != defaults.show(o))
            .map(|o| self.show(o))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every option with its current value, space separated.
    #[must_use]
    pub fn show_all(&self) -> String {
        Opt::ALL
            .into_iter()
            .map(|o| self.show(o))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn lookup(name: &str) -> Result<Opt, OptionError> {
    Opt::lookup(name).ok_or_else(|| OptionError::UnknownOption(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
