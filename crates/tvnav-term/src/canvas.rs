// SPDX-License-Identifier: MIT
//
// Canvas — the cell grid the demo paints its focus tree onto.
//
// A flat row-major `Vec<Cell>`. The demo draws every focusable as a
// bordered box with its label inside, and the focused one reversed.
// [`Canvas::render`] turns the whole grid into one ANSI string that
// repaints the screen top to bottom; frames are small enough that
// diffing against the previous one is not worth it.
//
// Wide characters take two columns: the first cell holds the char, the
// second is a continuation (`'\0'`) that rendering skips. Text that
// would split a wide char at the right edge stops before it.

use std::fmt::Write as _;

use bitflags::bitflags;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ─── Cell ───────────────────────────────────────────────────────────────────

bitflags! {
    /// SGR attributes for a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Style: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const REVERSE   = 0b0000_1000;
    }
}

impl Style {
    /// SGR parameter list, reset first so styles never leak between cells.
    fn sgr(self) -> String {
        let mut s = String::from("\x1b[0");
        if self.contains(Self::BOLD) {
            s.push_str(";1");
        }
        if self.contains(Self::DIM) {
            s.push_str(";2");
        }
        if self.contains(Self::UNDERLINE) {
            s.push_str(";4");
        }
        if self.contains(Self::REVERSE) {
            s.push_str(";7");
        }
        s.push('m');
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::empty(),
    };

    const CONTINUATION: char = '\0';

    const fn is_continuation(self) -> bool {
        self.ch == Self::CONTINUATION
    }
}

// ─── Box Drawing ────────────────────────────────────────────────────────────

/// Border glyphs for [`Canvas::draw_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl Border {
    pub const LIGHT: Self = Self {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    pub const HEAVY: Self = Self {
        horizontal: '━',
        vertical: '┃',
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
    };
}

// ─── Canvas ─────────────────────────────────────────────────────────────────

pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Bounds-checked single-cell write. `false` when out of bounds.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Style) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = Cell { ch, style };
        true
    }

    /// Paint `text` starting at `(x, y)`, clipped at `max_x` (exclusive)
    /// and the canvas edge. Returns the columns consumed.
    pub fn text(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let limit = max_x.min(self.width);
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let w = w as u16;
            if col.saturating_add(w) > limit {
                break;
            }
            self.set(col, y, ch, style);
            if w == 2 {
                self.set(col + 1, y, Cell::CONTINUATION, style);
            }
            col += w;
        }
        col - x
    }

    /// Fill a rectangle with spaces in `style`.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, style: Style) {
        for row in y..y.saturating_add(height).min(self.height) {
            for col in x..x.saturating_add(width).min(self.width) {
                self.set(col, row, ' ', style);
            }
        }
    }

    /// A bordered box with `label` centered on its middle row.
    ///
    /// Boxes narrower or shorter than 2 cells have no room for a border
    /// and are skipped. Labels wider than the interior are truncated.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_box(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        label: &str,
        border: Border,
        style: Style,
    ) {
        if width < 2 || height < 2 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;

        for col in x + 1..right {
            self.set(col, y, border.horizontal, style);
            self.set(col, bottom, border.horizontal, style);
        }
        for row in y + 1..bottom {
            self.set(x, row, border.vertical, style);
            self.set(right, row, border.vertical, style);
        }
        self.set(x, y, border.top_left, style);
        self.set(right, y, border.top_right, style);
        self.set(x, bottom, border.bottom_left, style);
        self.set(right, bottom, border.bottom_right, style);

        if height < 3 || width < 3 {
            return;
        }
        self.fill(x + 1, y + 1, width - 2, height - 2, style);
        let interior = width - 2;
        #[allow(clippy::cast_possible_truncation)]
        let label_w = label.width().min(usize::from(interior)) as u16;
        let label_x = x + 1 + (interior - label_w) / 2;
        let label_y = y + (height - 1) / 2;
        self.text(label_x, label_y, label, style, right);
    }

    /// The visible characters of row `y`, continuations dropped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        self.cells[start..start + usize::from(self.width)]
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }

    /// The whole frame as ANSI output: home the cursor, then each row
    /// with style switches only where the style changes.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2);
        let mut current: Option<Style> = None;
        for y in 0..self.height {
            // Rows are 1-based in CUP.
            let _ = write!(out, "\x1b[{};1H", y + 1);
            let start = self.index(0, y);
            for cell in &self.cells[start..start + usize::from(self.width)] {
                if cell.is_continuation() {
                    continue;
                }
                if current != Some(cell.style) {
                    out.push_str(&cell.style.sgr());
                    current = Some(cell.style);
                }
                out.push(cell.ch);
            }
        }
        out.push_str("\x1b[0m");
        out
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Canvas({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
