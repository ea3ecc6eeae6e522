// SPDX-License-Identifier: MIT
//
// tvnav — a terminal stand-in for a television home screen.
//
// The binary wires the two crates together:
//
//   tvnav-core → focus tree, navigator, `:set` options
//   tvnav-term → raw mode, key decoding, box canvas, event loop
//
// The page is the usual TV layout: a menu bar across the top, a column
// of horizontal rows of tiles, and a "closest" grid on the right that is
// entered at whichever tile is nearest to where focus comes from. Each
// arrow key goes through `Navigator::navigate`; everything else is the
// host's business (Tab order, the command line, quitting).
//
//   ┌──────────────────────────────────────────────────────┐
//   │ status bar (REVERSE)                                 │
//   │ [Home] [Movies] [Settings]                           │
//   │ [1.1] [1.2] [1.3] [1.4] [1.5]           │ closest    │
//   │ [2.1] [2.2] [2.3]                       │ [N1] [N2]  │
//   │ [3.1] ... [3.6]  (3.7, 3.8 off screen)  │ [N3] [N4]  │
//   │ [4.1] [4.2]                             │ [N5] [N6]  │
//   │ [5.1]                                   │            │
//   │ help / command line                                  │
//   └──────────────────────────────────────────────────────┘
//
// Tiles that do not fit the terminal get zero-size bounds, which the
// navigator treats as invisible. `--keys` runs the same page without a
// terminal and prints where focus lands after each key.

use std::env;
use std::fs::File;
use std::process;

use log::{LevelFilter, debug, info};

use tvnav_core::walker::Walker;
use tvnav_core::{
    Behavior, Direction, FocusGraph, FocusHost, FocusTree, NavOptions, Navigator, NodeId,
    Orientation, Rect, Strategy, TreeError,
};
use tvnav_term::canvas::{Border, Canvas, Style};
use tvnav_term::host::{Action, App, EventLoop, dispatch};
use tvnav_term::keys::{Key, KeyCode, Modifiers};
use tvnav_term::screen::Size;

// ─── Page ───────────────────────────────────────────────────────────────────

/// Tiles per row of the main column.
const ROW_LENGTHS: [usize; 5] = [5, 3, 8, 2, 1];
const MENU_LINKS: [&str; 3] = ["Home", "Movies", "Settings"];
const SIDE_ROWS: usize = 3;
const SIDE_COLS: usize = 2;

const TILE_W: u16 = 12;
const TILE_H: u16 = 3;
const GAP_X: u16 = 2;
const GAP_Y: u16 = 1;
const MENU_Y: u16 = 1;
const ROWS_Y: u16 = 5;
/// Width of the side panel including its left rule.
#[allow(clippy::cast_possible_truncation)]
const SIDE_W: u16 = 1 + SIDE_COLS as u16 * (TILE_W + GAP_X);
/// Narrower terminals drop the side panel.
const SIDE_MIN_COLS: u16 = 60;

/// Node ids of the demo page, grouped the way they are laid out.
struct Page {
    menu: Vec<NodeId>,
    rows: Vec<Vec<NodeId>>,
    side: NodeId,
    side_rows: Vec<Vec<NodeId>>,
}

/// Build the focus tree of the demo page.
///
/// ```text
/// page (vertical)
/// ├── menu (horizontal): Home, Movies, Settings
/// └── body (horizontal)
///     ├── rows (vertical): row 1..5 (horizontal), 5/3/8/2/1 tiles
///     └── closest (vertical, closest): 3 rows × 2 tiles
/// ```
fn build_page() -> Result<(FocusTree, Page), TreeError> {
    let mut tree = FocusTree::new("page", Orientation::Vertical);
    let root = tree.root();

    let menu_id = tree.add_container(root, "menu", Orientation::Horizontal)?;
    let menu = MENU_LINKS
        .iter()
        .map(|&name| tree.add_focusable(menu_id, name, Rect::EMPTY))
        .collect::<Result<Vec<_>, _>>()?;

    let body = tree.add_container(root, "body", Orientation::Horizontal)?;
    let column = tree.add_container(body, "rows", Orientation::Vertical)?;
    let mut rows = Vec::with_capacity(ROW_LENGTHS.len());
    for (r, &len) in ROW_LENGTHS.iter().enumerate() {
        let row = tree.add_container(column, format!("row {}", r + 1), Orientation::Horizontal)?;
        let tiles = (0..len)
            .map(|i| tree.add_focusable(row, format!("Tile {}.{}", r + 1, i + 1), Rect::EMPTY))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(tiles);
    }

    let side = tree.add_container(body, "closest", Orientation::Vertical)?;
    tree.set_behavior(side, Behavior::Closest)?;
    let mut side_rows = Vec::with_capacity(SIDE_ROWS);
    for r in 0..SIDE_ROWS {
        let row = tree.add_container(side, format!("closest {}", r + 1), Orientation::Horizontal)?;
        let tiles = (0..SIDE_COLS)
            .map(|c| tree.add_focusable(row, format!("Near {}", r * SIDE_COLS + c + 1), Rect::EMPTY))
            .collect::<Result<Vec<_>, _>>()?;
        side_rows.push(tiles);
    }

    Ok((
        tree,
        Page {
            menu,
            rows,
            side,
            side_rows,
        },
    ))
}

// ─── Layout ─────────────────────────────────────────────────────────────────

/// A tile that fits on screen, in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placed {
    id: NodeId,
    x: u16,
    y: u16,
}

/// Where the tiles go for this terminal size.
struct Layout {
    placed: Vec<Placed>,
    /// Left rule of the side panel, when it is shown.
    side_x: Option<u16>,
}

#[allow(clippy::cast_possible_truncation)]
const fn grid_x(left: u16, index: usize) -> u16 {
    left + index as u16 * (TILE_W + GAP_X)
}

#[allow(clippy::cast_possible_truncation)]
const fn grid_y(top: u16, index: usize) -> u16 {
    top + index as u16 * (TILE_H + GAP_Y)
}

/// Position every tile and push the bounds into the tree. Tiles that
/// would cross the right edge of their area or reach the bottom line
/// collapse to zero size.
fn layout(tree: &mut FocusTree, page: &Page, size: Size) -> Result<Layout, TreeError> {
    let bottom = size.rows.saturating_sub(1);
    let side_x = (size.cols >= SIDE_MIN_COLS).then(|| size.cols - SIDE_W);
    let page_right = side_x.unwrap_or(size.cols);

    let mut placed = Vec::new();
    let mut place = |tree: &mut FocusTree, id: NodeId, x: u16, y: u16, right: u16| {
        if x + TILE_W <= right && y + TILE_H <= bottom {
            placed.push(Placed { id, x, y });
            tree.set_bounds(
                id,
                Some(Rect::new(
                    f64::from(x),
                    f64::from(y),
                    f64::from(TILE_W),
                    f64::from(TILE_H),
                )),
            )
        } else {
            tree.set_bounds(id, Some(Rect::EMPTY))
        }
    };

    for (i, &id) in page.menu.iter().enumerate() {
        place(tree, id, grid_x(1, i), MENU_Y, size.cols)?;
    }
    for (r, row) in page.rows.iter().enumerate() {
        for (i, &id) in row.iter().enumerate() {
            place(tree, id, grid_x(1, i), grid_y(ROWS_Y, r), page_right)?;
        }
    }
    for (r, row) in page.side_rows.iter().enumerate() {
        for (c, &id) in row.iter().enumerate() {
            match side_x {
                Some(sx) => place(tree, id, grid_x(sx + 1, c), grid_y(ROWS_Y, r), size.cols)?,
                None => tree.set_bounds(id, Some(Rect::EMPTY))?,
            }
        }
    }

    debug!(
        "laid out {} of {} tiles for {}x{}",
        placed.len(),
        tree.focusable_descendants(tree.root()).len(),
        size.cols,
        size.rows
    );
    Ok(Layout { placed, side_x })
}

// ─── Focus ──────────────────────────────────────────────────────────────────

/// The host side of focus: which tile holds it.
#[derive(Debug, Default)]
struct Focus {
    current: Option<NodeId>,
}

impl FocusHost for Focus {
    fn focused(&self) -> Option<NodeId> {
        self.current
    }

    fn set_focus(&mut self, node: NodeId) {
        self.current = Some(node);
    }
}

// ─── Demo App ───────────────────────────────────────────────────────────────

struct Demo {
    tree: FocusTree,
    page: Page,
    layout: Layout,
    nav: Navigator,
    focus: Focus,
    size: Size,
    /// Text typed after `:`. Arrow keys edit nothing and move nothing
    /// while it is open.
    command: Option<String>,
    message: String,
}

const HELP: &str = "arrows move  tab cycles  s strategy  : set  q quit";

impl Demo {
    fn new(options: NavOptions, size: Size) -> Result<Self, TreeError> {
        let (mut tree, page) = build_page()?;
        let layout = layout(&mut tree, &page, size)?;
        let nav = Navigator::new(options);
        let current = nav.initial_focus(&mut tree);
        Ok(Self {
            tree,
            page,
            layout,
            nav,
            focus: Focus { current },
            size,
            command: None,
            message: String::from(HELP),
        })
    }

    fn focused_label(&self) -> &str {
        self.focus.current.map_or("(none)", |id| self.tree.label(id))
    }

    fn relayout(&mut self, size: Size) {
        self.size = size;
        match layout(&mut self.tree, &self.page, size) {
            Ok(l) => self.layout = l,
            Err(e) => {
                log::error!("layout failed: {e}");
                return;
            }
        }
        let before = self.focus.current;
        self.focus.current = self.nav.recover_focus(&mut self.tree, before);
        if self.focus.current != before {
            info!("focus recaptured at {}", self.focused_label());
        }
    }

    fn arrow(&mut self, direction: Direction) {
        match self.nav.navigate(&mut self.tree, &mut self.focus, direction) {
            Some(_) => info!("{direction}: focus on {}", self.focused_label()),
            None => debug!("{direction}: focus stays on {}", self.focused_label()),
        }
    }

    /// Move focus through visible tiles in document order, wrapping
    /// around. The navigator only hears about the result.
    fn cycle(&mut self, backwards: bool) {
        let order = Walker::new(&self.tree, self.nav.options().max_steps)
            .visible_leaves(self.tree.root());
        if order.is_empty() {
            return;
        }
        let len = order.len();
        let next = match self.focus.current.and_then(|c| order.iter().position(|&n| n == c)) {
            Some(i) if backwards => order[(i + len - 1) % len],
            Some(i) => order[(i + 1) % len],
            None if backwards => order[len - 1],
            None => order[0],
        };
        if self.nav.focus_changed(&mut self.tree, next) {
            self.focus.set_focus(next);
            info!("tab: focus on {}", self.focused_label());
        }
    }

    fn toggle_strategy(&mut self) {
        let options = self.nav.options_mut();
        options.strategy = match options.strategy {
            Strategy::Indexed => Strategy::Geometric,
            Strategy::Geometric => Strategy::Indexed,
        };
        self.message = format!("strategy={}", options.strategy);
        info!("{}", self.message);
    }

    /// Run a finished command line. Only `set`/`se` is understood.
    fn execute(&mut self, line: &str) {
        let line = line.trim();
        let (cmd, args) = line.split_once(' ').unwrap_or((line, ""));
        self.message = match cmd {
            "set" | "se" => match self.nav.options_mut().apply_all(args) {
                Ok(shown) if shown.is_empty() => format!(":{line}"),
                Ok(shown) => shown.join("  "),
                Err(e) => format!("E: {e}"),
            },
            "" => String::new(),
            _ => format!("E: not a command: {cmd}"),
        };
    }

    fn command_key(&mut self, key: Key) {
        let Some(text) = self.command.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(text);
                self.command = None;
                self.execute(&line);
            }
            KeyCode::Escape => {
                self.command = None;
                self.message = String::from(HELP);
            }
            KeyCode::Backspace => {
                if text.pop().is_none() {
                    self.command = None;
                }
            }
            KeyCode::Char(c) if !key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                text.push(c);
            }
            _ => debug!("ignoring {key:?} in the command line"),
        }
    }
}

impl App for Demo {
    fn on_key(&mut self, key: Key) -> Action {
        if self.command.is_some() {
            self.command_key(key);
            return Action::Continue;
        }

        if let Some(direction) = key.direction() {
            self.arrow(direction);
            return Action::Continue;
        }

        match key.code {
            KeyCode::Escape => return Action::Quit,
            KeyCode::Char('q') if key.is_char('q') => return Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(Modifiers::CTRL) => return Action::Quit,
            KeyCode::Tab => self.cycle(key.modifiers.contains(Modifiers::SHIFT)),
            KeyCode::Char('s') if key.is_char('s') => self.toggle_strategy(),
            KeyCode::Char(':') => self.command = Some(String::new()),
            KeyCode::Enter => self.message = format!("selected {}", self.focused_label()),
            _ => debug!("unbound key {key:?}"),
        }
        Action::Continue
    }

    fn on_resize(&mut self, size: Size) {
        if size != self.size {
            self.relayout(size);
        }
    }

    fn paint(&mut self, canvas: &mut Canvas) {
        let width = canvas.width();
        let status = format!(
            " tvnav  strategy={}  focus={}",
            self.nav.options().strategy,
            self.focused_label()
        );
        canvas.fill(0, 0, width, 1, Style::REVERSE);
        canvas.text(0, 0, &status, Style::REVERSE | Style::BOLD, width);

        if let Some(sx) = self.layout.side_x {
            for y in ROWS_Y - 1..canvas.height().saturating_sub(1) {
                canvas.set(sx, y, '│', Style::DIM);
            }
            canvas.text(sx + 2, ROWS_Y - 1, self.tree.label(self.page.side), Style::DIM, width);
        }

        for p in &self.layout.placed {
            let focused = self.focus.current == Some(p.id);
            let (border, style) = if focused {
                (Border::HEAVY, Style::REVERSE | Style::BOLD)
            } else {
                (Border::LIGHT, Style::empty())
            };
            canvas.draw_box(p.x, p.y, TILE_W, TILE_H, self.tree.label(p.id), border, style);
        }

        let last = canvas.height().saturating_sub(1);
        match &self.command {
            Some(text) => {
                canvas.text(0, last, &format!(":{text}"), Style::empty(), width);
            }
            None => {
                canvas.text(0, last, &self.message, Style::DIM, width);
            }
        }
    }
}

// ─── Command Line ───────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct Cli {
    set: Vec<String>,
    keys: Option<String>,
    log: Option<String>,
    size: Option<Size>,
    help: bool,
}

const USAGE: &str = "\
usage: tvnav [--set DIRECTIVES] [--keys KEYS] [--size COLSxROWS] [--log PATH]

  --set   option directives, e.g. \"strategy=geometric noinclusive\"
          (also read from TVNAV_OPTS)
  --keys  run without a terminal and print focus after each key:
          up down left right h j k l tab backtab enter s q
  --size  page size for --keys (default 120x40)
  --log   write log output to PATH (level from TVNAV_LOG, default warn)";

fn parse_size(s: &str) -> Option<Size> {
    let (cols, rows) = s.split_once('x')?;
    let size = Size {
        cols: cols.parse().ok()?,
        rows: rows.parse().ok()?,
    };
    (size.cols > 0 && size.rows > 0).then_some(size)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut cli = Cli::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--set" => cli.set.push(value("--set")?),
            "--keys" => cli.keys = Some(value("--keys")?),
            "--log" => cli.log = Some(value("--log")?),
            "--size" => {
                let v = value("--size")?;
                cli.size = Some(parse_size(&v).ok_or_else(|| format!("bad size: {v}"))?);
            }
            "-h" | "--help" => cli.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(cli)
}

/// Options from `TVNAV_OPTS` first, then each `--set`.
fn build_options(env_opts: Option<&str>, sets: &[String]) -> Result<NavOptions, String> {
    let mut options = NavOptions::default();
    for source in env_opts.into_iter().chain(sets.iter().map(String::as_str)) {
        options
            .apply_all(source)
            .map_err(|e| format!("{source}: {e}"))?;
    }
    Ok(options)
}

fn init_logging(log_path: Option<&str>, interactive: bool) -> Result<(), String> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    if let Ok(filters) = env::var("TVNAV_LOG") {
        builder.parse_filters(&filters);
    }
    match log_path {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("{path}: {e}"))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // Log lines on stderr would tear through the full-screen UI.
        None if interactive => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }
    builder.try_init().map_err(|e| e.to_string())
}

// ─── Scripted Mode ──────────────────────────────────────────────────────────

fn key_from_token(token: &str) -> Option<Key> {
    let code = match token {
        "tab" => KeyCode::Tab,
        "backtab" => return Some(Key::with(KeyCode::Tab, Modifiers::SHIFT)),
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Escape,
        t => match t.parse::<Direction>() {
            Ok(Direction::Up) => KeyCode::Up,
            Ok(Direction::Down) => KeyCode::Down,
            Ok(Direction::Left) => KeyCode::Left,
            Ok(Direction::Right) => KeyCode::Right,
            Err(_) => {
                let mut chars = t.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        },
    };
    Some(Key::plain(code))
}

/// Feed `script` to the demo page and report focus after every key.
fn run_script(demo: &mut Demo, script: &str) -> Result<Vec<String>, String> {
    let mut trace = vec![format!("start: {}", demo.focused_label())];
    for token in script.split_whitespace() {
        let key = key_from_token(token).ok_or_else(|| format!("unknown key: {token}"))?;
        if dispatch(demo, &[key]) == Action::Quit {
            trace.push(format!("{token}: quit"));
            break;
        }
        trace.push(format!("{token}: {}", demo.focused_label()));
    }
    Ok(trace)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn fail(msg: &str, code: i32) -> ! {
    eprintln!("tvnav: {msg}");
    process::exit(code);
}

fn main() {
    let cli = parse_args(env::args().skip(1)).unwrap_or_else(|e| fail(&format!("{e}\n{USAGE}"), 2));
    if cli.help {
        println!("{USAGE}");
        return;
    }

    let interactive = cli.keys.is_none();
    if let Err(e) = init_logging(cli.log.as_deref(), interactive) {
        fail(&e, 1);
    }

    let env_opts = env::var("TVNAV_OPTS").ok();
    let options = build_options(env_opts.as_deref(), &cli.set).unwrap_or_else(|e| fail(&e, 2));

    if let Some(script) = &cli.keys {
        let size = cli.size.unwrap_or(Size { cols: 120, rows: 40 });
        let mut demo = Demo::new(options, size).unwrap_or_else(|e| fail(&e.to_string(), 1));
        match run_script(&mut demo, script) {
            Ok(trace) => trace.iter().for_each(|line| println!("{line}")),
            Err(e) => fail(&e, 2),
        }
        return;
    }

    let mut event_loop = EventLoop::new();
    let mut demo =
        Demo::new(options, event_loop.size()).unwrap_or_else(|e| fail(&e.to_string(), 1));
    if let Err(e) = event_loop.run(&mut demo) {
        fail(&e.to_string(), 1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WIDE: Size = Size { cols: 120, rows: 40 };
    const NARROW: Size = Size { cols: 40, rows: 20 };

    fn demo() -> Demo {
        Demo::new(NavOptions::default(), WIDE).unwrap()
    }

    fn press(d: &mut Demo, tokens: &str) {
        for t in tokens.split_whitespace() {
            let _ = d.on_key(key_from_token(t).unwrap());
        }
    }

    fn label(d: &Demo) -> String {
        d.focused_label().to_string()
    }

    // ── Page ────────────────────────────────────────────────────────────

    #[test]
    fn page_shape() {
        let (tree, page) = build_page().unwrap();
        assert_eq!(page.menu.len(), 3);
        assert_eq!(
            page.rows.iter().map(Vec::len).collect::<Vec<_>>(),
            ROW_LENGTHS.to_vec()
        );
        assert_eq!(tree.behavior(page.side), Behavior::Closest);
        assert_eq!(tree.focusable_descendants(tree.root()).len(), 3 + 19 + 6);
    }

    #[test]
    fn wide_layout_hides_row_three_tail() {
        let d = demo();
        let t37 = d.tree.find("Tile 3.7").unwrap();
        let t36 = d.tree.find("Tile 3.6").unwrap();
        assert!(d.tree.bounds(t37).is_empty());
        assert!(!d.tree.bounds(t36).is_empty());
        assert_eq!(d.layout.side_x, Some(120 - SIDE_W));
        assert_eq!(d.layout.placed.len(), 3 + 17 + 6);
    }

    #[test]
    fn narrow_layout_drops_side_panel() {
        let d = Demo::new(NavOptions::default(), NARROW).unwrap();
        assert_eq!(d.layout.side_x, None);
        let near = d.tree.find("Near 1").unwrap();
        assert!(d.tree.bounds(near).is_empty());
        // Two tiles per row fit; rows 4 and 5 run into the bottom line.
        let t12 = d.tree.find("Tile 1.2").unwrap();
        let t13 = d.tree.find("Tile 1.3").unwrap();
        let t41 = d.tree.find("Tile 4.1").unwrap();
        assert!(!d.tree.bounds(t12).is_empty());
        assert!(d.tree.bounds(t13).is_empty());
        assert!(d.tree.bounds(t41).is_empty());
    }

    // ── Navigation ──────────────────────────────────────────────────────

    #[test]
    fn starts_on_first_menu_link() {
        assert_eq!(label(&demo()), "Home");
    }

    #[test]
    fn down_from_menu_enters_first_row() {
        let mut d = demo();
        press(&mut d, "down");
        assert_eq!(label(&d), "Tile 1.1");
        press(&mut d, "right right");
        assert_eq!(label(&d), "Tile 1.3");
    }

    #[test]
    fn rows_remember_their_column() {
        let mut d = demo();
        press(&mut d, "down right right down up");
        assert_eq!(label(&d), "Tile 1.3");
        press(&mut d, "up down");
        assert_eq!(label(&d), "Tile 1.3");
    }

    #[test]
    fn row_end_enters_closest_panel_nearby() {
        let mut d = demo();
        press(&mut d, "down right right right right");
        assert_eq!(label(&d), "Tile 1.5");
        press(&mut d, "right");
        assert_eq!(label(&d), "Near 1");
    }

    #[test]
    fn closest_panel_ignores_its_memory() {
        let mut d = demo();
        // Leave the panel from its bottom row, then come back from row 1.
        press(&mut d, "down right right right right right down down left");
        assert_eq!(label(&d), "Tile 1.5");
        press(&mut d, "right");
        assert_eq!(label(&d), "Near 1");
    }

    #[test]
    fn hidden_tiles_are_skipped() {
        let mut d = demo();
        press(&mut d, "down down down right right right right right");
        assert_eq!(label(&d), "Tile 3.6");
        press(&mut d, "right");
        assert_eq!(label(&d), "Tile 3.6");
    }

    #[test]
    fn menu_top_edge_is_noop() {
        let mut d = demo();
        press(&mut d, "up left");
        assert_eq!(label(&d), "Home");
    }

    #[test]
    fn geometric_strategy_moves_too() {
        let mut d = demo();
        press(&mut d, "s");
        assert_eq!(d.nav.options().strategy, Strategy::Geometric);
        press(&mut d, "down right");
        assert_eq!(label(&d), "Tile 1.2");
        press(&mut d, "s");
        assert_eq!(d.nav.options().strategy, Strategy::Indexed);
    }

    // ── Tab order ───────────────────────────────────────────────────────

    #[test]
    fn tab_cycles_visible_tiles() {
        let mut d = demo();
        press(&mut d, "tab tab");
        assert_eq!(label(&d), "Settings");
        press(&mut d, "tab");
        assert_eq!(label(&d), "Tile 1.1");
    }

    #[test]
    fn backtab_wraps_to_last() {
        let mut d = demo();
        press(&mut d, "backtab");
        assert_eq!(label(&d), "Near 6");
    }

    #[test]
    fn tab_updates_container_memory() {
        let mut d = demo();
        // Home, Movies, Settings, 1.1, 1.2
        press(&mut d, "tab tab tab tab");
        assert_eq!(label(&d), "Tile 1.2");
        press(&mut d, "up down");
        assert_eq!(label(&d), "Tile 1.2");
    }

    // ── Command line ────────────────────────────────────────────────────

    #[test]
    fn command_line_sets_options() {
        let mut d = demo();
        for c in ":set noinclusive weight=2".chars() {
            let _ = d.on_key(Key::plain(KeyCode::Char(c)));
        }
        let _ = d.on_key(Key::plain(KeyCode::Enter));
        assert!(d.command.is_none());
        assert!(!d.nav.options().inclusive_edges);
        assert!((d.nav.options().orthogonal_weight - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn command_line_swallows_arrows() {
        let mut d = demo();
        press(&mut d, ": down");
        assert!(d.command.is_some());
        assert_eq!(label(&d), "Home");
        press(&mut d, "esc");
        assert!(d.command.is_none());
        press(&mut d, "down");
        assert_eq!(label(&d), "Tile 1.1");
    }

    #[test]
    fn command_errors_are_reported() {
        let mut d = demo();
        d.execute("set bogus");
        assert!(d.message.starts_with("E: "));
        d.execute("frobnicate");
        assert_eq!(d.message, "E: not a command: frobnicate");
    }

    #[test]
    fn backspace_on_empty_command_closes_it() {
        let mut d = demo();
        press(&mut d, ":");
        let _ = d.on_key(Key::plain(KeyCode::Backspace));
        assert!(d.command.is_none());
    }

    // ── Resize ──────────────────────────────────────────────────────────

    #[test]
    fn resize_recaptures_hidden_focus() {
        let mut d = demo();
        press(&mut d, "down right right right right");
        assert_eq!(label(&d), "Tile 1.5");
        d.on_resize(NARROW);
        assert_eq!(label(&d), "Home");
    }

    #[test]
    fn resize_keeps_visible_focus() {
        let mut d = demo();
        press(&mut d, "down right");
        d.on_resize(NARROW);
        assert_eq!(label(&d), "Tile 1.2");
    }

    #[test]
    fn shrink_then_enter_row_with_hidden_memory() {
        let mut d = Demo::new(NavOptions::default(), Size { cols: 150, rows: 40 }).unwrap();
        press(&mut d, "down down down right right right right right right right");
        assert_eq!(label(&d), "Tile 3.8");
        press(&mut d, "up");
        assert_eq!(label(&d), "Tile 2.1");

        // Row 3 still remembers Tile 3.8, which no longer fits.
        d.on_resize(WIDE);
        assert_eq!(label(&d), "Tile 2.1");
        press(&mut d, "down");
        assert_eq!(label(&d), "Tile 3.6");
    }

    // ── Keys ────────────────────────────────────────────────────────────

    #[test]
    fn quit_keys() {
        let mut d = demo();
        assert_eq!(d.on_key(key_from_token("q").unwrap()), Action::Quit);
        assert_eq!(d.on_key(Key::plain(KeyCode::Escape)), Action::Quit);
        assert_eq!(
            d.on_key(Key::with(KeyCode::Char('c'), Modifiers::CTRL)),
            Action::Quit
        );
    }

    #[test]
    fn tokens_map_to_keys() {
        assert_eq!(key_from_token("left"), Some(Key::plain(KeyCode::Left)));
        assert_eq!(key_from_token("j"), Some(Key::plain(KeyCode::Down)));
        assert_eq!(
            key_from_token("backtab"),
            Some(Key::with(KeyCode::Tab, Modifiers::SHIFT))
        );
        assert_eq!(key_from_token("x"), Some(Key::plain(KeyCode::Char('x'))));
        assert_eq!(key_from_token("nope"), None);
    }

    // ── Scripted mode ───────────────────────────────────────────────────

    #[test]
    fn script_prints_trace() {
        let mut d = demo();
        assert_eq!(
            run_script(&mut d, "down right q right").unwrap(),
            ["start: Home", "down: Tile 1.1", "right: Tile 1.2", "q: quit"]
        );
    }

    #[test]
    fn script_rejects_unknown_tokens() {
        let mut d = demo();
        assert_eq!(
            run_script(&mut d, "down sideways"),
            Err(String::from("unknown key: sideways"))
        );
    }

    // ── Paint ───────────────────────────────────────────────────────────

    #[test]
    fn paint_highlights_focus() {
        let mut d = demo();
        let mut canvas = Canvas::new(WIDE.cols, WIDE.rows);
        d.paint(&mut canvas);
        assert!(canvas.row_text(0).contains("focus=Home"));
        assert!(canvas.row_text(MENU_Y).starts_with(" ┏"));
        assert!(canvas.row_text(MENU_Y + 1).contains("Home"));
        assert!(canvas.row_text(WIDE.rows - 1).starts_with("arrows move"));
    }

    // ── Arguments ───────────────────────────────────────────────────────

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_flags() {
        let cli = parse_args(args("--set noinclusive --keys down --size 80x24 --log x.log")).unwrap();
        assert_eq!(
            cli,
            Cli {
                set: vec![String::from("noinclusive")],
                keys: Some(String::from("down")),
                log: Some(String::from("x.log")),
                size: Some(Size { cols: 80, rows: 24 }),
                help: false,
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert_eq!(
            parse_args(args("--set")),
            Err(String::from("--set needs a value"))
        );
        assert!(parse_args(args("--size 0x10")).is_err());
        assert!(parse_args(args("--frob")).is_err());
    }

    #[test]
    fn env_options_apply_before_flags() {
        let o = build_options(
            Some("strategy=geometric weight=3"),
            &[String::from("weight=0.5")],
        )
        .unwrap();
        assert_eq!(o.strategy, Strategy::Geometric);
        assert!((o.orthogonal_weight - 0.5).abs() < f64::EPSILON);
        assert!(build_options(None, &[String::from("bogus")]).is_err());
    }
}
