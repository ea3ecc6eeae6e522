// SPDX-License-Identifier: MIT
//
// Screen control — raw mode, alternate screen, and RAII cleanup.
//
// Safety: termios, ioctl(TIOCGWINSZ), isatty and the raw fd write are
// POSIX calls with no safe wrapper in std. Each unsafe block covers one
// call.
#![allow(unsafe_code)]
//
// The demo takes over the whole terminal while it runs: raw mode so
// arrows arrive byte by byte, the alternate screen so the shell's
// scrollback is untouched, and a hidden cursor since focus is drawn as
// a highlighted box. Everything is undone when the [`Screen`] drops.
//
// A panic mid-frame would otherwise leave the shell without echo, so
// `enter` chains a hook that resets the screen and the saved termios
// before the default panic message prints.

use std::io::{self, Write};
use std::sync::Once;
#[cfg(unix)]
use std::sync::{Mutex, MutexGuard, PoisonError};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the terminal cannot be queried (pipes, tests).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// `None` when stdout is not a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Escape Sequences ───────────────────────────────────────────────────────

pub const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
pub const EXIT_ALT_SCREEN: &str = "\x1b[?1049l";
pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";
pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const SGR_RESET: &str = "\x1b[0m";

/// Restore sequence for the panic hook: reset attributes, show the
/// cursor, leave the alternate screen. The screen switch goes last so
/// the shell comes back clean.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

// ─── Panic Path ─────────────────────────────────────────────────────────────

/// Cooked-mode settings saved by [`Screen::enter`], for the panic hook.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

static HOOK: Once = Once::new();

#[cfg(unix)]
fn saved_termios() -> MutexGuard<'static, Option<libc::termios>> {
    SAVED_TERMIOS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Put the terminal back without going through `Screen`. Errors are
/// ignored: this runs while the process is already going down.
fn restore_after_panic() {
    #[cfg(unix)]
    {
        // The panicking frame may hold stdout's lock, so bypass it.
        let _ = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                EMERGENCY_RESTORE.as_ptr().cast(),
                EMERGENCY_RESTORE.len(),
            )
        };
        if let Some(cooked) = *saved_termios() {
            let _ = set_termios(&cooked, libc::TCSANOW);
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE).and_then(|()| out.flush());
    }
}

/// Chain [`restore_after_panic`] in front of whatever hook is installed.
fn chain_panic_hook() {
    HOOK.call_once(|| {
        let next = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            next(info);
        }));
    });
}

// ─── termios ────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn get_termios() -> io::Result<libc::termios> {
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut tio) } == 0 {
        Ok(tio)
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn set_termios(tio: &libc::termios, when: libc::c_int) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, when, tio) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Full-screen terminal session.
///
/// ```no_run
/// use tvnav_term::screen::Screen;
///
/// let mut screen = Screen::new();
/// screen.enter()?;
/// // ... draw frames ...
/// // Restored on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Screen {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// A handle sized to the current terminal. Does not touch the
    /// terminal until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor. Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        chain_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write!(lock, "{ENTER_ALT_SCREEN}{CURSOR_HIDE}{CLEAR_SCREEN}")?;
        lock.flush()?;

        self.active = true;
        log::debug!("screen entered at {}x{}", self.size.cols, self.size.rows);
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write!(lock, "{SGR_RESET}{CURSOR_SHOW}{EXIT_ALT_SCREEN}")?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        log::debug!("screen left");
        Ok(())
    }

    // ── Raw Mode ────────────────────────────────────────────────────

    /// `cfmakeraw` with blocking single-byte reads. Not a tty: nothing to do.
    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }
        let cooked = get_termios()?;
        let mut tio = cooked;
        unsafe { libc::cfmakeraw(&raw mut tio) };
        tio.c_cc[libc::VMIN] = 1;
        tio.c_cc[libc::VTIME] = 0;
        set_termios(&tio, libc::TCSAFLUSH)?;

        self.original_termios = Some(cooked);
        *saved_termios() = Some(cooked);
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(cooked) = self.original_termios.take() else {
            return Ok(());
        };
        *saved_termios() = None;
        set_termios(&cooked, libc::TCSAFLUSH)
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
