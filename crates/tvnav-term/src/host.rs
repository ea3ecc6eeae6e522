// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — keys in, frames out.
//
// The loop polls stdin with a short timeout. Bytes go through the key
// decoder and each key is handed to the [`App`]; after any key or
// resize the app repaints the canvas and the whole frame is written in
// one go. A remote sends a handful of keys per second and nothing
// animates, so the loop sleeps in `poll()` the rest of the time.
//
// # Escape timeout
//
// A lone ESC could be the back key or the start of an arrow sequence.
// The decoder holds it; when a poll times out with bytes still pending
// they are flushed as plain keys.
//
// # SIGWINCH
//
// The handler only sets an `AtomicBool`. The loop checks it each turn,
// re-queries the size and lets the app lay itself out again.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::canvas::Canvas;
use crate::keys::{Key, KeyDecoder};
use crate::screen::{Screen, Size};

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
const fn install_sigwinch_handler() {}

// ─── App Trait ──────────────────────────────────────────────────────────────

/// What the app wants after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A full-screen application driven by [`EventLoop`].
pub trait App {
    /// Handle one key. Return [`Action::Quit`] to leave the loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// The terminal changed size. Called before the next paint.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the current state. The canvas is cleared and sized to the
    /// terminal before each call.
    fn paint(&mut self, canvas: &mut Canvas);
}

/// Hand `keys` to `app` in order, stopping at the first quit.
pub fn dispatch(app: &mut impl App, keys: &[Key]) -> Action {
    for &key in keys {
        if app.on_key(key) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

// ─── Input ──────────────────────────────────────────────────────────────────

enum Input {
    Bytes(Vec<u8>),
    Timeout,
    Eof,
}

const READ_BUF_SIZE: usize = 1024;

#[cfg(unix)]
fn read_input(timeout_ms: i32) -> io::Result<Input> {
    let ready = unsafe {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        libc::poll(&raw mut pfd, 1, timeout_ms)
    };
    if ready < 0 {
        let err = io::Error::last_os_error();
        // SIGWINCH interrupts poll; the caller picks the flag up.
        return if err.kind() == io::ErrorKind::Interrupted {
            Ok(Input::Timeout)
        } else {
            Err(err)
        };
    }
    if ready == 0 {
        return Ok(Input::Timeout);
    }

    let mut buf = [0u8; READ_BUF_SIZE];
    let n = unsafe {
        libc::read(
            libc::STDIN_FILENO,
            buf.as_mut_ptr().cast::<libc::c_void>(),
            buf.len(),
        )
    };
    match n {
        0 => Ok(Input::Eof),
        n if n < 0 => Err(io::Error::last_os_error()),
        #[allow(clippy::cast_sign_loss)]
        n => Ok(Input::Bytes(buf[..n as usize].to_vec())),
    }
}

#[cfg(not(unix))]
fn read_input(_timeout_ms: i32) -> io::Result<Input> {
    use std::io::Read;

    let mut buf = [0u8; READ_BUF_SIZE];
    let n = io::stdin().read(&mut buf)?;
    Ok(if n == 0 {
        Input::Eof
    } else {
        Input::Bytes(buf[..n].to_vec())
    })
}

// ─── Loop Config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// How long a lone ESC waits for the rest of a sequence (ms).
    pub escape_timeout_ms: i32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout_ms: 25,
        }
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

pub struct EventLoop {
    screen: Screen,
    decoder: KeyDecoder,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            screen: Screen::new(),
            decoder: KeyDecoder::new(),
            config,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.screen.size()
    }

    /// Take over the terminal and run until the app quits or stdin
    /// closes. The terminal is restored on every exit path.
    ///
    /// # Errors
    ///
    /// Terminal setup, input or output failures.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.screen.enter()?;
        install_sigwinch_handler();
        let result = self.run_inner(app);
        self.screen.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.screen.size();
        let mut canvas = Canvas::new(size.cols, size.rows);
        app.on_resize(size);
        let mut dirty = true;

        loop {
            if dirty {
                canvas.clear();
                app.paint(&mut canvas);
                let mut out = io::stdout().lock();
                out.write_all(canvas.render().as_bytes())?;
                out.flush()?;
                dirty = false;
            }

            let timeout = if self.decoder.has_pending() {
                self.config.escape_timeout_ms
            } else {
                -1
            };
            let keys = match read_input(timeout)? {
                Input::Bytes(bytes) => self.decoder.feed(&bytes),
                Input::Timeout => self.decoder.flush(),
                Input::Eof => {
                    log::debug!("stdin closed");
                    return Ok(());
                }
            };
            if dispatch(app, &keys) == Action::Quit {
                return Ok(());
            }
            dirty |= !keys.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.screen.refresh_size();
                log::debug!("resized to {}x{}", size.cols, size.rows);
                canvas.resize(size.cols, size.rows);
                app.on_resize(size);
                dirty = true;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
