// SPDX-License-Identifier: MIT
//
// tvnav-term — Terminal plumbing for the tvnav demo host.
//
// Just enough terminal control to put a focus tree on screen and drive
// it with a keyboard standing in for a remote: raw mode and the
// alternate screen, a key decoder that turns stdin bytes into arrow and
// control keys, a cell canvas that draws labelled boxes, and a blocking
// event loop that repaints on every key and resize.
//
// No TUI framework: bytes go to the terminal as ANSI escape sequences
// and termios is driven directly through libc.

pub mod canvas;
pub mod host;
pub mod keys;
pub mod screen;
