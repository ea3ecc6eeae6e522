// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into key presses. A remote control only needs
// arrows, OK, back and a handful of letters, so this understands:
//
// - Legacy CSI sequences (arrows, Home/End, editing keys, Shift+Tab)
// - SS3 arrows (application cursor mode)
// - xterm modifier parameters (`ESC [ 1 ; 5 C` is Ctrl+Right)
// - Alt+key (ESC followed by a printable character)
// - Control bytes, ASCII, and UTF-8 multi-byte characters
//
// Escape sequences can be split across `read()` calls, so the decoder
// keeps unconsumed bytes and resumes on the next `feed`. A lone ESC is
// ambiguous until a short timeout passes; [`KeyDecoder::flush`] resolves
// it as the Escape key.

use bitflags::bitflags;
use tvnav_core::Direction;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys, in xterm's `param = 1 + bitmask` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

impl Key {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// The navigation direction of an arrow key.
    ///
    /// Arrows held with Ctrl, Alt or Super are not navigation. Shift is
    /// allowed since some remotes send it on long presses.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        if self
            .modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER)
        {
            return None;
        }
        match self.code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        }
    }

    /// Whether this is the plain character `c`.
    #[must_use]
    pub fn is_char(self, c: char) -> bool {
        self.code == KeyCode::Char(c) && !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Incremental stdin decoder.
///
/// Feed raw bytes with [`feed`](KeyDecoder::feed); incomplete sequences
/// stay buffered until the rest arrives or [`flush`](KeyDecoder::flush)
/// gives up on them.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    buf: Vec<u8>,
}

impl KeyDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Decode everything that forms a complete key.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match decode(&self.buf[pos..]) {
                Decoded::Key(key, used) => {
                    keys.push(key);
                    pos += used;
                }
                Decoded::Skip(used) => pos += used,
                Decoded::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        keys
    }

    /// Bytes waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve leftovers after an input timeout: a lone ESC becomes the
    /// Escape key, other printable leftovers become characters.
    pub fn flush(&mut self) -> Vec<Key> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(Key::plain(KeyCode::Escape)),
                0x20..=0x7E => Some(Key::plain(KeyCode::Char(char::from(b)))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }
}

// ─── Stateless Decoding ─────────────────────────────────────────────────────

enum Decoded {
    Key(Key, usize),
    Incomplete,
    Skip(usize),
}

fn decode(buf: &[u8]) -> Decoded {
    match buf[0] {
        0x1B => decode_escape(buf),
        0x08 | 0x7F => Decoded::Key(Key::plain(KeyCode::Backspace), 1),
        0x09 => Decoded::Key(Key::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Decoded::Key(Key::plain(KeyCode::Enter), 1),
        b @ (0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A) => Decoded::Key(
            Key::with(KeyCode::Char(char::from(b + b'a' - 1)), Modifiers::CTRL),
            1,
        ),
        b @ 0x20..=0x7E => Decoded::Key(Key::plain(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => decode_utf8(buf),
        _ => Decoded::Skip(1),
    }
}

fn decode_escape(buf: &[u8]) -> Decoded {
    let Some(&next) = buf.get(1) else {
        return Decoded::Incomplete;
    };
    match next {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        0x1B => Decoded::Key(Key::with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Decoded::Key(Key::with(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        _ => Decoded::Key(Key::plain(KeyCode::Escape), 1),
    }
}

fn decode_csi(buf: &[u8]) -> Decoded {
    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, final 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Decoded::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Decoded::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_params(&buf[2..end]);
    let used = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => return Decoded::Key(Key::with(KeyCode::Tab, Modifiers::SHIFT), used),
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Decoded::Skip(used),
        },
        _ => return Decoded::Skip(used),
    };
    Decoded::Key(Key::with(code, modifiers), used)
}

fn decode_ss3(buf: &[u8]) -> Decoded {
    let Some(&b) = buf.get(2) else {
        return Decoded::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Decoded::Skip(3),
    };
    Decoded::Key(Key::plain(code), 3)
}

fn decode_utf8(buf: &[u8]) -> Decoded {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Decoded::Skip(1),
    };
    if buf.len() < len {
        return Decoded::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Decoded::Skip(1), |ch| Decoded::Key(Key::plain(KeyCode::Char(ch)), len))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0_u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

/// xterm modifier parameter: `1 + bitmask`; 0 and 1 mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(bits as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_all(data: &[u8]) -> Vec<Key> {
        KeyDecoder::new().feed(data)
    }

    fn one(data: &[u8]) -> Key {
        let keys = decode_all(data);
        assert_eq!(keys.len(), 1, "expected one key, got {keys:?}");
        keys[0]
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn ascii_and_control() {
        assert_eq!(one(b"q"), Key::plain(KeyCode::Char('q')));
        assert_eq!(one(b"\r"), Key::plain(KeyCode::Enter));
        assert_eq!(one(b"\n"), Key::plain(KeyCode::Enter));
        assert_eq!(one(b"\t"), Key::plain(KeyCode::Tab));
        assert_eq!(one(b"\x7f"), Key::plain(KeyCode::Backspace));
        assert_eq!(one(b"\x03"), Key::with(KeyCode::Char('c'), Modifiers::CTRL));
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(one("é".as_bytes()), Key::plain(KeyCode::Char('é')));
        assert_eq!(one("→".as_bytes()), Key::plain(KeyCode::Char('→')));
    }

    #[test]
    fn utf8_split_waits() {
        let mut d = KeyDecoder::new();
        let bytes = "é".as_bytes();
        assert!(d.feed(&bytes[..1]).is_empty());
        assert!(d.has_pending());
        assert_eq!(d.feed(&bytes[1..]), [Key::plain(KeyCode::Char('é'))]);
    }

    // ── Arrows ──────────────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(
            decode_all(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            [
                Key::plain(KeyCode::Up),
                Key::plain(KeyCode::Down),
                Key::plain(KeyCode::Right),
                Key::plain(KeyCode::Left),
            ]
        );
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(one(b"\x1bOA"), Key::plain(KeyCode::Up));
        assert_eq!(one(b"\x1bOD"), Key::plain(KeyCode::Left));
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(one(b"\x1b[1;5C"), Key::with(KeyCode::Right, Modifiers::CTRL));
        assert_eq!(one(b"\x1b[1;2A"), Key::with(KeyCode::Up, Modifiers::SHIFT));
        assert_eq!(
            one(b"\x1b[1;4D"),
            Key::with(KeyCode::Left, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    #[test]
    fn split_sequence_resumes() {
        let mut d = KeyDecoder::new();
        assert!(d.feed(b"\x1b[").is_empty());
        assert_eq!(d.feed(b"B"), [Key::plain(KeyCode::Down)]);
        assert!(!d.has_pending());
    }

    // ── Other sequences ─────────────────────────────────────────────────

    #[test]
    fn tilde_keys() {
        assert_eq!(one(b"\x1b[3~"), Key::plain(KeyCode::Delete));
        assert_eq!(one(b"\x1b[5~"), Key::plain(KeyCode::PageUp));
        assert_eq!(one(b"\x1b[1~"), Key::plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[3;5~"), Key::with(KeyCode::Delete, Modifiers::CTRL));
    }

    #[test]
    fn shift_tab() {
        assert_eq!(one(b"\x1b[Z"), Key::with(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn alt_keys() {
        assert_eq!(one(b"\x1bx"), Key::with(KeyCode::Char('x'), Modifiers::ALT));
        assert_eq!(one(b"\x1b\x1b"), Key::with(KeyCode::Escape, Modifiers::ALT));
    }

    #[test]
    fn unknown_sequences_skipped() {
        assert_eq!(decode_all(b"\x1b[99~a"), [Key::plain(KeyCode::Char('a'))]);
        assert_eq!(decode_all(b"\x1bOzb"), [Key::plain(KeyCode::Char('b'))]);
    }

    // ── Escape timeout ──────────────────────────────────────────────────

    #[test]
    fn lone_escape_needs_flush() {
        let mut d = KeyDecoder::new();
        assert!(d.feed(b"\x1b").is_empty());
        assert!(d.has_pending());
        assert_eq!(d.flush(), [Key::plain(KeyCode::Escape)]);
        assert!(!d.has_pending());
    }

    // ── Directions ──────────────────────────────────────────────────────

    #[test]
    fn arrows_map_to_directions() {
        assert_eq!(Key::plain(KeyCode::Up).direction(), Some(Direction::Up));
        assert_eq!(Key::plain(KeyCode::Right).direction(), Some(Direction::Right));
        assert_eq!(
            Key::with(KeyCode::Down, Modifiers::SHIFT).direction(),
            Some(Direction::Down)
        );
    }

    #[test]
    fn non_navigation_keys_have_no_direction() {
        assert_eq!(Key::plain(KeyCode::Char('j')).direction(), None);
        assert_eq!(Key::plain(KeyCode::Enter).direction(), None);
        assert_eq!(Key::with(KeyCode::Left, Modifiers::CTRL).direction(), None);
    }

    #[test]
    fn is_char_ignores_ctrl() {
        assert!(Key::plain(KeyCode::Char('q')).is_char('q'));
        assert!(!Key::with(KeyCode::Char('q'), Modifiers::CTRL).is_char('q'));
    }

    #[test]
    fn params_and_modifiers() {
        assert_eq!(parse_params(b""), Vec::<u16>::new());
        assert_eq!(parse_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_params(b";3"), vec![0, 3]);
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
    }
}
