// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that know the byte-level encoding of every sequence the
// engine emits. Two families live here:
//
//   SGR (Select Graphic Rendition) — colors and text attributes. These are
//   composed into `String`s by the color codec, so they target `fmt::Write`.
//
//   Screen control — cursor movement and visibility, screen clearing. These
//   go straight to the terminal, so they target `io::Write`.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
use std::fmt;
use std::io::{self, Write};

/// Control Sequence Introducer. Every sequence we emit starts with it.
pub const CSI: &str = "\x1b[";

/// SGR 0 — reset every attribute and color to the terminal default.
pub const RESET: &str = "\x1b[0m";

// ─── SGR Codes ───────────────────────────────────────────────────────────────

/// SGR code for a 16-color palette index.
///
/// Standard colors (0–7) map to 30–37, bright colors (8–15) to 90–97.
/// Background codes are the foreground code plus 10 (40–47, 100–107).
///
/// `idx` must be below 16; callers validate before reaching here.
#[inline]
#[must_use]
pub const fn ansi16_code(idx: u8, background: bool) -> u8 {
    let base = if idx < 8 { 30 } else { 82 };
    let fg = base + idx;
    if background { fg + 10 } else { fg }
}

/// Emit a single-parameter SGR sequence: `ESC [ code m`.
#[inline]
pub fn sgr(w: &mut impl fmt::Write, code: u8) -> fmt::Result {
    write!(w, "{CSI}{code}m")
}

/// Set a 16-color palette entry as foreground or background.
#[inline]
pub fn ansi16(w: &mut impl fmt::Write, idx: u8, background: bool) -> fmt::Result {
    sgr(w, ansi16_code(idx, background))
}

/// Set a 256-color palette entry (`38;5;n` / `48;5;n`).
#[inline]
pub fn ansi256(w: &mut impl fmt::Write, idx: u8, background: bool) -> fmt::Result {
    let plane = if background { 48 } else { 38 };
    write!(w, "{CSI}{plane};5;{idx}m")
}

/// Set a 24-bit `TrueColor` value (`38;2;r;g;b` / `48;2;r;g;b`).
#[inline]
pub fn rgb(w: &mut impl fmt::Write, r: u8, g: u8, b: u8, background: bool) -> fmt::Result {
    let plane = if background { 48 } else { 38 };
    write!(w, "{CSI}{plane};2;{r};{g};{b}m")
}

// ─── Screen Control ──────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Clear the entire screen (ED 2) and home the cursor.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

/// Reset all SGR attributes on the terminal itself.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET.as_bytes())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
