// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of terminal rendering.
//
// A terminal character cell is roughly twice as tall as it is wide, so one
// character position holds two logical pixels. A `Cell` stores both as
// fully escaped single-glyph strings: sub-pixel 0 and sub-pixel 1, written
// to the terminal side by side.
//
//   ┌─────────┬─────────┐
//   │ sub 0   │ sub 1   │   one canvas pixel column
//   │ "\x1b[41m \x1b[0m" │   = two terminal columns
//   └─────────┴─────────┘
//
// Cells carry their styling inline. There is no separate color field to
// keep in sync: what you store is exactly what reaches the terminal.

use crate::color;

/// Plain space, the content of both halves of a blank cell.
const SPACE: &str = " ";

/// A pair of styled glyphs occupying one character position.
///
/// Invariant: a cell always has exactly two entries. An unset cell holds two
/// unstyled spaces; a cleared canvas cell holds two background-colored spaces.
///
/// ```
/// use tc_term::cell::Cell;
///
/// let cell = Cell::new("\x1b[31mA\x1b[0m", "\x1b[31mB\x1b[0m");
/// assert_eq!(cell.pure(), "AB");
/// assert!(Cell::blank().is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    sub: [String; 2],
}

impl Cell {
    /// Index of the first sub-pixel.
    pub const UPPER: usize = 0;
    /// Index of the second sub-pixel.
    pub const LOWER: usize = 1;

    /// Two unstyled spaces.
    #[must_use]
    pub fn blank() -> Self {
        Self::uniform(SPACE)
    }

    /// A cell from its two sub-pixels.
    #[must_use]
    pub fn new(upper: impl Into<String>, lower: impl Into<String>) -> Self {
        Self {
            sub: [upper.into(), lower.into()],
        }
    }

    /// A cell with the same glyph in both sub-pixels.
    #[must_use]
    pub fn uniform(glyph: impl Into<String>) -> Self {
        let glyph = glyph.into();
        Self {
            sub: [glyph.clone(), glyph],
        }
    }

    /// The sub-pixel at `index` (0 or 1).
    #[inline]
    #[must_use]
    pub fn sub_pixel(&self, index: usize) -> Option<&str> {
        self.sub.get(index).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn upper(&self) -> &str {
        &self.sub[Self::UPPER]
    }

    #[inline]
    #[must_use]
    pub fn lower(&self) -> &str {
        &self.sub[Self::LOWER]
    }

    /// Replace one sub-pixel. Returns `false` if `index` is not 0 or 1.
    pub fn set_sub_pixel(&mut self, index: usize, glyph: impl Into<String>) -> bool {
        match self.sub.get_mut(index) {
            Some(slot) => {
                *slot = glyph.into();
                true
            }
            None => false,
        }
    }

    /// Whether both halves are plain spaces.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.sub.iter().all(|s| s == SPACE)
    }

    /// The visible glyphs with all styling removed.
    #[must_use]
    pub fn pure(&self) -> String {
        let mut out = String::with_capacity(2);
        for s in &self.sub {
            out.push_str(color::extract_pure(s));
        }
        out
    }

    /// Bytes this cell contributes to a serialized frame.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.sub[0].len() + self.sub[1].len()
    }

    /// Append both sub-pixels to `out`.
    #[inline]
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.sub[0]);
        out.push_str(&self.sub[1]);
    }
}

impl Default for Cell {
    /// Default is [`Cell::blank`].
    fn default() -> Self {
        Self::blank()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_two_spaces() {
        let cell = Cell::blank();
        assert_eq!(cell.upper(), " ");
        assert_eq!(cell.lower(), " ");
        assert!(cell.is_blank());
        assert_eq!(cell, Cell::default());
    }

    #[test]
    fn styled_spaces_are_not_blank() {
        let cell = Cell::uniform("\x1b[40m \x1b[0m");
        assert!(!cell.is_blank());
        assert_eq!(cell.pure(), "  ");
    }

    #[test]
    fn sub_pixel_access() {
        let cell = Cell::new("a", "b");
        assert_eq!(cell.sub_pixel(0), Some("a"));
        assert_eq!(cell.sub_pixel(1), Some("b"));
        assert_eq!(cell.sub_pixel(2), None);
    }

    #[test]
    fn set_sub_pixel_in_and_out_of_range() {
        let mut cell = Cell::blank();
        assert!(cell.set_sub_pixel(Cell::LOWER, "x"));
        assert!(!cell.set_sub_pixel(2, "y"));
        assert_eq!(cell, Cell::new(" ", "x"));
    }

    #[test]
    fn write_to_concatenates_halves() {
        let cell = Cell::new("\x1b[31mA\x1b[0m", "B");
        let mut out = String::new();
        cell.write_to(&mut out);
        assert_eq!(out, "\x1b[31mA\x1b[0mB");
        assert_eq!(cell.byte_len(), out.len());
    }
}
