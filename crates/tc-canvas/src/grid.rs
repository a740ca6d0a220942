// SPDX-License-Identifier: MIT
//
// PixelGrid — a canvas's private width×height surface.
//
// Logically dense: every coordinate in bounds has a cell. Physically, a row
// is only allocated the first time something writes to it; until then it
// reads as the grid's fill cell. A freshly cleared canvas therefore costs
// one `Vec` of `None`s, not `width × height` string pairs.

use tc_term::Cell;

/// A lazily materialized grid of [`Cell`]s.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    width: u16,
    height: u16,
    fill: Cell,
    rows: Vec<Option<Vec<Cell>>>,
}

impl PixelGrid {
    /// A grid where every cell reads as `fill`.
    #[must_use]
    pub fn new(width: u16, height: u16, fill: Cell) -> Self {
        Self {
            width,
            height,
            fill,
            rows: vec![None; usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The cell unwritten coordinates read as.
    #[inline]
    #[must_use]
    pub const fn fill(&self) -> &Cell {
        &self.fill
    }

    /// Convert signed coordinates to indices, or `None` if out of bounds.
    fn locate(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.height)?;
        Some((usize::from(x), usize::from(y)))
    }

    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        let (x, y) = self.locate(x, y)?;
        match &self.rows[y] {
            Some(row) => row.get(x),
            None => Some(&self.fill),
        }
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let (x, y) = self.locate(x, y)?;
        let (width, fill) = (usize::from(self.width), &self.fill);
        self.rows[y]
            .get_or_insert_with(|| vec![fill.clone(); width])
            .get_mut(x)
    }

    /// Store a whole cell. Returns `false` (and changes nothing) when out of
    /// bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.cell_mut(x, y) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Replace one half of a cell.
    pub fn set_sub_pixel(&mut self, x: i32, y: i32, index: usize, glyph: String) -> bool {
        if index > Cell::LOWER {
            return false;
        }
        self.cell_mut(x, y)
            .is_some_and(|cell| cell.set_sub_pixel(index, glyph))
    }

    /// Every cell with its coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        (0..self.height).zip(&self.rows).flat_map(move |(y, row)| {
            (0..self.width).map(move |x| {
                let cell = row
                    .as_ref()
                    .and_then(|r| r.get(usize::from(x)))
                    .unwrap_or(&self.fill);
                (x, y, cell)
            })
        })
    }

    /// Rows that have been written to at least once.
    #[must_use]
    pub fn materialized_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }
}

impl PartialEq for PixelGrid {
    /// Grids are equal when every coordinate reads the same, however the
    /// rows happen to be stored.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, _, a), (_, _, b))| a == b)
    }
}

impl Eq for PixelGrid {}

// ─── Tests ───────────────────────────────────────────────────────────────────
