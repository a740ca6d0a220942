// SPDX-License-Identifier: MIT
//
// FrameBuffer — the shared surface every canvas flushes into.
//
// One FrameBuffer exists per terminal. Canvases copy their pixel grids into
// it at an offset; it then serializes itself and hands the result to the
// terminal in a single write, so a frame never appears half-drawn.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing, as in any cell grid. A row's
//     cells are contiguous, which is exactly the order `draw` walks them.
//
//   - Dimensions come from the terminal, never from writes. Terminal columns
//     are halved because each cell renders two glyphs side by side; one
//     column and one row are held back so the cursor never wraps or scrolls.
//
//   - Writes outside the current bounds are dropped. Shapes routinely hang
//     off the edge of the screen and that is not an error.
//
//   - The buffer remembers how far right and down anything was ever written.
//     `draw` stops there, so a small canvas on a large terminal serializes
//     only its own corner.
//
//   - The terminal is owned, not borrowed. Tests pass a `HeadlessTerminal`
//     and read back what was written.

use std::fmt;
use std::io;

use tracing::{debug, trace};

use crate::cell::Cell;
use crate::terminal::{Size, Terminal};

/// Row separator in a serialized frame.
const ROW_SEPARATOR: &str = "\r\n";

// ─── DrawStats ───────────────────────────────────────────────────────────────

/// What a single [`FrameBuffer::draw`] emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Rows serialized.
    pub rows: usize,
    /// Cells serialized per row.
    pub columns: usize,
    /// Bytes in the single write handed to the terminal.
    pub bytes: usize,
}

impl DrawStats {
    /// Total cells serialized (`rows × columns`).
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.rows * self.columns
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Buffer dimensions for a terminal of the given size.
///
/// `(cols - 1) / 2` cells across, `rows - 1` down. Degenerate terminals give
/// an empty buffer rather than underflowing.
#[inline]
#[must_use]
pub const fn buffer_size(term: Size) -> Size {
    Size {
        cols: term.cols.saturating_sub(1) / 2,
        rows: term.rows.saturating_sub(1),
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A terminal-sized grid of [`Cell`]s bound to the terminal it renders to.
///
/// # Examples
///
/// ```
/// use tc_term::buffer::FrameBuffer;
/// use tc_term::cell::Cell;
/// use tc_term::terminal::HeadlessTerminal;
///
/// let mut fb = FrameBuffer::new(HeadlessTerminal::new(21, 11));
/// assert_eq!((fb.width(), fb.height()), (10, 10));
///
/// fb.set_pixel(1, 0, Cell::uniform("#"));
/// let stats = fb.draw().unwrap();
/// assert_eq!(fb.terminal().last_write(), Some("  ##"));
/// assert_eq!(stats.bytes, 4);
/// ```
pub struct FrameBuffer<T: Terminal> {
    terminal: T,
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// One past the rightmost column ever written.
    max_width: u16,
    /// One past the lowest row ever written.
    max_height: u16,
}

impl<T: Terminal> FrameBuffer<T> {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer sized to `terminal`, filled with blank cells.
    ///
    /// The screen is not touched until the first [`resize`](Self::resize)
    /// or [`draw`](Self::draw).
    #[must_use]
    pub fn new(terminal: T) -> Self {
        let Size { cols, rows } = buffer_size(terminal.size());
        debug!(cols, rows, "framebuffer created");
        Self {
            terminal,
            width: cols,
            height: rows,
            cells: vec![Cell::blank(); usize::from(cols) * usize::from(rows)],
            max_width: 0,
            max_height: 0,
        }
    }

    // ─── Dimensions ──────────────────────────────────────────────────────

    /// Width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The furthest extent ever written, as `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn written_extent(&self) -> (u16, u16) {
        (self.max_width, self.max_height)
    }

    #[inline]
    #[must_use]
    pub const fn terminal(&self) -> &T {
        &self.terminal
    }

    #[inline]
    pub const fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert signed coordinates to an in-bounds position.
    fn locate(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    // ─── Cell Access ─────────────────────────────────────────────────────

    /// The cell at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        let (x, y) = self.locate(x, y)?;
        self.cells.get(self.index(x, y))
    }

    /// Store `cell` at `(x, y)`. Out-of-bounds writes are dropped.
    ///
    /// Returns whether the write landed.
    pub fn set_pixel(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        let Some((x, y)) = self.locate(x, y) else {
            return false;
        };
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        self.max_width = self.max_width.max(x + 1);
        self.max_height = self.max_height.max(y + 1);
        true
    }

    /// Iterate rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(usize::from(self.width.max(1)))
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    /// Re-derive dimensions from the terminal.
    ///
    /// Cells at coordinates present in both the old and new geometry keep
    /// their contents; newly exposed cells are blank. The physical screen is
    /// cleared once.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing the terminal fails.
    pub fn resize(&mut self) -> io::Result<()> {
        let Size { cols, rows } = buffer_size(self.terminal.size());

        if cols != self.width || rows != self.height {
            let mut cells = vec![Cell::blank(); usize::from(cols) * usize::from(rows)];
            let keep_w = usize::from(cols.min(self.width));
            let keep_h = usize::from(rows.min(self.height));
            let old_w = usize::from(self.width);
            let new_w = usize::from(cols);

            for y in 0..keep_h {
                let src = &mut self.cells[y * old_w..y * old_w + keep_w];
                for (dst, cell) in cells[y * new_w..y * new_w + keep_w].iter_mut().zip(src) {
                    *dst = std::mem::take(cell);
                }
            }

            debug!(
                from_cols = self.width,
                from_rows = self.height,
                cols,
                rows,
                "framebuffer resized"
            );
            self.width = cols;
            self.height = rows;
            self.cells = cells;
        }

        self.terminal.clear()
    }

    /// Resize if the terminal reported a size change since the last poll.
    ///
    /// Returns whether a resize happened.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing the terminal fails.
    pub fn poll_resize(&mut self) -> io::Result<bool> {
        if self.terminal.take_resize() {
            self.resize()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Serialize the written region into one string.
    ///
    /// Rows are bounded by the smaller of the buffer height and the written
    /// extent, columns likewise. Rows are joined with `\r\n`; there is no
    /// trailing separator.
    #[must_use]
    pub fn render(&self) -> (String, DrawStats) {
        let rows = usize::from(self.height.min(self.max_height));
        let columns = usize::from(self.width.min(self.max_width));
        let width = usize::from(self.width);

        let cell_bytes: usize = (0..rows)
            .flat_map(|y| &self.cells[y * width..y * width + columns])
            .map(Cell::byte_len)
            .sum();
        let mut out =
            String::with_capacity(cell_bytes + rows.saturating_sub(1) * ROW_SEPARATOR.len());

        for y in 0..rows {
            if y > 0 {
                out.push_str(ROW_SEPARATOR);
            }
            for cell in &self.cells[y * width..y * width + columns] {
                cell.write_to(&mut out);
            }
        }

        let stats = DrawStats {
            rows,
            columns,
            bytes: out.len(),
        };
        (out, stats)
    }

    /// Home the cursor and write the frame in a single terminal write.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal rejects the cursor move or the write.
    pub fn draw(&mut self) -> io::Result<DrawStats> {
        let (frame, stats) = self.render();
        self.terminal.cursor_to(0, 0)?;
        self.terminal.write(&frame)?;
        trace!(
            rows = stats.rows,
            columns = stats.columns,
            bytes = stats.bytes,
            "framebuffer drawn"
        );
        Ok(stats)
    }
}

impl<T: Terminal> fmt::Debug for FrameBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
