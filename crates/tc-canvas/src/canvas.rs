// SPDX-License-Identifier: MIT
//
// Canvas — a fixed-size drawing surface with default colors and a frame rate.
//
// A canvas owns a `PixelGrid` and knows nothing about the terminal until a
// frame is drawn. Drawing a frame is three steps, all synchronous:
//
//   1. run the user's draw callback, which paints this tick's pixels
//   2. copy every grid cell into the shared FrameBuffer, shifted by the
//      experimental top/left offset
//   3. ask the FrameBuffer to render
//
// If the callback fails, steps 2 and 3 are skipped. The FrameBuffer never
// sees a half-painted grid.
//
// Pixels are colored spaces: both halves of a pixel cell are a space with
// the pixel's color applied as a background. Text is different. Its glyphs
// go into individual sub-pixels, two per column, each carrying the canvas's
// foreground and background.

use std::fmt;
use std::time::Duration;

use tc_term::color::{self, Style};
use tc_term::{Cell, ColorSpec, DrawStats, FrameBuffer, Terminal};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{CanvasError, Result};
use crate::grid::PixelGrid;
use crate::shape::{Shape, round_half_up};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Offsets and flags that are not part of the stable surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Experimental {
    /// Rows to shift the canvas down when flushing into the frame buffer.
    pub top: i32,
    /// Columns to shift the canvas right when flushing.
    pub left: i32,
    /// Recorded, not acted on.
    pub fps_stabilisation: bool,
}

/// Construction options for a [`Canvas`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    /// Default color for shapes and text (default `"white"`).
    pub foreground: ColorSpec,
    /// Color a cleared canvas is filled with (default `"black"`).
    pub background: ColorSpec,
    /// Frames per second. Zero or negative means "as fast as possible".
    pub frame_rate: f64,
    /// Flush offsets and flags outside the stable surface.
    pub experimental: Experimental,
}

impl CanvasOptions {
    /// Default frame rate.
    pub const DEFAULT_FRAME_RATE: f64 = 60.0;
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            foreground: ColorSpec::from("white"),
            background: ColorSpec::from("black"),
            frame_rate: Self::DEFAULT_FRAME_RATE,
            experimental: Experimental::default(),
        }
    }
}

/// Interval between frames at `fps`, to the nearest nanosecond.
/// Non-positive rates give zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn frame_interval(fps: f64) -> Duration {
    if fps <= 0.0 {
        Duration::ZERO
    } else {
        // Saturates for vanishingly small rates.
        Duration::from_nanos((1e9 / fps).round() as u64)
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

/// The per-tick draw hook. Receives the canvas it is attached to.
pub type DrawCallback = Box<dyn FnMut(&mut Canvas) -> Result<()>>;

/// A drawing surface of `width × height` pixels.
///
/// # Examples
///
/// ```
/// use tc_canvas::{Canvas, CanvasOptions};
/// use tc_canvas::shape::{Line, Rasterize};
///
/// let mut canvas = Canvas::new(10, 5, CanvasOptions::default()).unwrap();
/// canvas.draw_shape(&Line::new(0.0, 0.0, 9.0, 4.0).rasterize()).unwrap();
/// canvas.draw_text(0, 4, "hi").unwrap();
/// assert_eq!(canvas.grid().get(0, 4).unwrap().pure(), "hi");
/// ```
pub struct Canvas {
    width: u16,
    height: u16,
    options: CanvasOptions,
    grid: PixelGrid,
    on_draw: Option<DrawCallback>,
    interval: Duration,
    /// Bumped on every frame-rate change so a scheduler can drop its
    /// pending deadline.
    generation: u64,
}

impl Canvas {
    /// Create a cleared canvas.
    ///
    /// # Errors
    ///
    /// - [`CanvasError::MissingDimension`] if `width` or `height` is zero.
    /// - [`CanvasError::InvalidFrameRate`] if the frame rate is NaN or infinite.
    /// - [`CanvasError::Color`] if the background color cannot be decoded.
    pub fn new(width: u16, height: u16, options: CanvasOptions) -> Result<Self> {
        if width == 0 {
            return Err(CanvasError::MissingDimension("width"));
        }
        if height == 0 {
            return Err(CanvasError::MissingDimension("height"));
        }

        let fps = options.frame_rate;
        let mut canvas = Self {
            width,
            height,
            grid: PixelGrid::new(width, height, Cell::blank()),
            options,
            on_draw: None,
            interval: Duration::ZERO,
            generation: 0,
        };
        canvas.clear()?;
        canvas.set_frame_rate(fps)?;

        debug!(
            width,
            height,
            foreground = %canvas.options.foreground,
            background = %canvas.options.background,
            "canvas created"
        );
        Ok(canvas)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

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

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &CanvasOptions {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    #[inline]
    #[must_use]
    pub const fn frame_rate(&self) -> f64 {
        self.options.frame_rate
    }

    /// Time between frames.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes whenever [`set_frame_rate`](Self::set_frame_rate) is called.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Change the default colors. Takes effect on the next clear or draw.
    pub fn set_colors(&mut self, foreground: ColorSpec, background: ColorSpec) {
        self.options.foreground = foreground;
        self.options.background = background;
    }

    // ─── Grid ────────────────────────────────────────────────────────────

    /// Replace the grid with one filled by background-colored spaces.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if the background color cannot be decoded.
    pub fn clear(&mut self) -> Result<()> {
        let blank = color::keyword(" ", &self.options.background, true)?;
        self.grid = PixelGrid::new(self.width, self.height, Cell::uniform(blank));
        Ok(())
    }

    /// The cell a pixel of these colors is drawn as.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if either color cannot be decoded.
    pub fn pixel_cell(&self, main: &ColorSpec, secondary: Option<&ColorSpec>) -> Result<Cell> {
        let upper = color::keyword(" ", main, true)?;
        let lower = match secondary {
            Some(spec) if spec != main => color::keyword(" ", spec, true)?,
            _ => upper.clone(),
        };
        Ok(Cell::new(upper, lower))
    }

    /// Store a prepared cell at integer coordinates. Out of bounds is a
    /// no-op; returns whether the cell landed.
    pub fn put_pixel(&mut self, x: i32, y: i32, cell: &Cell) -> bool {
        self.grid.set(x, y, cell.clone())
    }

    /// Paint one pixel. Coordinates are rounded; anything outside the
    /// canvas is ignored.
    ///
    /// The upper half uses `main`, the lower half `secondary` (defaulting to
    /// `main`).
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if either color cannot be decoded, even when
    /// the pixel would have been dropped.
    pub fn draw_pixel(
        &mut self,
        x: f64,
        y: f64,
        main: &ColorSpec,
        secondary: Option<&ColorSpec>,
    ) -> Result<()> {
        let cell = self.pixel_cell(main, secondary)?;
        self.put_pixel(round_half_up(x), round_half_up(y), &cell);
        Ok(())
    }

    /// Paint every coordinate of `shape` in the default foreground.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if the foreground cannot be decoded.
    pub fn draw_shape(&mut self, shape: &Shape) -> Result<()> {
        let main = self.options.foreground.clone();
        self.draw_shape_with(shape, &main, None)
    }

    /// Paint every coordinate of `shape` with explicit colors.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if either color cannot be decoded.
    pub fn draw_shape_with(
        &mut self,
        shape: &Shape,
        main: &ColorSpec,
        secondary: Option<&ColorSpec>,
    ) -> Result<()> {
        let cell = self.pixel_cell(main, secondary)?;
        for (x, y) in shape.coordinates() {
            self.put_pixel(x, y, &cell);
        }
        Ok(())
    }

    /// Write `text` starting at column `x` of row `y`.
    ///
    /// The text is styled once with the default foreground and background.
    /// Each grapheme then gets that same style and goes into a sub-pixel:
    /// even glyphs in the upper half, odd glyphs in the lower, advancing one
    /// column every two glyphs. Columns outside the canvas are skipped; a
    /// row outside the canvas makes the whole call a no-op.
    ///
    /// # Errors
    ///
    /// [`CanvasError::Color`] if a default color cannot be decoded.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        if y < 0 || y >= i32::from(self.height) {
            return Ok(());
        }

        let styled = color::colorize(text, &self.options.foreground, &self.options.background)?;
        let style = Style::from_escaped(&styled);
        let pure = color::extract_pure(&styled);

        for (i, glyph) in pure.graphemes(true).enumerate() {
            let Ok(offset) = i32::try_from(i / 2) else {
                break;
            };
            let column = x.saturating_add(offset);
            if column < 0 || column >= i32::from(self.width) {
                continue;
            }
            self.grid.set_sub_pixel(column, y, i % 2, style.paint(glyph));
        }
        Ok(())
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Install the per-tick draw hook, replacing any previous one.
    pub fn on_draw<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Self) -> Result<()> + 'static,
    {
        self.on_draw = Some(Box::new(callback));
    }

    fn run_callback(&mut self) -> Result<()> {
        let Some(mut callback) = self.on_draw.take() else {
            return Ok(());
        };
        let result = callback(self);
        // A callback that installed a replacement keeps the replacement.
        if self.on_draw.is_none() {
            self.on_draw = Some(callback);
        }
        result
    }

    /// Copy the grid into `fb` at the experimental offset.
    pub fn flush<T: Terminal>(&self, fb: &mut FrameBuffer<T>) {
        let Experimental { top, left, .. } = self.options.experimental;
        for (x, y, cell) in self.grid.iter() {
            fb.set_pixel(
                i32::from(x).saturating_add(left),
                i32::from(y).saturating_add(top),
                cell.clone(),
            );
        }
    }

    /// Run the draw hook, flush into `fb`, and render.
    ///
    /// # Errors
    ///
    /// Whatever the draw hook returns, in which case nothing is flushed, or
    /// an I/O error from the terminal.
    pub fn draw_frame<T: Terminal>(&mut self, fb: &mut FrameBuffer<T>) -> Result<DrawStats> {
        if let Err(err) = self.run_callback() {
            warn!(%err, "draw callback failed, frame skipped");
            return Err(err);
        }
        self.flush(fb);
        Ok(fb.draw()?)
    }

    /// Change the frame rate and restart the frame timer.
    ///
    /// # Errors
    ///
    /// [`CanvasError::InvalidFrameRate`] for NaN or infinite rates.
    pub fn set_frame_rate(&mut self, fps: f64) -> Result<()> {
        if !fps.is_finite() {
            return Err(CanvasError::InvalidFrameRate(fps));
        }
        self.options.frame_rate = fps;
        self.interval = frame_interval(fps);
        self.generation += 1;
        debug!(fps, interval = ?self.interval, "frame rate set");
        Ok(())
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("options", &self.options)
            .field("interval", &self.interval)
            .field("on_draw", &self.on_draw.is_some())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Circle, Line, Rasterize, Rectangle, Triangle};
    use pretty_assertions::assert_eq;
    use tc_term::{ColorError, HeadlessTerminal};

    fn canvas(w: u16, h: u16) -> Canvas {
        Canvas::new(w, h, CanvasOptions::default()).unwrap()
    }

    fn red() -> ColorSpec {
        ColorSpec::from("red")
    }

    const RED_PX: &str = "\x1b[41m \x1b[0m";
    const BLACK_PX: &str = "\x1b[40m \x1b[0m";

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Canvas::new(0, 5, CanvasOptions::default()),
            Err(CanvasError::MissingDimension("width"))
        ));
        assert!(matches!(
            Canvas::new(5, 0, CanvasOptions::default()),
            Err(CanvasError::MissingDimension("height"))
        ));
    }

    #[test]
    fn defaults() {
        let c = canvas(4, 3);
        assert_eq!(c.options().foreground, ColorSpec::from("white"));
        assert_eq!(c.options().background, ColorSpec::from("black"));
        assert_eq!(c.options().experimental, Experimental::default());
        assert_eq!(c.frame_rate(), 60.0);
        assert_eq!(c.interval(), Duration::from_nanos(16_666_667));
    }

    #[test]
    fn bad_background_fails_construction() {
        let options = CanvasOptions {
            background: ColorSpec::Hex("#12".into()),
            ..CanvasOptions::default()
        };
        assert!(matches!(
            Canvas::new(2, 2, options),
            Err(CanvasError::Color(_))
        ));
    }

    #[test]
    fn malformed_hex_string_background_fails_construction() {
        let options = CanvasOptions {
            background: "#12".into(),
            ..CanvasOptions::default()
        };
        assert!(matches!(
            Canvas::new(2, 2, options),
            Err(CanvasError::Color(ColorError::InvalidHex { .. }))
        ));
    }

    #[test]
    fn bad_frame_rate_fails_construction() {
        let options = CanvasOptions {
            frame_rate: f64::NAN,
            ..CanvasOptions::default()
        };
        assert!(matches!(
            Canvas::new(2, 2, options),
            Err(CanvasError::InvalidFrameRate(_))
        ));
    }

    // ── Clear ───────────────────────────────────────────────────────────

    #[test]
    fn clear_fills_with_background() {
        let mut c = canvas(3, 2);
        c.draw_pixel(1.0, 1.0, &red(), None).unwrap();
        c.clear().unwrap();
        assert!(c.grid().iter().all(|(_, _, cell)| *cell == Cell::uniform(BLACK_PX)));
    }

    #[test]
    fn clear_uses_current_background() {
        let mut c = canvas(1, 1);
        c.set_colors(ColorSpec::from("white"), ColorSpec::from(4u8));
        c.clear().unwrap();
        assert_eq!(c.grid().get(0, 0), Some(&Cell::uniform("\x1b[44m \x1b[0m")));
    }

    // ── Pixels ──────────────────────────────────────────────────────────

    #[test]
    fn draw_pixel_rounds_and_colors_both_halves() {
        let mut c = canvas(4, 4);
        c.draw_pixel(1.4, 2.5, &red(), None).unwrap();
        assert_eq!(c.grid().get(1, 3), Some(&Cell::uniform(RED_PX)));
    }

    #[test]
    fn draw_pixel_secondary_color() {
        let mut c = canvas(2, 2);
        c.draw_pixel(0.0, 0.0, &red(), Some(&ColorSpec::from("black")))
            .unwrap();
        assert_eq!(c.grid().get(0, 0), Some(&Cell::new(RED_PX, BLACK_PX)));
    }

    #[test]
    fn draw_pixel_out_of_bounds_is_noop() {
        let mut c = canvas(3, 5);
        let before = c.grid().clone();
        for (x, y) in [(-1.0, 0.0), (3.0, 0.0), (0.0, -1.0), (0.0, 5.0), (-0.6, 0.0)] {
            c.draw_pixel(x, y, &red(), None).unwrap();
        }
        assert_eq!(c.grid(), &before);
    }

    #[test]
    fn y_is_bounded_by_height_not_width() {
        let mut c = canvas(2, 6);
        c.draw_pixel(0.0, 4.0, &red(), None).unwrap();
        assert_eq!(c.grid().get(0, 4), Some(&Cell::uniform(RED_PX)));
    }

    #[test]
    fn bad_color_is_an_error() {
        let mut c = canvas(2, 2);
        let err = c.draw_pixel(0.0, 0.0, &ColorSpec::Hex("zzzzzz".into()), None);
        assert!(matches!(err, Err(CanvasError::Color(_))));
    }

    // ── Shapes ──────────────────────────────────────────────────────────

    #[test]
    fn draw_shape_uses_foreground() {
        let mut c = canvas(5, 1);
        c.draw_shape(&Line::new(0.0, 0.0, 2.0, 0.0).rasterize())
            .unwrap();
        let white = Cell::uniform("\x1b[47m \x1b[0m");
        assert_eq!(c.grid().get(2, 0), Some(&white));
        assert_eq!(c.grid().get(3, 0), Some(&Cell::uniform(BLACK_PX)));
    }

    #[test]
    fn static_draw_matches_shape_draw() {
        let shapes: Vec<Box<dyn Rasterize>> = vec![
            Box::new(Line::new(-3.0, 1.0, 12.0, 7.0)),
            Box::new(Circle::new(1.0, 1.0, 9.0, 9.0, 5.0).unwrap()),
            Box::new(Rectangle::new(2.0, 2.0, 15.0, 6.0)),
            Box::new(Triangle::new(0.0, 0.0, 9.0, 2.0, 4.0, 9.0)),
        ];
        for shape in shapes {
            let mut direct = canvas(10, 10);
            let mut via_map = canvas(10, 10);
            shape.draw(&mut direct, &red(), None).unwrap();
            via_map
                .draw_shape_with(&shape.rasterize(), &red(), None)
                .unwrap();
            assert_eq!(direct.grid(), via_map.grid(), "{}", shape.kind());
        }
    }

    // ── Text ────────────────────────────────────────────────────────────

    #[test]
    fn text_fills_sub_pixels_in_pairs() {
        let mut c = canvas(4, 2);
        c.draw_text(1, 0, "abc").unwrap();

        let g = c.grid();
        assert_eq!(g.get(1, 0).unwrap().pure(), "ab");
        assert_eq!(g.get(2, 0).unwrap().pure(), "c ");
        assert_eq!(g.get(0, 0), Some(&Cell::uniform(BLACK_PX)));

        let a = g.get(1, 0).unwrap().upper().to_owned();
        assert_eq!(a, "\x1b[40m\x1b[37ma\x1b[0m\x1b[0m");
    }

    #[test]
    fn text_columns_outside_are_skipped() {
        let mut c = canvas(2, 1);
        c.draw_text(-1, 0, "wxyz").unwrap();
        // "wx" lands at column -1 and is dropped; "yz" fills column 0.
        assert_eq!(c.grid().get(0, 0).unwrap().pure(), "yz");
        assert_eq!(c.grid().get(1, 0), Some(&Cell::uniform(BLACK_PX)));
    }

    #[test]
    fn text_row_outside_is_noop() {
        let mut c = canvas(3, 3);
        let before = c.grid().clone();
        c.draw_text(0, 3, "hi").unwrap();
        c.draw_text(0, -1, "hi").unwrap();
        assert_eq!(c.grid(), &before);
    }

    #[test]
    fn text_walks_graphemes() {
        let mut c = canvas(2, 1);
        c.draw_text(0, 0, "e\u{301}x").unwrap();
        assert_eq!(c.grid().get(0, 0).unwrap().pure(), "e\u{301}x");
    }

    #[test]
    fn text_containing_sgr_digits_keeps_style() {
        let mut c = canvas(2, 1);
        c.draw_text(0, 0, "40").unwrap();
        let cell = c.grid().get(0, 0).unwrap();
        assert_eq!(cell.upper(), "\x1b[40m\x1b[37m4\x1b[0m\x1b[0m");
        assert_eq!(cell.lower(), "\x1b[40m\x1b[37m0\x1b[0m\x1b[0m");
    }

    // ── Frame rate ──────────────────────────────────────────────────────

    #[test]
    fn frame_rate_interval() {
        let mut c = canvas(1, 1);
        let g = c.generation();
        c.set_frame_rate(10.0).unwrap();
        assert_eq!(c.interval(), Duration::from_millis(100));
        assert_eq!(c.generation(), g + 1);

        c.set_frame_rate(0.0).unwrap();
        assert_eq!(c.interval(), Duration::ZERO);
        c.set_frame_rate(-5.0).unwrap();
        assert_eq!(c.interval(), Duration::ZERO);
    }

    #[test]
    fn non_finite_frame_rate_is_rejected() {
        let mut c = canvas(1, 1);
        c.set_frame_rate(30.0).unwrap();
        assert!(c.set_frame_rate(f64::INFINITY).is_err());
        assert_eq!(c.frame_rate(), 30.0);
    }

    // ── Frames ──────────────────────────────────────────────────────────

    #[test]
    fn draw_frame_runs_callback_then_flushes() {
        let mut c = canvas(3, 2);
        c.on_draw(|canvas| canvas.draw_pixel(2.0, 1.0, &ColorSpec::from("red"), None));
        let mut fb = FrameBuffer::new(HeadlessTerminal::new(7, 3));

        let stats = c.draw_frame(&mut fb).unwrap();
        assert_eq!((stats.rows, stats.columns), (2, 3));
        assert_eq!(fb.get(2, 1), Some(&Cell::uniform(RED_PX)));
        assert_eq!(fb.get(0, 0), Some(&Cell::uniform(BLACK_PX)));
        assert_eq!(fb.terminal().writes().len(), 1);
    }

    #[test]
    fn failing_callback_skips_flush() {
        let mut c = canvas(2, 2);
        c.on_draw(|_| Err(CanvasError::Draw("nope".into())));
        let mut fb = FrameBuffer::new(HeadlessTerminal::new(5, 3));

        assert!(matches!(c.draw_frame(&mut fb), Err(CanvasError::Draw(_))));
        assert!(fb.get(0, 0).is_some_and(Cell::is_blank));
        assert!(fb.terminal().writes().is_empty());
    }

    #[test]
    fn callback_survives_across_frames() {
        let mut c = canvas(1, 1);
        let mut ticks = 0;
        c.on_draw(move |canvas| {
            ticks += 1;
            canvas.draw_text(0, 0, &ticks.to_string())
        });
        let mut fb = FrameBuffer::new(HeadlessTerminal::new(3, 2));

        c.draw_frame(&mut fb).unwrap();
        c.draw_frame(&mut fb).unwrap();
        assert_eq!(c.grid().get(0, 0).unwrap().upper(), "\x1b[40m\x1b[37m2\x1b[0m\x1b[0m");
    }

    #[test]
    fn flush_applies_offset() {
        let options = CanvasOptions {
            experimental: Experimental {
                top: 1,
                left: 2,
                fps_stabilisation: true,
            },
            ..CanvasOptions::default()
        };
        let mut c = Canvas::new(2, 2, options).unwrap();
        c.draw_pixel(0.0, 0.0, &red(), None).unwrap();
        let mut fb = FrameBuffer::new(HeadlessTerminal::new(11, 6));

        c.draw_frame(&mut fb).unwrap();
        assert_eq!(fb.get(2, 1), Some(&Cell::uniform(RED_PX)));
        assert!(fb.get(0, 0).is_some_and(Cell::is_blank));
        assert_eq!(fb.written_extent(), (4, 3));
    }
}
