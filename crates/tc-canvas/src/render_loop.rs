// SPDX-License-Identifier: MIT
//
// RenderLoop — cooperative frame scheduling for one or more canvases.
//
// The loop owns the FrameBuffer and every canvas drawn into it. Each canvas
// has a deadline derived from its frame interval. A tick:
//
//   1. polls the terminal for a resize and, if there was one, rebuilds the
//      FrameBuffer before anything is drawn
//   2. draws every canvas whose deadline has passed, in the order the
//      canvases were added
//
// Nothing runs in parallel and a tick never re-enters itself, so canvases
// that overlap simply overwrite each other: the last one drawn in a tick
// wins those cells.
//
// Changing a canvas's frame rate bumps its generation. The next tick sees
// the new generation and restarts that canvas's timer from now, dropping
// whatever deadline the old rate had scheduled.
//
// `run_until` is the blocking driver. It sleeps until the nearest deadline,
// but never longer than `LoopConfig::idle_sleep`, so a resize is noticed
// within one idle period even when every canvas runs at a low frame rate.

use std::thread;
use std::time::{Duration, Instant};

use tc_term::{FrameBuffer, Terminal};
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::Result;

// ─── LoopConfig ──────────────────────────────────────────────────────────────

/// Timing configuration for [`RenderLoop::run_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Longest single sleep between ticks. Default: 8333µs (120 Hz).
    pub idle_sleep: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            idle_sleep: Duration::from_micros(8333), // 120 Hz
        }
    }
}

// ─── CanvasId ────────────────────────────────────────────────────────────────

/// Handle to a canvas registered with a [`RenderLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasId(usize);

struct Scheduled {
    canvas: Canvas,
    next_due: Instant,
    generation: u64,
}

impl Scheduled {
    /// Restart the timer if the frame rate changed since the last look.
    fn sync_timer(&mut self, now: Instant) {
        let generation = self.canvas.generation();
        if generation != self.generation {
            self.generation = generation;
            self.next_due = now + self.canvas.interval();
        }
    }

    /// Move the deadline forward one interval. A canvas that fell behind is
    /// rescheduled from `now` instead of bursting to catch up.
    fn advance(&mut self, now: Instant) {
        let interval = self.canvas.interval();
        self.next_due += interval;
        if self.next_due < now {
            self.next_due = now + interval;
        }
    }
}

// ─── RenderLoop ──────────────────────────────────────────────────────────────

/// Drives frame timing for every canvas drawn into one [`FrameBuffer`].
///
/// ```
/// use std::time::Instant;
/// use tc_canvas::{Canvas, CanvasOptions, RenderLoop};
/// use tc_term::{FrameBuffer, HeadlessTerminal};
///
/// let fb = FrameBuffer::new(HeadlessTerminal::new(21, 11));
/// let mut render = RenderLoop::new(fb);
/// render.add(Canvas::new(10, 10, CanvasOptions::default()).unwrap());
///
/// assert_eq!(render.tick(Instant::now()).unwrap(), 1);
/// assert_eq!(render.framebuffer().terminal().writes().len(), 1);
/// ```
pub struct RenderLoop<T: Terminal> {
    framebuffer: FrameBuffer<T>,
    canvases: Vec<Option<Scheduled>>,
    config: LoopConfig,
    frames: u64,
}

impl<T: Terminal> RenderLoop<T> {
    #[must_use]
    pub fn new(framebuffer: FrameBuffer<T>) -> Self {
        Self::with_config(framebuffer, LoopConfig::default())
    }

    #[must_use]
    pub const fn with_config(framebuffer: FrameBuffer<T>, config: LoopConfig) -> Self {
        Self {
            framebuffer,
            canvases: Vec::new(),
            config,
            frames: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn framebuffer(&self) -> &FrameBuffer<T> {
        &self.framebuffer
    }

    #[inline]
    pub const fn framebuffer_mut(&mut self) -> &mut FrameBuffer<T> {
        &mut self.framebuffer
    }

    /// Frames drawn so far, across all canvases.
    #[inline]
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Register a canvas. Its first frame is due immediately.
    pub fn add(&mut self, canvas: Canvas) -> CanvasId {
        let id = CanvasId(self.canvases.len());
        let generation = canvas.generation();
        self.canvases.push(Some(Scheduled {
            canvas,
            next_due: Instant::now(),
            generation,
        }));
        debug!(id = id.0, "canvas scheduled");
        id
    }

    /// Stop a canvas's timer and hand the canvas back.
    pub fn remove(&mut self, id: CanvasId) -> Option<Canvas> {
        let removed = self.canvases.get_mut(id.0)?.take()?;
        debug!(id = id.0, "canvas unscheduled");
        Some(removed.canvas)
    }

    #[must_use]
    pub fn canvas(&self, id: CanvasId) -> Option<&Canvas> {
        self.canvases.get(id.0)?.as_ref().map(|s| &s.canvas)
    }

    pub fn canvas_mut(&mut self, id: CanvasId) -> Option<&mut Canvas> {
        self.canvases.get_mut(id.0)?.as_mut().map(|s| &mut s.canvas)
    }

    /// Number of scheduled canvases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.canvases.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle a pending resize, then draw every canvas that is due at `now`.
    ///
    /// Returns the number of canvases drawn.
    ///
    /// # Errors
    ///
    /// The first error from a resize or a canvas's frame. Canvases after the
    /// failing one are not drawn this tick.
    pub fn tick(&mut self, now: Instant) -> Result<usize> {
        self.framebuffer.poll_resize()?;

        let mut drawn = 0;
        for slot in self.canvases.iter_mut().flatten() {
            slot.sync_timer(now);
            if slot.next_due > now {
                continue;
            }
            slot.advance(now);
            slot.canvas.draw_frame(&mut self.framebuffer)?;
            drawn += 1;
            self.frames += 1;
        }
        Ok(drawn)
    }

    /// The earliest pending deadline, if any canvas is scheduled.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.canvases
            .iter()
            .flatten()
            .map(|s| s.next_due)
            .min()
    }

    /// Tick until `stop` returns `true`, sleeping between deadlines.
    ///
    /// `stop` is checked before every tick.
    ///
    /// # Errors
    ///
    /// The first error returned by [`tick`](Self::tick).
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<()>
    where
        F: FnMut(&Self) -> bool,
    {
        while !stop(self) {
            self.tick(Instant::now())?;

            let sleep = self.next_deadline().map_or(self.config.idle_sleep, |due| {
                due.saturating_duration_since(Instant::now())
                    .min(self.config.idle_sleep)
            });
            if !sleep.is_zero() {
                thread::sleep(sleep);
            }
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasOptions;
    use crate::error::CanvasError;
    use tc_term::{Cell, ColorSpec, HeadlessTerminal};

    fn render_loop() -> RenderLoop<HeadlessTerminal> {
        RenderLoop::new(FrameBuffer::new(HeadlessTerminal::new(21, 11)))
    }

    fn canvas_at(fps: f64) -> Canvas {
        Canvas::new(
            4,
            4,
            CanvasOptions {
                frame_rate: fps,
                ..CanvasOptions::default()
            },
        )
        .unwrap()
    }

    // ── LoopConfig ──────────────────────────────────────────────────────

    #[test]
    fn default_idle_sleep_is_120hz() {
        assert_eq!(LoopConfig::default().idle_sleep, Duration::from_micros(8333));
    }

    // ── Scheduling ──────────────────────────────────────────────────────

    #[test]
    fn first_frame_is_immediate_then_waits_an_interval() {
        let mut rl = render_loop();
        rl.add(canvas_at(10.0));
        let t0 = Instant::now();

        assert_eq!(rl.tick(t0).unwrap(), 1);
        assert_eq!(rl.tick(t0 + Duration::from_millis(50)).unwrap(), 0);
        assert_eq!(rl.tick(t0 + Duration::from_millis(150)).unwrap(), 1);
        assert_eq!(rl.frames(), 2);
    }

    #[test]
    fn zero_fps_draws_every_tick() {
        let mut rl = render_loop();
        rl.add(canvas_at(0.0));
        let t0 = Instant::now();
        for i in 0..5 {
            assert_eq!(rl.tick(t0 + Duration::from_micros(i)).unwrap(), 1);
        }
    }

    #[test]
    fn frame_rate_change_restarts_timer() {
        let mut rl = render_loop();
        let id = rl.add(canvas_at(1.0));
        let t0 = Instant::now();
        rl.tick(t0).unwrap();

        rl.canvas_mut(id).unwrap().set_frame_rate(100.0).unwrap();
        let t1 = t0 + Duration::from_millis(5);
        // New timer starts at t1; first frame due at t1 + 10ms.
        assert_eq!(rl.tick(t1).unwrap(), 0);
        assert_eq!(rl.tick(t1 + Duration::from_millis(10)).unwrap(), 1);
    }

    #[test]
    fn canvases_draw_in_insertion_order_last_wins() {
        let mut rl = render_loop();
        let mut first = canvas_at(0.0);
        first.on_draw(|c| c.draw_pixel(0.0, 0.0, &ColorSpec::from("red"), None));
        let mut second = canvas_at(0.0);
        second.on_draw(|c| c.draw_pixel(0.0, 0.0, &ColorSpec::from("blue"), None));
        rl.add(first);
        rl.add(second);

        assert_eq!(rl.tick(Instant::now()).unwrap(), 2);
        assert_eq!(
            rl.framebuffer().get(0, 0),
            Some(&Cell::uniform("\x1b[44m \x1b[0m"))
        );
        assert_eq!(rl.framebuffer().terminal().writes().len(), 2);
    }

    #[test]
    fn removed_canvas_stops_drawing() {
        let mut rl = render_loop();
        let id = rl.add(canvas_at(0.0));
        assert_eq!(rl.len(), 1);
        assert!(rl.remove(id).is_some());
        assert!(rl.remove(id).is_none());
        assert!(rl.is_empty());
        assert_eq!(rl.tick(Instant::now()).unwrap(), 0);
        assert_eq!(rl.next_deadline(), None);
    }

    // ── Resize & errors ─────────────────────────────────────────────────

    #[test]
    fn resize_is_handled_before_drawing() {
        let mut rl = render_loop();
        rl.add(canvas_at(0.0));
        rl.framebuffer_mut().terminal_mut().set_size(41, 21);

        rl.tick(Instant::now()).unwrap();
        let fb = rl.framebuffer();
        assert_eq!((fb.width(), fb.height()), (20, 20));
        assert_eq!(fb.terminal().clears(), 1);
    }

    #[test]
    fn callback_error_propagates_from_tick() {
        let mut rl = render_loop();
        let mut canvas = canvas_at(0.0);
        canvas.on_draw(|_| Err(CanvasError::Draw("boom".into())));
        rl.add(canvas);

        assert!(matches!(
            rl.tick(Instant::now()),
            Err(CanvasError::Draw(msg)) if msg == "boom"
        ));
        assert!(rl.framebuffer().terminal().writes().is_empty());
    }

    #[test]
    fn run_until_stops_on_predicate() {
        let mut rl = RenderLoop::with_config(
            FrameBuffer::new(HeadlessTerminal::new(11, 6)),
            LoopConfig {
                idle_sleep: Duration::from_millis(1),
            },
        );
        rl.add(canvas_at(0.0));
        rl.run_until(|rl| rl.frames() >= 3).unwrap();
        assert_eq!(rl.frames(), 3);
    }
}
