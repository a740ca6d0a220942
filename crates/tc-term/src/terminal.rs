// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal I/O boundary.
//
// Safety: This module uses `unsafe` for ioctl (TIOCGWINSZ) and sigaction
// (SIGWINCH). These are the standard POSIX interfaces for terminal geometry
// and resize notification; each unsafe block is minimal.
//
// The rendering core needs exactly five things from a terminal: its size,
// a way to write text, a way to clear it, a way to move the cursor, and a
// resize notification. The `Terminal` trait is that contract and nothing
// more. Raw mode, alternate screens and input handling belong to whoever
// embeds the canvas.
//
// Two implementations:
//
//   StdoutTerminal   — the real thing. Geometry via ioctl, resize via a
//                      SIGWINCH handler that flips an AtomicBool, output via
//                      one locked write per call. Hides the cursor while
//                      alive and restores it on drop.
//
//   HeadlessTerminal — an in-memory stand-in with a settable size. Records
//                      every write, clear and cursor move so tests can assert
//                      on exactly what the frame buffer emitted.

use std::io::{self, Write};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Fallback when the real size cannot be determined (pipes, CI).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

// ─── Terminal Trait ─────────────────────────────────────────────────────────

/// The operations the rendering core performs on a terminal.
pub trait Terminal {
    /// Current geometry in character cells.
    fn size(&self) -> Size;

    /// Write text verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the underlying writer's failure.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Clear the whole screen.
    ///
    /// # Errors
    ///
    /// Propagates the underlying writer's failure.
    fn clear(&mut self) -> io::Result<()>;

    /// Move the cursor to a 0-indexed `(x, y)` position.
    ///
    /// # Errors
    ///
    /// Propagates the underlying writer's failure.
    fn cursor_to(&mut self, x: u16, y: u16) -> io::Result<()>;

    /// Whether a resize happened since the last call. Consumes the event.
    fn take_resize(&mut self) -> bool;
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, consumed by [`StdoutTerminal::take_resize`].
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

static SIGWINCH_INSTALLED: Once = Once::new();

/// Install the SIGWINCH handler once per process.
///
/// The handler only stores to an atomic, which is async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| {});
}

// ─── StdoutTerminal ─────────────────────────────────────────────────────────

/// The process's real terminal, written through stdout.
///
/// The cursor is hidden for the lifetime of the handle and shown again on
/// drop, along with an SGR reset so the shell prompt comes back unstyled.
///
/// ```no_run
/// use tc_term::terminal::{StdoutTerminal, Terminal};
///
/// let mut term = StdoutTerminal::new()?;
/// term.clear()?;
/// term.write("hello")?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct StdoutTerminal {
    /// Last known good size, used when the ioctl fails.
    last_size: Size,
}

impl StdoutTerminal {
    /// Take over stdout: install the resize handler and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn new() -> io::Result<Self> {
        install_sigwinch_handler();

        let mut lock = io::stdout().lock();
        ansi::cursor_hide(&mut lock)?;
        lock.flush()?;

        Ok(Self {
            last_size: get_size().unwrap_or(Size::FALLBACK),
        })
    }
}

impl Terminal for StdoutTerminal {
    fn size(&self) -> Size {
        get_size().unwrap_or(self.last_size)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut lock = io::stdout().lock();
        lock.write_all(text.as_bytes())?;
        lock.flush()
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut lock = io::stdout().lock();
        ansi::clear_screen(&mut lock)?;
        lock.flush()
    }

    fn cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        let mut lock = io::stdout().lock();
        ansi::cursor_to(&mut lock, x, y)?;
        lock.flush()
    }

    fn take_resize(&mut self) -> bool {
        let resized = SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed);
        if resized {
            if let Some(size) = get_size() {
                self.last_size = size;
            }
        }
        resized
    }
}

impl Drop for StdoutTerminal {
    fn drop(&mut self) {
        let mut lock = io::stdout().lock();
        let _ = ansi::reset(&mut lock);
        let _ = ansi::cursor_show(&mut lock);
        let _ = lock.flush();
    }
}

// ─── HeadlessTerminal ───────────────────────────────────────────────────────

/// An in-memory terminal for tests and off-screen rendering.
///
/// ```
/// use tc_term::terminal::{HeadlessTerminal, Size, Terminal};
///
/// let mut term = HeadlessTerminal::new(40, 10);
/// term.write("frame").unwrap();
/// assert_eq!(term.writes(), ["frame"]);
///
/// term.set_size(80, 24);
/// assert!(term.take_resize());
/// assert!(!term.take_resize());
/// assert_eq!(term.size(), Size::new(80, 24));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTerminal {
    size: Size,
    writes: Vec<String>,
    clears: usize,
    cursor: Option<(u16, u16)>,
    resize_pending: bool,
}

impl HeadlessTerminal {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: Size::new(cols, rows),
            writes: Vec::new(),
            clears: 0,
            cursor: None,
            resize_pending: false,
        }
    }

    /// Change the geometry and raise a resize notification.
    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.size = Size::new(cols, rows);
        self.resize_pending = true;
    }

    /// Every string passed to [`Terminal::write`], in order.
    #[inline]
    #[must_use]
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// The most recent write, if any.
    #[must_use]
    pub fn last_write(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }

    /// How many times the screen was cleared.
    #[inline]
    #[must_use]
    pub const fn clears(&self) -> usize {
        self.clears
    }

    /// Where the cursor was last moved to.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Forget recorded output (size and pending resize are kept).
    pub fn reset_log(&mut self) {
        self.writes.clear();
        self.clears = 0;
        self.cursor = None;
    }
}

impl Default for HeadlessTerminal {
    fn default() -> Self {
        Self::new(Size::FALLBACK.cols, Size::FALLBACK.rows)
    }
}

impl Terminal for HeadlessTerminal {
    fn size(&self) -> Size {
        self.size
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writes.push(text.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        self.cursor = Some((x, y));
        Ok(())
    }

    fn take_resize(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
