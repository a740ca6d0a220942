// SPDX-License-Identifier: MIT
//
// tc-term — Terminal side of termcanvas.
//
// Everything that knows about escape sequences and the physical screen:
// the SGR encoder, the color codec that wraps and unwraps styled text, the
// dual sub-pixel cell, the shared frame buffer, and the terminal boundary
// it writes through.
//
// No dependency on a TUI framework. Output is plain ANSI through stdout,
// geometry comes from ioctl, and resizes arrive via SIGWINCH.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod terminal;

pub use buffer::{DrawStats, FrameBuffer};
pub use cell::Cell;
pub use color::{ColorSpec, Style};
pub use error::ColorError;
pub use terminal::{HeadlessTerminal, Size, StdoutTerminal, Terminal};
