// SPDX-License-Identifier: MIT
//
// Errors raised by canvases, shapes and the render loop.
//
// Out-of-bounds pixels and text columns are not errors; they are dropped
// where they land. What remains is bad configuration, undecodable colors,
// terminal I/O, and failures reported by a user draw callback.

use std::io;

use tc_term::ColorError;
use thiserror::Error;

/// Everything that can go wrong while building or drawing a canvas.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A required dimension was zero.
    #[error("canvas {0} must be a positive integer")]
    MissingDimension(&'static str),

    /// A frame rate that is NaN or infinite.
    #[error("frame rate must be a finite number, got {0}")]
    InvalidFrameRate(f64),

    /// A circle sampling step that is not finite or is too small to finish.
    #[error("circle step must be finite and at least 0.001 degrees, got {0}")]
    InvalidStep(f64),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error("terminal I/O: {0}")]
    Io(#[from] io::Error),

    /// A draw callback gave up on this tick.
    #[error("draw callback failed: {0}")]
    Draw(String),
}

/// Shorthand used throughout the crate.
pub type Result<T, E = CanvasError> = std::result::Result<T, E>;
