// SPDX-License-Identifier: MIT
//
// tc-canvas — Vector drawing on top of tc-term.
//
// Shapes rasterize to integer coordinates, canvases turn coordinates and
// text into styled cells, and the render loop decides when each canvas
// flushes into the shared frame buffer.

pub mod canvas;
pub mod error;
pub mod grid;
pub mod render_loop;
pub mod shape;

pub use canvas::{Canvas, CanvasOptions, DrawCallback, Experimental};
pub use error::{CanvasError, Result};
pub use grid::PixelGrid;
pub use render_loop::{CanvasId, LoopConfig, RenderLoop};
pub use shape::{Circle, Line, Rasterize, Rectangle, Shape, ShapeKind, Triangle};
