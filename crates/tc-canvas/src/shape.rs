// SPDX-License-Identifier: MIT
//
// Shape rasterizers — geometry in, integer grid coordinates out.
//
// Every shape implements `Rasterize`, whose one required method visits each
// covered coordinate in order. Two things are built on top of that:
//
//   rasterize() → a `Shape`: x → list of y, duplicates kept, insertion order
//                 preserved per column.
//   draw()      → the same coordinates written straight onto a canvas, with
//                 no intermediate map.
//
// Both forms share `plot`, so they cannot disagree about which pixels a
// shape covers.
//
// Inputs may be fractional. Endpoints are rounded half-up before any
// arithmetic, and every emitted sample is rounded the same way.
//
//   Line       incremental DDA between two rounded endpoints
//   Circle     angular sampling around the centre of a bounding box
//   Rectangle  four Lines along the box edges
//   Triangle   three Lines, no fill

use std::collections::BTreeMap;
use std::fmt;

use tc_term::ColorSpec;

use crate::canvas::Canvas;
use crate::error::{CanvasError, Result};

/// Round to the nearest integer, halves toward positive infinity.
///
/// Values beyond the `i32` range saturate; NaN becomes 0.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

// ─── Shape ───────────────────────────────────────────────────────────────────

/// Which rasterizer produced a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Circle,
    Rectangle,
    Triangle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Line => "Line",
            Self::Circle => "Circle",
            Self::Rectangle => "Rectangle",
            Self::Triangle => "Triangle",
        })
    }
}

/// A rasterized shape: for each occupied column, the rows it covers.
///
/// Rows within a column keep the order they were produced in, and
/// repeated coordinates are kept. Columns iterate left to right.
///
/// ```
/// use tc_canvas::shape::{Line, Rasterize};
///
/// let shape = Line::new(0.0, 0.0, 2.0, 0.0).rasterize();
/// let points: Vec<_> = shape.coordinates().collect();
/// assert_eq!(points, [(0, 0), (1, 0), (2, 0)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    kind: ShapeKind,
    columns: BTreeMap<i32, Vec<i32>>,
    len: usize,
}

impl Shape {
    #[must_use]
    pub const fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            columns: BTreeMap::new(),
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Record one covered coordinate.
    pub fn push(&mut self, x: i32, y: i32) {
        self.columns.entry(x).or_default().push(y);
        self.len += 1;
    }

    /// Append every coordinate of `other`, column by column.
    pub fn merge(&mut self, other: Self) {
        self.len += other.len;
        for (x, ys) in other.columns {
            self.columns.entry(x).or_default().extend(ys);
        }
    }

    /// The rows covered in column `x`.
    #[must_use]
    pub fn column(&self, x: i32) -> Option<&[i32]> {
        self.columns.get(&x).map(Vec::as_slice)
    }

    /// Occupied columns, left to right.
    pub fn columns(&self) -> impl Iterator<Item = (i32, &[i32])> {
        self.columns.iter().map(|(&x, ys)| (x, ys.as_slice()))
    }

    /// Every `(x, y)`, column by column, duplicates included.
    pub fn coordinates(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.columns
            .iter()
            .flat_map(|(&x, ys)| ys.iter().map(move |&y| (x, y)))
    }

    /// Number of coordinates, duplicates included.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.column(x).is_some_and(|ys| ys.contains(&y))
    }
}

// ─── Rasterize ───────────────────────────────────────────────────────────────

/// Something that covers a set of grid coordinates.
pub trait Rasterize {
    fn kind(&self) -> ShapeKind;

    /// Call `visit` once per covered coordinate, in drawing order.
    fn plot(&self, visit: &mut dyn FnMut(i32, i32));

    /// Collect the covered coordinates into a [`Shape`].
    fn rasterize(&self) -> Shape {
        let mut shape = Shape::new(self.kind());
        self.plot(&mut |x, y| shape.push(x, y));
        shape
    }

    /// Paint the covered coordinates onto `canvas` directly.
    ///
    /// `secondary` defaults to `main`. Equivalent to rasterizing and then
    /// calling [`Canvas::draw_shape_with`].
    ///
    /// # Errors
    ///
    /// A color that cannot be decoded.
    fn draw(
        &self,
        canvas: &mut Canvas,
        main: &ColorSpec,
        secondary: Option<&ColorSpec>,
    ) -> Result<()> {
        let cell = canvas.pixel_cell(main, secondary)?;
        self.plot(&mut |x, y| {
            canvas.put_pixel(x, y, &cell);
        });
        Ok(())
    }
}

// ─── Line ────────────────────────────────────────────────────────────────────

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Line {
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Visit the samples of a segment between two integer endpoints.
///
/// Takes `max(|Δx|, |Δy|)` steps of `Δ / steps` per axis and rounds each
/// sample independently. A zero-length segment is a single point.
#[allow(clippy::cast_precision_loss)]
fn plot_segment(x0: i32, y0: i32, x1: i32, y1: i32, visit: &mut dyn FnMut(i32, i32)) {
    let dx = i64::from(x1) - i64::from(x0);
    let dy = i64::from(y1) - i64::from(y0);
    let steps = dx.unsigned_abs().max(dy.unsigned_abs());

    if steps == 0 {
        visit(x0, y0);
        return;
    }

    let inc_x = dx as f64 / steps as f64;
    let inc_y = dy as f64 / steps as f64;
    let (fx, fy) = (f64::from(x0), f64::from(y0));

    for i in 0..=steps {
        let t = i as f64;
        visit(round_half_up(fx + inc_x * t), round_half_up(fy + inc_y * t));
    }
}

impl Rasterize for Line {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn plot(&self, visit: &mut dyn FnMut(i32, i32)) {
        plot_segment(
            round_half_up(self.x0),
            round_half_up(self.y0),
            round_half_up(self.x1),
            round_half_up(self.y1),
            visit,
        );
    }
}

// ─── Circle ──────────────────────────────────────────────────────────────────

/// A circle inscribed in a bounding box.
///
/// The radius is the mean of the box's half-width and half-height, so a
/// non-square box gives a circle of intermediate size rather than an
/// ellipse. Samples are taken every `step` degrees from 0 to 360 inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    step: f64,
}

impl Circle {
    /// Default angular step in degrees.
    pub const DEFAULT_STEP: f64 = 1.0;

    /// Smallest accepted step: at most 360 000 samples per circle.
    pub const MIN_STEP: f64 = 0.001;

    /// # Errors
    ///
    /// [`CanvasError::InvalidStep`] if `step` is not finite or is below
    /// [`MIN_STEP`](Self::MIN_STEP).
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, step: f64) -> Result<Self> {
        if !step.is_finite() || step < Self::MIN_STEP {
            return Err(CanvasError::InvalidStep(step));
        }
        Ok(Self {
            x0,
            y0,
            x1,
            y1,
            step,
        })
    }

    /// A circle sampled once per degree.
    #[must_use]
    pub const fn with_default_step(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            step: Self::DEFAULT_STEP,
        }
    }

    #[inline]
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Centre of the rounded bounding box.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        let (x0, y0, x1, y1) = self.corners();
        (
            (f64::from(x0) + f64::from(x1)) / 2.0,
            (f64::from(y0) + f64::from(y1)) / 2.0,
        )
    }

    /// Mean of half-width and half-height of the rounded bounding box.
    #[must_use]
    pub fn radius(&self) -> f64 {
        let (x0, y0, x1, y1) = self.corners();
        let half_w = (f64::from(x1) - f64::from(x0)) / 2.0;
        let half_h = (f64::from(y1) - f64::from(y0)) / 2.0;
        ((half_w + half_h) / 2.0).abs()
    }

    fn corners(&self) -> (i32, i32, i32, i32) {
        (
            round_half_up(self.x0),
            round_half_up(self.y0),
            round_half_up(self.x1),
            round_half_up(self.y1),
        )
    }
}

impl Rasterize for Circle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn plot(&self, visit: &mut dyn FnMut(i32, i32)) {
        let (cx, cy) = self.center();
        let r = self.radius();
        // Counting whole steps keeps float error from skipping 360°.
        let samples = (360.0 / self.step).floor() as u64;

        for i in 0..=samples {
            let theta = (i as f64 * self.step).to_radians();
            visit(
                round_half_up(r.mul_add(theta.cos(), cx)),
                round_half_up(r.mul_add(theta.sin(), cy)),
            );
        }
    }
}

// ─── Rectangle ───────────────────────────────────────────────────────────────

/// The outline of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rectangle {
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// `x1 - x0`, signed.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// `y1 - y0`, signed.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The four edges: top, left, bottom, right.
    #[must_use]
    pub const fn edges(&self) -> [Line; 4] {
        let Self { x0, y0, x1, y1 } = *self;
        [
            Line::new(x0, y0, x1, y0),
            Line::new(x0, y1, x0, y0),
            Line::new(x0, y1, x1, y1),
            Line::new(x1, y1, x1, y0),
        ]
    }
}

impl Rasterize for Rectangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn plot(&self, visit: &mut dyn FnMut(i32, i32)) {
        for edge in self.edges() {
            edge.plot(visit);
        }
    }
}

// ─── Triangle ────────────────────────────────────────────────────────────────

/// The outline of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [(f64, f64); 3],
}

impl Triangle {
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            points: [(x0, y0), (x1, y1), (x2, y2)],
        }
    }

    /// Edges 0→1, 1→2, 2→0.
    #[must_use]
    pub const fn edges(&self) -> [Line; 3] {
        let [(x0, y0), (x1, y1), (x2, y2)] = self.points;
        [
            Line::new(x0, y0, x1, y1),
            Line::new(x1, y1, x2, y2),
            Line::new(x2, y2, x0, y0),
        ]
    }
}

impl Rasterize for Triangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Triangle
    }

    fn plot(&self, visit: &mut dyn FnMut(i32, i32)) {
        for edge in self.edges() {
            edge.plot(visit);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
