// SPDX-License-Identifier: MIT
//
// Canvas → frame buffer → terminal, end to end on a headless terminal.

use std::time::Instant;

use pretty_assertions::assert_eq;
use tc_canvas::{Canvas, CanvasOptions, Circle, Line, Rasterize, Rectangle, RenderLoop, Triangle};
use tc_term::color::{self, ColorSpec};
use tc_term::{FrameBuffer, HeadlessTerminal};

const BLACK_PX: &str = "\x1b[40m \x1b[0m";

fn headless(cols: u16, rows: u16) -> FrameBuffer<HeadlessTerminal> {
    FrameBuffer::new(HeadlessTerminal::new(cols, rows))
}

#[test]
fn cleared_canvas_renders_background_cells() {
    let mut canvas = Canvas::new(10, 10, CanvasOptions::default()).unwrap();
    canvas.clear().unwrap();
    let mut fb = headless(41, 21);

    let stats = canvas.draw_frame(&mut fb).unwrap();
    assert_eq!((stats.rows, stats.columns), (10, 10));

    let frame = fb.terminal().last_write().unwrap().to_owned();
    let rows: Vec<&str> = frame.split("\r\n").collect();
    assert_eq!(rows.len(), 10);

    let expected_row = BLACK_PX.repeat(20);
    for row in &rows {
        assert_eq!(*row, expected_row);
    }

    for row in fb.rows().take(10) {
        for cell in &row[..10] {
            let pure = cell.pure();
            assert_eq!(pure, "  ");
            assert!(!pure.contains('\x1b'));
        }
    }
}

#[test]
fn static_and_map_forms_agree_for_every_shape() {
    let red = ColorSpec::from("red");
    let green = ColorSpec::from("green");
    let shapes: [Box<dyn Rasterize>; 4] = [
        Box::new(Line::new(0.0, 9.0, 9.0, 0.0)),
        Box::new(Circle::new(0.0, 0.0, 20.0, 20.0, 10.0).unwrap()),
        Box::new(Rectangle::new(1.0, 1.0, 8.0, 8.0)),
        Box::new(Triangle::new(0.0, 0.0, 9.0, 4.0, 2.0, 9.0)),
    ];

    for shape in &shapes {
        let mut a = Canvas::new(12, 12, CanvasOptions::default()).unwrap();
        let mut b = Canvas::new(12, 12, CanvasOptions::default()).unwrap();
        shape.draw(&mut a, &red, Some(&green)).unwrap();
        b.draw_shape_with(&shape.rasterize(), &red, Some(&green))
            .unwrap();
        assert_eq!(a.grid(), b.grid(), "{}", shape.kind());
    }
}

#[test]
fn colorize_round_trips_through_text_cells() {
    let options = CanvasOptions {
        foreground: "#ff8800".parse().unwrap(),
        background: ColorSpec::from(236u8),
        ..CanvasOptions::default()
    };
    let mut canvas = Canvas::new(8, 1, options).unwrap();
    canvas.draw_text(0, 0, "termcanvas").unwrap();

    let text: String = (0..5)
        .map(|x| canvas.grid().get(x, 0).unwrap().pure())
        .collect();
    assert_eq!(text, "termcanvas");

    let options = canvas.options();
    let escaped = color::colorize("termcanvas", &options.foreground, &options.background).unwrap();
    assert_eq!(color::extract_pure(&escaped), "termcanvas");
}

#[test]
fn render_loop_draws_scene_and_survives_resize() {
    let mut render = RenderLoop::new(headless(41, 21));
    let mut canvas = Canvas::new(16, 16, CanvasOptions::default()).unwrap();
    canvas.set_frame_rate(0.0).unwrap();
    canvas.on_draw(|c| {
        c.clear()?;
        c.draw_shape(&Rectangle::new(0.0, 0.0, 15.0, 15.0).rasterize())?;
        Circle::with_default_step(3.0, 3.0, 12.0, 12.0).draw(
            c,
            &ColorSpec::from("cyan"),
            None,
        )?;
        c.draw_text(2, 7, "hello")
    });
    let id = render.add(canvas);

    assert_eq!(render.tick(Instant::now()).unwrap(), 1);
    let white = "\x1b[47m \x1b[0m";
    assert_eq!(render.framebuffer().get(0, 0).unwrap().upper(), white);
    assert_eq!(render.framebuffer().get(15, 15).unwrap().lower(), white);

    // Shrink below the canvas: later frames are clipped, not rejected.
    render.framebuffer_mut().terminal_mut().set_size(11, 6);
    let stats_before = render.framebuffer().terminal().writes().len();
    assert_eq!(render.tick(Instant::now()).unwrap(), 1);
    let fb = render.framebuffer();
    assert_eq!((fb.width(), fb.height()), (5, 5));
    assert_eq!(fb.terminal().writes().len(), stats_before + 1);
    assert_eq!(fb.terminal().last_write().unwrap().split("\r\n").count(), 5);

    assert!(render.canvas(id).is_some());
}
