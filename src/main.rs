// SPDX-License-Identifier: MIT
//
// termcanvas — a small animated scene drawn through the full pipeline.
//
//   tc-canvas → shapes, text, canvas, render loop
//   tc-term   → color codec, frame buffer, stdout terminal
//
// Usage:
//
//   termcanvas [--fps N] [--seconds N]
//
// Logs go to stderr, filtered by RUST_LOG (default `warn`). Redirect stderr
// when raising the level, or log lines will land in the middle of frames.

use std::env;
use std::f64::consts::TAU;
use std::process;
use std::time::{Duration, Instant};

use tc_canvas::{
    Canvas, CanvasError, CanvasOptions, Circle, Line, Rasterize, Rectangle, RenderLoop, Triangle,
};
use tc_term::{ColorSpec, FrameBuffer, StdoutTerminal};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Clone, Copy)]
struct Args {
    fps: f64,
    seconds: f64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            fps: CanvasOptions::DEFAULT_FRAME_RATE,
            seconds: 5.0,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = env::args().skip(1);

    while let Some(flag) = it.next() {
        let mut number = |name: &str| -> Result<f64, String> {
            let raw = it.next().ok_or_else(|| format!("{name} needs a value"))?;
            raw.parse()
                .map_err(|_| format!("{name}: not a number: {raw:?}"))
        };
        match flag.as_str() {
            "--fps" => args.fps = number("--fps")?,
            "--seconds" => args.seconds = number("--seconds")?,
            "-h" | "--help" => {
                println!("usage: termcanvas [--fps N] [--seconds N]");
                process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(args)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Paint one frame of the scene. `t` is seconds since start.
fn paint(canvas: &mut Canvas, t: f64, frame: u64) -> tc_canvas::Result<()> {
    let w = f64::from(canvas.width()) - 1.0;
    let h = f64::from(canvas.height()) - 1.0;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let r = cx.min(cy) - 2.0;

    canvas.clear()?;
    canvas.draw_shape(&Rectangle::new(0.0, 0.0, w, h).rasterize())?;

    Circle::new(cx - r, cy - r, cx + r, cy + r, 4.0)?.draw(
        canvas,
        &ColorSpec::from("brightBlue"),
        None,
    )?;

    let angle = t * TAU / 4.0;
    let hand = Line::new(cx, cy, r.mul_add(angle.cos(), cx), r.mul_add(angle.sin(), cy));
    hand.draw(
        canvas,
        &ColorSpec::from("brightYellow"),
        Some(&ColorSpec::from("yellow")),
    )?;

    let tri = Triangle::new(2.0, h - 2.0, 8.0, h - 2.0, 5.0, h - 7.0);
    canvas.draw_shape_with(&tri.rasterize(), &ColorSpec::Rgb(200, 60, 160), None)?;

    canvas.draw_text(2, 1, &format!("frame {frame}"))
}

fn run(args: Args) -> Result<(), CanvasError> {
    let fb = FrameBuffer::new(StdoutTerminal::new()?);
    let width = fb.width().clamp(12, 60);
    let height = fb.height().clamp(12, 30);

    let mut canvas = Canvas::new(
        width,
        height,
        CanvasOptions {
            frame_rate: args.fps,
            ..CanvasOptions::default()
        },
    )?;

    let start = Instant::now();
    let mut frame = 0u64;
    canvas.on_draw(move |c| {
        frame += 1;
        paint(c, start.elapsed().as_secs_f64(), frame)
    });

    let mut render = RenderLoop::new(fb);
    render.add(canvas);
    render.framebuffer_mut().resize()?;

    let limit = Duration::try_from_secs_f64(args.seconds.max(0.0)).unwrap_or(Duration::MAX);
    render.run_until(|_| start.elapsed() >= limit)?;

    tracing::info!(frames = render.frames(), "demo finished");
    Ok(())
}

fn main() {
    init_logging();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("termcanvas: {msg}");
            process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("termcanvas: {err}");
        process::exit(1);
    }
}
