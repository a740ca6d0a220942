// SPDX-License-Identifier: MIT
//
// Codec → cell → frame buffer → terminal, without a canvas in between.

use pretty_assertions::assert_eq;
use tc_term::color::{self, ColorSpec};
use tc_term::{Cell, FrameBuffer, HeadlessTerminal};

fn styled_cell(fg: &str, bg: &str, glyphs: [&str; 2]) -> Cell {
    let fg: ColorSpec = fg.parse().unwrap();
    let bg: ColorSpec = bg.parse().unwrap();
    let [a, b] = glyphs.map(|g| color::colorize(g, &fg, &bg).unwrap());
    Cell::new(a, b)
}

#[test]
fn styled_cells_survive_a_frame() {
    let mut fb = FrameBuffer::new(HeadlessTerminal::new(9, 3));
    fb.set_pixel(0, 0, styled_cell("red", "black", ["a", "b"]));
    fb.set_pixel(1, 1, styled_cell("#00ff00", "4", ["c", "d"]));

    let stats = fb.draw().unwrap();
    assert_eq!((stats.rows, stats.columns), (2, 2));

    let frame = fb.terminal().last_write().unwrap().to_owned();
    let rows: Vec<&str> = frame.split("\r\n").collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("\x1b[40m\x1b[31ma"));
    // Blank (0,1) is two plain spaces, then the styled (1,1).
    assert!(rows[1].starts_with("  \x1b["));
    assert!(rows[1].contains("\x1b[38;2;0;255;0m"));
}

#[test]
fn every_cell_round_trips_to_its_glyphs() {
    let mut fb = FrameBuffer::new(HeadlessTerminal::new(41, 11));
    for y in 0..10 {
        for x in 0..20 {
            fb.set_pixel(x, y, styled_cell("brightYellow", "200", ["x", "y"]));
        }
    }

    for row in fb.rows() {
        for cell in row {
            assert_eq!(cell.pure(), "xy");
        }
    }
}

#[test]
fn shrinking_then_growing_loses_truncated_cells() {
    let mut fb = FrameBuffer::new(HeadlessTerminal::new(11, 6));
    fb.set_pixel(4, 4, Cell::uniform("o"));

    fb.terminal_mut().set_size(5, 3);
    fb.poll_resize().unwrap();
    fb.terminal_mut().set_size(11, 6);
    fb.poll_resize().unwrap();

    assert!(fb.get(4, 4).is_some_and(Cell::is_blank));
    assert_eq!(fb.terminal().clears(), 2);
}
