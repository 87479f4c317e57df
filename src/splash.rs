use crate::palette::Rgb;
use crate::render::{Cell, CellBuffer};
use std::time::Duration;

const HOLD: Duration = Duration::from_millis(1000);
const FADE: Duration = Duration::from_millis(500);
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

const VEIL: Rgb = Rgb::new(245, 245, 250);
const SPINNER_FG: Rgb = Rgb::new(74, 144, 226);

/// Loading veil: opaque for a second, then fades away.
pub(crate) fn opacity(elapsed: Duration) -> f32 {
    if elapsed <= HOLD {
        1.0
    } else if elapsed >= HOLD + FADE {
        0.0
    } else {
        1.0 - (elapsed - HOLD).as_secs_f32() / FADE.as_secs_f32()
    }
}

pub(crate) fn is_done(elapsed: Duration) -> bool {
    elapsed >= HOLD + FADE
}

/// One full revolution per second.
fn spinner_glyph(elapsed: Duration) -> char {
    let quarter = (elapsed.as_millis() / 250) as usize;
    SPINNER[quarter % SPINNER.len()]
}

pub(crate) fn draw(buf: &mut CellBuffer, elapsed: Duration) {
    let a = opacity(elapsed);
    if a <= 0.0 {
        return;
    }

    for c in &mut buf.cells {
        c.bg = c.bg.mix(VEIL, a);
        c.fg = c.fg.mix(VEIL, a);
        if a >= 1.0 {
            c.ch = ' ';
            c.bold = false;
        }
    }

    let (cx, cy) = (buf.w / 2, buf.h / 2);
    if let Some(under) = buf.get(cx, cy) {
        buf.set(
            cx,
            cy,
            Cell {
                ch: spinner_glyph(elapsed),
                fg: under.bg.mix(SPINNER_FG, a),
                bg: under.bg,
                bold: true,
            },
        );
    }
}
