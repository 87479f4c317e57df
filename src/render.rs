use crate::palette::{Rgb, BACKDROP};

/// Subpixels per terminal cell (braille is 2×4).
pub(crate) const SUB_X: u32 = 2;
pub(crate) const SUB_Y: u32 = 4;

/// Minimum per-channel lift above the backdrop for a subpixel to become a braille dot.
const INK_LIFT: f32 = 40.0;

/// Glyphs fainter than this are dropped from the glyph layer.
const GLYPH_FLOOR: f32 = 0.04;

/// Drawing-surface extent in subpixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Bounds {
    pub(crate) fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: (cols as u32 * SUB_X) as f32,
            height: (rows as u32 * SUB_Y) as f32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Rgb,
    pub(crate) bg: Rgb,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::new(255, 255, 255),
            bg: BACKDROP,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        if w != self.w || h != self.h {
            *self = CellBuffer::new(w, h);
        }
    }
}

/// Writes `s` starting at (x, y), keeping each cell's background.
pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Rgb, bold: bool) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        let Some(under) = buf.get(xx, y) else {
            break;
        };
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg: under.bg,
                bold,
            },
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pixel {
    pub(crate) r: f32,
    pub(crate) g: f32,
    pub(crate) b: f32,
}

impl From<Rgb> for Pixel {
    fn from(c: Rgb) -> Self {
        Self {
            r: c.r as f32,
            g: c.g as f32,
            b: c.b as f32,
        }
    }
}

impl Pixel {
    fn to_rgb(self) -> Rgb {
        let q = |v: f32| (v.clamp(0.0, 255.0) + 0.5) as u8;
        Rgb::new(q(self.r), q(self.g), q(self.b))
    }

    fn lerp_towards(&mut self, src: Pixel, a: f32) {
        self.r += (src.r - self.r) * a;
        self.g += (src.g - self.g) * a;
        self.b += (src.b - self.b) * a;
    }

    fn lift(self, base: Pixel) -> f32 {
        (self.r - base.r)
            .abs()
            .max((self.g - base.g).abs())
            .max((self.b - base.b).abs())
    }
}

/// Filled disc with a soft halo fading out past its edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Glow {
    pub(crate) radius: f32,
    pub(crate) alpha: f32,
    pub(crate) halo: f32,
    pub(crate) halo_alpha: f32,
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::from(BACKDROP); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    /// Paints `color` over every pixel at `alpha` without clearing.
    pub(crate) fn fade(&mut self, color: Rgb, alpha: f32) {
        let src = Pixel::from(color);
        let a = alpha.clamp(0.0, 1.0);
        for p in &mut self.px {
            p.lerp_towards(src, a);
        }
    }

    pub(crate) fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h || alpha <= 0.0 {
            return;
        }
        let i = self.idx(x, y);
        self.px[i].lerp_towards(Pixel::from(color), alpha.min(1.0));
    }

    pub(crate) fn glow_circle(&mut self, cx: f32, cy: f32, color: Rgb, g: Glow) {
        let reach = g.radius.max(0.0) + g.halo.max(0.0);
        let x0 = (cx - reach).floor() as i32;
        let x1 = (cx + reach).ceil() as i32;
        let y0 = (cy - reach).floor() as i32;
        let y1 = (cy + reach).ceil() as i32;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let a = if d <= g.radius {
                    g.alpha
                } else if g.halo > 0.0 && d < reach {
                    let t = 1.0 - (d - g.radius) / g.halo;
                    g.halo_alpha * t * t
                } else {
                    continue;
                };
                self.blend(x, y, color, a);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.w && y < self.h {
            Some(self.px[self.idx(x, y)].to_rgb())
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Glyph {
    pub(crate) ch: char,
    pub(crate) color: Rgb,
    pub(crate) strength: f32,
    pub(crate) bold: bool,
}

/// Cell-resolution text layer that fades like the canvas.
pub(crate) struct GlyphLayer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    slots: Vec<Option<Glyph>>,
}

impl GlyphLayer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            slots: vec![None; (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn fade(&mut self, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for slot in &mut self.slots {
            let spent = match slot {
                Some(g) => {
                    g.strength *= keep;
                    g.strength < GLYPH_FLOOR
                }
                None => false,
            };
            if spent {
                *slot = None;
            }
        }
    }

    pub(crate) fn stamp(&mut self, x: i32, y: i32, glyph: Glyph) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 {
            return;
        }
        let i = (y as usize) * (self.w as usize) + (x as usize);
        self.slots[i] = Some(glyph);
    }

    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        if x < self.w && y < self.h {
            self.slots[(y as usize) * (self.w as usize) + (x as usize)]
        } else {
            None
        }
    }
}

/// The drawing surface: a braille-resolution canvas for dots and halos,
/// plus a glyph layer for falling text.
pub(crate) struct Surface {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) canvas: PixelCanvas,
    pub(crate) glyphs: GlyphLayer,
}

impl Surface {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            canvas: PixelCanvas::new(cols as u32 * SUB_X, rows as u32 * SUB_Y),
            glyphs: GlyphLayer::new(cols, rows),
        }
    }

    /// Resizing wipes the surface, like reassigning a canvas' dimensions.
    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        *self = Surface::new(cols, rows);
    }

    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::from_cells(self.cols, self.rows)
    }

    pub(crate) fn fade(&mut self, color: Rgb, alpha: f32) {
        self.canvas.fade(color, alpha);
        self.glyphs.fade(alpha);
    }

    pub(crate) fn compose(&self, out: &mut CellBuffer) {
        out.resize(self.cols, self.rows);
        let base = Pixel::from(BACKDROP);

        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let px0 = cx as u32 * SUB_X;
                let py0 = cy as u32 * SUB_Y;

                let mut mask: u8 = 0;
                let mut ink = [0.0f32; 3];
                let mut ink_n = 0u32;
                let mut all = [0.0f32; 3];
                let mut all_n = 0u32;

                for dy in 0..SUB_Y {
                    for dx in 0..SUB_X {
                        let (x, y) = (px0 + dx, py0 + dy);
                        if x >= self.canvas.w || y >= self.canvas.h {
                            continue;
                        }
                        let p = self.canvas.px[self.canvas.idx(x, y)];
                        all[0] += p.r;
                        all[1] += p.g;
                        all[2] += p.b;
                        all_n += 1;
                        if p.lift(base) >= INK_LIFT {
                            mask |= braille_bit(dx, dy);
                            ink[0] += p.r;
                            ink[1] += p.g;
                            ink[2] += p.b;
                            ink_n += 1;
                        }
                    }
                }

                let avg = |sum: [f32; 3], n: u32| -> Rgb {
                    if n == 0 {
                        return BACKDROP;
                    }
                    let n = n as f32;
                    Pixel {
                        r: sum[0] / n,
                        g: sum[1] / n,
                        b: sum[2] / n,
                    }
                    .to_rgb()
                };

                // dim the cell average so a lone dot does not flood its cell
                let bg = BACKDROP.mix(avg(all, all_n), 0.5);

                let cell = match self.glyphs.get(cx, cy) {
                    Some(g) => Cell {
                        ch: g.ch,
                        fg: bg.mix(g.color, g.strength),
                        bg,
                        bold: g.bold,
                    },
                    None if mask != 0 => Cell {
                        ch: braille_char(mask),
                        fg: avg(ink, ink_n),
                        bg,
                        bold: false,
                    },
                    None => Cell {
                        ch: ' ',
                        fg: bg,
                        bg,
                        bold: false,
                    },
                };
                out.set(cx, cy, cell);
            }
        }
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn braille_char(mask: u8) -> char {
    char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
}
