use crate::palette::Swatch;
use crate::render::{Bounds, Glow, Glyph, Surface, SUB_X, SUB_Y};
use rand::Rng;
use std::f32::consts::TAU;

/// Tokens recycle once they fall this far past the bottom edge,
/// and re-enter this far above the top.
pub(crate) const RECYCLE_MARGIN: f32 = 50.0;

pub(crate) const PULSE_STEP: f32 = 0.05;
const PULSE_DEPTH: f32 = 0.5;

const DOT_HALO: f32 = 2.5;
const DOT_HALO_ALPHA: f32 = 0.8 * 0.3;
const TOKEN_HALO: f32 = 3.5;
const TOKEN_HALO_ALPHA: f32 = 0.8 * 0.15;

/// Tokens at or above this size are drawn bold.
const BOLD_FONT: f32 = 22.0;

pub(crate) const SNIPPETS: [&str; 39] = [
    "{ }", "[ ]", "< />", "( )", "=>", "===", "!==", "const", "let", "var", "function", "class",
    "async", "await", "if", "else", "return", "import", "export", "default", "React", "Node",
    "MongoDB", "Express", "JS", "CSS", "HTML", "map()", "filter()", "reduce()", "useState",
    "useEffect", "&&", "||", "...", "try", "catch", "new", "this",
];

#[derive(Clone, Debug)]
pub(crate) struct FallingToken {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) speed: f32,
    pub(crate) snippet: &'static str,
    pub(crate) font_size: f32,
    pub(crate) color: Swatch,
    pub(crate) opacity: f32,
    pub(crate) rotation: f32, // radians
}

#[derive(Clone, Debug)]
pub(crate) struct GlowDot {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) radius: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) color: Swatch,
    pub(crate) opacity: f32,
    pub(crate) pulse: f32,
}

/// Uniform in `[0, max)`; zero-sized extents collapse to 0.
fn unit<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    rng.gen::<f32>() * max.max(0.0)
}

/* -----------------------------
   Falling tokens
------------------------------ */

pub(crate) fn spawn_token<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> FallingToken {
    let mut t = FallingToken {
        x: 0.0,
        y: 0.0,
        speed: 0.0,
        snippet: SNIPPETS[0],
        font_size: 0.0,
        color: Swatch::Gold,
        opacity: 0.0,
        rotation: 0.0,
    };
    reset_token(&mut t, bounds, rng);
    t
}

/// Rerolls every attribute and places the token somewhere above the top edge.
pub(crate) fn reset_token<R: Rng + ?Sized>(t: &mut FallingToken, bounds: Bounds, rng: &mut R) {
    t.x = unit(rng, bounds.width);
    t.y = unit(rng, bounds.height) - bounds.height;
    t.speed = 0.5 + rng.gen::<f32>() * 2.0;
    t.snippet = SNIPPETS[rng.gen_range(0..SNIPPETS.len())];
    t.font_size = 16.0 + rng.gen::<f32>() * 10.0;
    t.color = Swatch::pick(rng);
    t.opacity = 0.4 + rng.gen::<f32>() * 0.4;
    t.rotation = rng.gen::<f32>() * 0.2 - 0.1;
}

pub(crate) fn update_token<R: Rng + ?Sized>(t: &mut FallingToken, bounds: Bounds, rng: &mut R) {
    t.y += t.speed;
    if t.y > bounds.height + RECYCLE_MARGIN {
        reset_token(t, bounds, rng);
        t.y = -RECYCLE_MARGIN;
    }
}

pub(crate) fn draw_token(t: &FallingToken, surface: &mut Surface) {
    let rgb = t.color.rgb();
    let (sin, cos) = t.rotation.sin_cos();
    let advance = SUB_X as f32;

    for (i, ch) in t.snippet.chars().enumerate() {
        let along = i as f32 * advance;
        let gx = t.x + along * cos;
        let gy = t.y + along * sin;

        if ch != ' ' {
            surface.glyphs.stamp(
                (gx / SUB_X as f32).floor() as i32,
                (gy / SUB_Y as f32).floor() as i32,
                Glyph {
                    ch,
                    color: rgb,
                    strength: t.opacity,
                    bold: t.font_size >= BOLD_FONT,
                },
            );
        }

        surface.canvas.glow_circle(
            gx + advance * 0.5,
            gy,
            rgb,
            Glow {
                radius: 0.0,
                alpha: 0.0,
                halo: TOKEN_HALO,
                halo_alpha: TOKEN_HALO_ALPHA * t.opacity,
            },
        );
    }
}

/* -----------------------------
   Glow dots
------------------------------ */

pub(crate) fn spawn_dot<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> GlowDot {
    GlowDot {
        x: unit(rng, bounds.width),
        y: unit(rng, bounds.height),
        radius: 1.5 + rng.gen::<f32>() * 2.5,
        vx: (rng.gen::<f32>() - 0.5) * 0.8,
        vy: (rng.gen::<f32>() - 0.5) * 0.8,
        color: Swatch::pick(rng),
        opacity: 0.4 + rng.gen::<f32>() * 0.5,
        pulse: rng.gen::<f32>() * TAU,
    }
}

/// Moves the dot, then bounces it off any edge it crossed. The position is
/// pinned to the edge and the velocity on that axis points back inside, so a
/// dot stranded outside by a shrink walks back in instead of oscillating.
pub(crate) fn update_dot(d: &mut GlowDot, bounds: Bounds) {
    d.x += d.vx;
    d.y += d.vy;
    d.pulse = (d.pulse + PULSE_STEP).rem_euclid(TAU);

    (d.x, d.vx) = reflect(d.x, d.vx, bounds.width);
    (d.y, d.vy) = reflect(d.y, d.vy, bounds.height);
}

fn reflect(pos: f32, vel: f32, extent: f32) -> (f32, f32) {
    let extent = extent.max(0.0);
    if pos < 0.0 {
        (0.0, vel.abs())
    } else if pos > extent {
        (extent, -vel.abs())
    } else {
        (pos, vel)
    }
}

/// Radius after the sinusoidal breathing term.
pub(crate) fn pulse_radius(d: &GlowDot) -> f32 {
    d.radius + d.pulse.sin() * PULSE_DEPTH
}

pub(crate) fn draw_dot(d: &GlowDot, surface: &mut Surface) {
    surface.canvas.glow_circle(
        d.x,
        d.y,
        d.color.rgb(),
        Glow {
            radius: pulse_radius(d),
            alpha: d.opacity,
            halo: DOT_HALO,
            halo_alpha: DOT_HALO_ALPHA * d.opacity,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use rand::{rngs::StdRng, SeedableRng};

    fn bounds(w: f32, h: f32) -> Bounds {
        Bounds {
            width: w,
            height: h,
        }
    }

    fn dot_at(x: f32, y: f32, vx: f32, vy: f32) -> GlowDot {
        GlowDot {
            x,
            y,
            radius: 2.0,
            vx,
            vy,
            color: Swatch::Cyan,
            opacity: 0.5,
            pulse: 0.0,
        }
    }

    #[test]
    fn test_dot_near_edge_no_reflection() {
        let b = bounds(800.0, 600.0);
        let mut d = dot_at(799.0, 300.0, 0.5, 0.0);
        update_dot(&mut d, b);
        assert_eq!(d.x, 799.5);
        assert_eq!(d.vx, 0.5);
    }

    #[test]
    fn test_dot_crossing_edge_reflects_before_next_move() {
        let b = bounds(800.0, 600.0);
        let mut d = dot_at(799.9, 300.0, 0.5, 0.0);
        update_dot(&mut d, b);
        assert!(d.vx < 0.0);
        assert!(d.x <= 800.0);

        update_dot(&mut d, b);
        assert!(d.x < 800.0);
    }

    #[test]
    fn test_dots_stay_in_bounds() {
        let b = bounds(160.0, 96.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut dots: Vec<GlowDot> = (0..100).map(|_| spawn_dot(b, &mut rng)).collect();

        for step in 0..5_000 {
            for d in dots.iter_mut() {
                update_dot(d, b);
                assert!(
                    (0.0..=b.width).contains(&d.x) && (0.0..=b.height).contains(&d.y),
                    "step {} dot escaped to ({}, {})",
                    step,
                    d.x,
                    d.y
                );
            }
        }
    }

    #[test]
    fn test_stranded_dot_returns_after_shrink() {
        let small = bounds(100.0, 100.0);
        let mut d = dot_at(500.0, 50.0, 0.3, 0.0);
        update_dot(&mut d, small);
        assert_eq!(d.x, 100.0);
        assert!(d.vx < 0.0);

        for _ in 0..10 {
            update_dot(&mut d, small);
        }
        assert!(d.x < 100.0);
    }

    #[test]
    fn test_pulse_advances_and_breathes() {
        let b = bounds(10.0, 10.0);
        let mut d = dot_at(5.0, 5.0, 0.0, 0.0);
        d.pulse = std::f32::consts::FRAC_PI_2 - PULSE_STEP;
        update_dot(&mut d, b);
        assert!((d.pulse - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((pulse_radius(&d) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_pulse_keeps_breathing_on_long_runs() {
        let b = bounds(10.0, 10.0);
        let mut d = dot_at(5.0, 5.0, 0.0, 0.0);
        d.pulse = 1_048_576.0;
        update_dot(&mut d, b);
        assert!((0.0..TAU).contains(&d.pulse), "phase {} not wrapped", d.pulse);

        let mut last = pulse_radius(&d);
        for _ in 0..10 {
            let before = d.pulse;
            update_dot(&mut d, b);
            assert_ne!(d.pulse, before);
            assert_ne!(pulse_radius(&d), last);
            last = pulse_radius(&d);
        }
    }

    #[test]
    fn test_token_falls_then_recycles_above() {
        let b = bounds(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut t = spawn_token(b, &mut rng);
        assert!(t.y < 0.0 && t.y >= -b.height);

        let mut last = t.y;
        let mut recycled = false;
        for _ in 0..10_000 {
            update_token(&mut t, b, &mut rng);
            if t.y < last {
                assert_eq!(t.y, -RECYCLE_MARGIN);
                assert!(t.x >= 0.0 && t.x < b.width);
                recycled = true;
                break;
            }
            assert!(t.y > last);
            assert!(t.y <= b.height + RECYCLE_MARGIN);
            last = t.y;
        }
        assert!(recycled, "token never recycled");
    }

    #[test]
    fn test_token_recycles_exactly_past_margin() {
        let b = bounds(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(11);
        let mut t = spawn_token(b, &mut rng);
        t.speed = 1.0;
        t.y = 649.0;
        update_token(&mut t, b, &mut rng);
        assert_eq!(t.y, 650.0);

        t.speed = 1.0;
        update_token(&mut t, b, &mut rng);
        assert_eq!(t.y, -RECYCLE_MARGIN);
    }

    #[test]
    fn test_token_attribute_ranges() {
        let b = bounds(320.0, 200.0);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            let t = spawn_token(b, &mut rng);
            assert!((0.5..=2.5).contains(&t.speed));
            assert!((16.0..=26.0).contains(&t.font_size));
            assert!((0.4..=0.8).contains(&t.opacity));
            assert!((-0.1..=0.1).contains(&t.rotation));
            assert!(SNIPPETS.contains(&t.snippet));
            assert!(PALETTE.contains(&t.color));
        }
    }

    #[test]
    fn test_zero_sized_bounds_do_not_panic() {
        let b = bounds(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut d = spawn_dot(b, &mut rng);
        let mut t = spawn_token(b, &mut rng);
        update_dot(&mut d, b);
        update_token(&mut t, b, &mut rng);
        assert_eq!((d.x, d.y), (0.0, 0.0));
        assert_eq!(t.x, 0.0);
    }

    #[test]
    fn test_draw_token_stamps_glyphs() {
        let mut surface = Surface::new(20, 5);
        let t = FallingToken {
            x: 4.0,
            y: 8.0,
            speed: 1.0,
            snippet: "let",
            font_size: 24.0,
            color: Swatch::Pink,
            opacity: 0.7,
            rotation: 0.0,
        };
        draw_token(&t, &mut surface);

        let g = surface.glyphs.get(2, 2).unwrap();
        assert_eq!(g.ch, 'l');
        assert!(g.bold);
        assert_eq!(g.color, Swatch::Pink.rgb());
        assert_eq!(surface.glyphs.get(3, 2).unwrap().ch, 'e');
        assert_eq!(surface.glyphs.get(4, 2).unwrap().ch, 't');
    }

    #[test]
    fn test_draw_dot_lights_canvas() {
        let mut surface = Surface::new(10, 5);
        let d = dot_at(10.0, 10.0, 0.0, 0.0);
        draw_dot(&d, &mut surface);
        assert_ne!(surface.canvas.get(10, 10), Some(crate::palette::BACKDROP));
    }
}
