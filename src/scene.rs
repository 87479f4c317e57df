use crate::palette::BACKDROP;
use crate::particles::{
    draw_dot, draw_token, spawn_dot, spawn_token, update_dot, update_token, FallingToken, GlowDot,
};
use crate::render::{Bounds, Surface};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SceneParams {
    pub(crate) dots: usize,
    pub(crate) tokens: usize,
    pub(crate) fade: f32,
}

/// Owns both particle pools and the RNG that recycles them.
pub(crate) struct Scene {
    params: SceneParams,
    bounds: Bounds,
    dots: Vec<GlowDot>,
    tokens: Vec<FallingToken>,
    rng: StdRng,
    frames: u64,
}

impl Scene {
    pub(crate) fn new(bounds: Bounds, params: SceneParams, seed: u64) -> Self {
        let mut scene = Self {
            params,
            bounds,
            dots: Vec::new(),
            tokens: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            frames: 0,
        };
        scene.populate();
        scene
    }

    fn populate(&mut self) {
        let b = self.bounds;
        let rng = &mut self.rng;
        self.tokens = (0..self.params.tokens).map(|_| spawn_token(b, rng)).collect();
        self.dots = (0..self.params.dots).map(|_| spawn_dot(b, rng)).collect();
    }

    /// Throws both pools away and respawns them from a fresh seed.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.populate();
    }

    /// Existing particles keep their positions; the next update checks
    /// against the new extent.
    pub(crate) fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    #[cfg(test)]
    pub(crate) fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[cfg(test)]
    pub(crate) fn dots(&self) -> &[GlowDot] {
        &self.dots
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self) -> &[FallingToken] {
        &self.tokens
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    /// One display frame: fade, then dots, then tokens on top.
    pub(crate) fn frame(&mut self, surface: &mut Surface) {
        surface.fade(BACKDROP, self.params.fade);

        for dot in self.dots.iter_mut() {
            update_dot(dot, self.bounds);
            draw_dot(dot, surface);
        }

        for token in self.tokens.iter_mut() {
            update_token(token, self.bounds, &mut self.rng);
            draw_token(token, surface);
        }

        self.frames = self.frames.wrapping_add(1);
    }
}
