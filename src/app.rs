use crate::caption::Typewriter;
use crate::config::{Settings, FPS_MAX, FPS_MIN};
use crate::palette::{Rgb, PALETTE};
use crate::render::{draw_text, CellBuffer, Surface};
use crate::scene::Scene;
use crate::splash;
use crate::term::{Backend, HostEvent, Terminal};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const FPS_STEP: u32 = 10;
const CAPTION_FG: Rgb = Rgb::new(240, 240, 250);

pub(crate) struct App<B: Backend> {
    backend: B,
    settings: Settings,
    surface: Surface,
    scene: Scene,
    frame: CellBuffer,
    caption: Option<Typewriter>,
    started: Instant,
    fps: u32,
    paused: bool,
}

impl<B: Backend> App<B> {
    pub(crate) fn new(backend: B, settings: Settings, now: Instant) -> Result<Self> {
        let (cols, rows) = backend.size()?;
        let surface = Surface::new(cols, rows);
        let seed = settings.seed.unwrap_or_else(rand::random);
        let scene = Scene::new(surface.bounds(), settings.scene_params(), seed);
        let caption = Typewriter::new(&settings.captions, now);

        log::info!(
            "surface {}x{} cells, {} dots, {} tokens, seed {:#x}",
            cols,
            rows,
            settings.dots,
            settings.tokens,
            seed
        );
        log::debug!(
            "palette: {}",
            PALETTE.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            backend,
            fps: settings.fps_cap,
            settings,
            surface,
            scene,
            frame: CellBuffer::new(cols, rows),
            caption,
            started: now,
            paused: false,
        })
    }

    pub(crate) fn into_backend(self) -> B {
        self.backend
    }

    fn frame_dt(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps.clamp(FPS_MIN, FPS_MAX) as f32)
    }

    pub(crate) fn handle(&mut self, ev: HostEvent, stop: &AtomicBool) {
        match ev {
            HostEvent::Quit => stop.store(true, Ordering::Relaxed),
            HostEvent::Resize(w, h) => {
                self.surface.resize(w, h);
                self.scene.resize(self.surface.bounds());
                log::debug!("resized to {}x{}", w, h);
            }
            HostEvent::Pause => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
            }
            HostEvent::Faster => self.fps = (self.fps + FPS_STEP).min(FPS_MAX),
            HostEvent::Slower => self.fps = self.fps.saturating_sub(FPS_STEP).max(FPS_MIN),
            HostEvent::Reseed => {
                let seed = rand::random();
                self.scene.reseed(seed);
                log::info!("reseeded with {:#x}", seed);
            }
        }
    }

    /// Steps the scene (unless paused) and presents one frame.
    pub(crate) fn tick(&mut self, now: Instant) -> Result<()> {
        if !self.paused {
            self.scene.frame(&mut self.surface);
        }
        self.surface.compose(&mut self.frame);

        if let Some(tw) = self.caption.as_mut() {
            tw.advance(now);
            let text = tw.text();
            let len = text.chars().count() as u16;
            let x = self.frame.w.saturating_sub(len) / 2;
            let y = self.frame.h / 2;
            draw_text(&mut self.frame, x, y, &text, CAPTION_FG, true);
        }

        let elapsed = now.saturating_duration_since(self.started);
        if self.settings.splash && !splash::is_done(elapsed) {
            splash::draw(&mut self.frame, elapsed);
        }

        self.backend.present(&self.frame)
    }

    /// Runs frames until `stop` is raised.
    pub(crate) fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        while !stop.load(Ordering::Relaxed) {
            let frame_start = Instant::now();
            let budget = self.frame_dt();

            for ev in self.backend.poll_events(budget)? {
                self.handle(ev, stop);
            }
            if stop.load(Ordering::Relaxed) {
                break;
            }

            self.tick(Instant::now())?;
            spin_sleep(self.frame_dt(), frame_start);
        }
        log::info!("stopped after {} frames", self.scene.frames());
        Ok(())
    }

    #[cfg(test)]
    fn scene(&self) -> &Scene {
        &self.scene
    }
}

pub(crate) fn run(settings: Settings) -> Result<()> {
    let stop = AtomicBool::new(false);
    animate(Terminal::locate(), settings, &stop)
}

/// Without a surface this does nothing at all: no terminal modes, no loop.
pub(crate) fn animate<B: Backend>(
    host: Option<B>,
    settings: Settings,
    stop: &AtomicBool,
) -> Result<()> {
    let Some(mut host) = host else {
        log::info!("no drawable surface; animation disabled");
        return Ok(());
    };
    host.begin()?;

    let mut app = App::new(host, settings, Instant::now())?;
    let result = app.run(stop);
    // restore the terminal even when the loop failed; its error wins
    let ended = app.into_backend().end();
    result.and(ended)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
