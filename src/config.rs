use crate::cli::Args;
use crate::scene::SceneParams;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub(crate) const FPS_MIN: u32 = 10;
pub(crate) const FPS_MAX: u32 = 240;
/// Upper bound on either particle pool.
pub(crate) const POOL_MAX: usize = 5_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) dots: usize,
    pub(crate) tokens: usize,
    pub(crate) fps_cap: u32,
    pub(crate) fade: f32,
    pub(crate) seed: Option<u64>,
    pub(crate) captions: Vec<String>,
    pub(crate) splash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dots: 100,
            tokens: 80,
            fps_cap: 60,
            fade: 0.1,
            seed: None,
            captions: Vec::new(),
            splash: true,
        }
    }
}

impl Settings {
    /// Command-line values win over whatever the file said.
    pub(crate) fn merge_args(mut self, args: &Args) -> Self {
        if let Some(v) = args.fps {
            self.fps_cap = v;
        }
        if let Some(v) = args.dots {
            self.dots = v;
        }
        if let Some(v) = args.tokens {
            self.tokens = v;
        }
        if let Some(v) = args.fade {
            self.fade = v;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if !args.captions.is_empty() {
            self.captions = args.captions.clone();
        }
        if args.no_splash {
            self.splash = false;
        }
        self.sanitized()
    }

    pub(crate) fn sanitized(mut self) -> Self {
        self.fps_cap = self.fps_cap.clamp(FPS_MIN, FPS_MAX);
        self.dots = self.dots.min(POOL_MAX);
        self.tokens = self.tokens.min(POOL_MAX);
        self.fade = if self.fade.is_finite() && self.fade > 0.0 {
            self.fade.min(1.0)
        } else {
            Settings::default().fade
        };
        self
    }

    pub(crate) fn scene_params(&self) -> SceneParams {
        SceneParams {
            dots: self.dots,
            tokens: self.tokens,
            fade: self.fade,
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("dev", "codefall", "codefall")
        .context("could not resolve project directories")?;
    let config_dir = proj.config_dir().to_path_buf();
    let data_dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&config_dir).ok();
    fs::create_dir_all(&data_dir).ok();
    Ok(Paths {
        settings_path: config_dir.join("settings.json"),
        log_path: data_dir.join("codefall.log"),
    })
}

/// Settings from `path` when there is one, then the command line on top.
pub(crate) fn effective_settings(path: Option<&Path>, args: &Args) -> Settings {
    let base = match path {
        Some(p) => load_settings(p),
        None => {
            log::info!("no settings location; using defaults");
            Settings::default()
        }
    };
    base.merge_args(args)
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::info!("no settings at {} ({e}); using defaults", path.display());
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v.sanitized(),
        Err(e) => {
            log::warn!("ignoring unreadable settings {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("renaming into {}", to.display()))?;
    Ok(())
}
