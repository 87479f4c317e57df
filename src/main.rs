mod app;
mod caption;
mod cli;
mod config;
mod palette;
mod particles;
mod render;
mod scene;
mod splash;
mod term;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::Path};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    // no home directory means no log file and no default settings file
    let paths = config::project_paths().ok();
    init_logging(paths.as_ref().map(|p| p.log_path.as_path()));

    let settings_path = args
        .config
        .clone()
        .or_else(|| paths.map(|p| p.settings_path));
    let settings = config::effective_settings(settings_path.as_deref(), &args);

    if args.save_config {
        let path = settings_path.context("no settings location; pass --config <PATH>")?;
        config::save_settings_atomic(&path, &settings)
            .with_context(|| format!("saving settings to {}", path.display()))?;
        log::info!("saved settings to {}", path.display());
    }

    app::run(settings)
}

/// Logs go to a file; stderr shares the screen with the animation.
fn init_logging(path: Option<&Path>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match path.map(|p| OpenOptions::new().create(true).append(true).open(p)) {
        Some(Ok(file)) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        _ => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}
