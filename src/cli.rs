use clap::Parser;
use std::path::PathBuf;

/// codefall: falling code and glowing dots for your terminal
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub(crate) struct Args {
    /// frame cap in frames per second (10..=240)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// number of glowing dots
    #[arg(long)]
    pub(crate) dots: Option<usize>,

    /// number of falling code tokens
    #[arg(long)]
    pub(crate) tokens: Option<usize>,

    /// trail fade per frame, 0 < fade <= 1 (1 clears every frame)
    #[arg(long)]
    pub(crate) fade: Option<f32>,

    /// fixed RNG seed for a reproducible run
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// caption line to type out; repeat for more lines (off by default)
    #[arg(long = "caption", value_name = "TEXT")]
    pub(crate) captions: Vec<String>,

    /// skip the loading spinner
    #[arg(long)]
    pub(crate) no_splash: bool,

    /// settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// write the effective settings back to the settings file
    #[arg(long)]
    pub(crate) save_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "codefall",
            "--fps",
            "30",
            "--caption",
            "hello",
            "--caption",
            "world",
            "--no-splash",
        ])
        .unwrap();
        assert_eq!(args.fps, Some(30));
        assert_eq!(args.captions, vec!["hello", "world"]);
        assert!(args.no_splash);
        assert!(args.dots.is_none());
    }

    #[test]
    fn test_help_says_captions_are_opt_in() {
        use clap::CommandFactory;
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("off by default"));
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Args::try_parse_from(["codefall", "--dots", "many"]).is_err());
    }
}
