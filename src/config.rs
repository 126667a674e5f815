use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_FRAME_MS: u64 = 16;
pub const DEFAULT_SCALE: f64 = 8.0;

#[derive(Debug, Parser)]
#[command(name = "frostplay", version, about = "FrostPlay game portfolio in the terminal")]
pub struct Cli
{
    /// Write logs to this file (the terminal is busy while playing).
    #[arg(long, global = true, env = "FROSTPLAY_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command
{
    /// List catalog games.
    List
    {
        /// Only featured games.
        #[arg(long)]
        featured: bool,
        /// Only games carrying this tag.
        #[arg(long)]
        tag: Option<String>,
        /// Only games that run in the terminal.
        #[arg(long)]
        playable: bool,
    },
    /// Search titles, descriptions and tags.
    Search
    {
        query: String,
        #[arg(long)]
        tag: Option<String>,
    },
    /// List every tag in the catalog.
    Tags,
    /// Show one game's details.
    Show
    {
        slug: String,
    },
    /// Play a game in the terminal.
    Play
    {
        #[arg(default_value = "frost-runner")]
        slug: String,
        #[command(flatten)]
        runner: RunnerConfig,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunnerConfig
{
    /// Milliseconds between frames.
    #[arg(
        long,
        env = "FROSTPLAY_FRAME_MS",
        default_value_t = DEFAULT_FRAME_MS,
        value_parser = clap::value_parser!(u64).range(1..=1000)
    )]
    pub frame_ms: u64,

    /// Logical pixels per half-block terminal pixel.
    #[arg(long, env = "FROSTPLAY_SCALE", default_value_t = DEFAULT_SCALE, value_parser = parse_scale)]
    pub scale: f64,

    /// Paint a real gradient instead of reusing the previous fill.
    #[arg(long, env = "FROSTPLAY_GRADIENT_BACKGROUND")]
    pub gradient_background: bool,

    /// Seed for obstacle spawns.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for RunnerConfig
{
    fn default() -> Self
    {
        Self {
            frame_ms: DEFAULT_FRAME_MS,
            scale: DEFAULT_SCALE,
            gradient_background: false,
            seed: None,
        }
    }
}

fn parse_scale(value: &str) -> Result<f64, String>
{
    let parsed = value
        .parse::<f64>()
        .map_err(|_| "scale must be a number".to_string())?;
    if !(1.0..=64.0).contains(&parsed) {
        return Err("scale must be between 1 and 64".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_play_defaults()
    {
        let cli = Cli::try_parse_from(["frostplay", "play"]).unwrap();
        match cli.command {
            Some(Command::Play { slug, runner }) => {
                assert_eq!(slug, "frost-runner");
                assert_eq!(runner.scale, DEFAULT_SCALE);
                assert!(!runner.gradient_background);
                assert_eq!(runner.seed, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_play_options()
    {
        let cli = Cli::try_parse_from([
            "frostplay",
            "play",
            "frost-runner",
            "--frame-ms=33",
            "--scale",
            "4",
            "--gradient-background",
            "--seed=9",
        ])
        .unwrap();
        let Some(Command::Play { runner, .. }) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(runner.frame_ms, 33);
        assert_eq!(runner.scale, 4.0);
        assert!(runner.gradient_background);
        assert_eq!(runner.seed, Some(9));
    }

    #[test]
    fn test_rejects_out_of_range()
    {
        assert!(Cli::try_parse_from(["frostplay", "play", "--scale=0.5"]).is_err());
        assert!(Cli::try_parse_from(["frostplay", "play", "--frame-ms=0"]).is_err());
    }

    #[test]
    fn test_list_filters()
    {
        let cli = Cli::try_parse_from(["frostplay", "list", "--featured", "--tag", "Action"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::List { featured: true, tag: Some(ref tag), playable: false }) if tag == "Action"
        ));
        assert!(Cli::try_parse_from(["frostplay"]).unwrap().command.is_none());
    }
}
