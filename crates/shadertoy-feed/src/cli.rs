use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shadertoy-feed",
    author,
    version,
    about = "Feeds ShaderToy timing uniforms to a render host and captures a frame",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(long, value_name = "FILE", env = "SHADERTOY_FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the output resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Number of frames the dry-run host renders before signalling close.
    #[arg(long, value_name = "COUNT", default_value_t = 120)]
    pub frames: u64,

    /// Advance a synthetic clock by this many milliseconds per frame instead
    /// of reading the wall clock.
    #[arg(long, value_name = "MILLISECONDS")]
    pub step_ms: Option<u64>,

    /// Frame at which both captures are taken; enables capturing.
    #[arg(long, value_name = "FRAME")]
    pub trigger_frame: Option<u64>,

    /// Directory receiving capture files; enables capturing.
    #[arg(long, value_name = "DIR")]
    pub captures: Option<PathBuf>,

    /// Shader path installed on the pass after the capture.
    #[arg(long, value_name = "PATH")]
    pub next_shader: Option<PathBuf>,

    /// Disable capturing even if the configuration enables it.
    #[arg(long, conflicts_with_all = ["trigger_frame", "captures"])]
    pub no_capture: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration as TOML and exit.
    Config,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WxH format, e.g. 800x600".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }

    Ok((width, height))
}
