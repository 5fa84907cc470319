use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use renderer::Orientation;

#[derive(Parser, Debug)]
#[command(
    name = "cardpreview",
    author,
    version,
    about = "Alpha-matted card video previewer"
)]
pub struct Cli {
    /// Configuration file; defaults to `cardpreview.toml` in the config directory.
    #[arg(long, global = true, value_name = "PATH", env = "CARDPREVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Composite a single packed frame into an RGBA PNG.
    Render(RenderArgs),
    /// Play a decoded frame sequence through the frame-rate gated driver.
    Play(PlayArgs),
    /// Print or export the bundled GLSL shaders.
    Shaders(ShadersArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Headless wgpu device.
    Gpu,
    /// Software compositor; no adapter required.
    Cpu,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Packed colour + alpha frame to composite.
    #[arg(long, value_name = "PNG")]
    pub frame: PathBuf,

    /// Destination for the composited RGBA image.
    #[arg(long, value_name = "PNG")]
    pub out: PathBuf,

    /// Layout of the packed frame: `horizontal` or `vertical`.
    #[arg(long, value_name = "AXIS", value_parser = parse_orientation)]
    pub orientation: Option<Orientation>,

    /// Output resolution (e.g. `400x400`); defaults to the scaled sub-image size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    #[arg(long, value_enum, default_value_t = Backend::Gpu)]
    pub backend: Backend,
}

#[derive(Parser, Debug)]
pub struct PlayArgs {
    /// Video reference; only sources matching the configured extension are shaded.
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Directory of decoded frames (PNG), played in file name order.
    #[arg(long, value_name = "DIR")]
    pub frames: PathBuf,

    #[arg(long, value_name = "AXIS", value_parser = parse_orientation)]
    pub orientation: Option<Orientation>,

    /// Draw rate cap; overrides `playback.fps`.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Rate at which the decoded frames advance.
    #[arg(long, value_name = "FPS", default_value_t = 30.0)]
    pub source_fps: f32,

    /// How long to play for (e.g. `2s`, `500ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, default_value = "5s")]
    pub duration: Duration,

    /// Restart the sequence when it runs out instead of ending playback.
    #[arg(long = "loop")]
    pub looping: bool,

    /// Flip the orientation after every N drawn frames.
    #[arg(long, value_name = "N")]
    pub toggle_every: Option<u32>,

    /// Write every drawn frame here as `frame_NNNNN.png`.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Backend::Gpu)]
    pub backend: Backend,
}

#[derive(Parser, Debug, Default)]
pub struct ShadersArgs {
    /// Write the shader sources into this directory instead of stdout.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 400x400".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}' in size specification", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}' in size specification", height.trim()))?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_orientation(value: &str) -> Result<Orientation, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("orientation must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "horizontal" | "h" | "side-by-side" => Ok(Orientation::Horizontal),
        "vertical" | "v" | "stacked" => Ok(Orientation::Vertical),
        other => Err(format!(
            "unknown orientation '{other}'; expected horizontal or vertical"
        )),
    }
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(value.trim())
        .map_err(|err| format!("invalid duration '{value}': {err}"))?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_accepts_common_separators() {
        assert_eq!(parse_surface_size("400x300"), Ok((400, 300)));
        assert_eq!(parse_surface_size(" 640 X 480 "), Ok((640, 480)));
        assert_eq!(parse_surface_size("8×8"), Ok((8, 8)));
    }

    #[test]
    fn surface_size_rejects_bad_input() {
        assert!(parse_surface_size("400").is_err());
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("ax10").is_err());
    }

    #[test]
    fn orientation_aliases() {
        assert_eq!(parse_orientation("Horizontal"), Ok(Orientation::Horizontal));
        assert_eq!(parse_orientation("stacked"), Ok(Orientation::Vertical));
        assert!(parse_orientation("diagonal").is_err());
        assert!(parse_orientation("  ").is_err());
    }

    #[test]
    fn duration_uses_humantime() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn play_defaults() {
        let cli = Cli::try_parse_from([
            "cardpreview",
            "play",
            "--url",
            "card.mp4",
            "--frames",
            "frames",
        ])
        .unwrap();
        let Command::Play(args) = cli.command else {
            panic!("expected play command");
        };
        assert_eq!(args.backend, Backend::Gpu);
        assert_eq!(args.duration, Duration::from_secs(5));
        assert!(args.orientation.is_none());
        assert!(!args.looping);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "cardpreview",
            "shaders",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
