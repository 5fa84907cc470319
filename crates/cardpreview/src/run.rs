use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cardconfig::{CardConfig, PowerSetting};
use playback::{
    DisplayClock, PlaybackDriver, PlaybackSettings, Preview, SourceGate, TickOutcome,
};
use renderer::{
    check_program, Canvas, CpuMatte, FrameRenderer, GpuContext, GpuPowerPreference,
    MatteRenderer, Orientation, RenderError, ShaderSources, SHADER_ASSET_VERSION,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{Backend, Cli, Command, PlayArgs, RenderArgs, ShadersArgs};
use crate::paths::AppPaths;
use crate::plain::Passthrough;
use crate::sequence::ImageSequence;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Render(args) => run_render(&config, args),
        Command::Play(args) => run_play(&config, args),
        Command::Shaders(args) => run_shaders(args),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<CardConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let paths = AppPaths::discover()?;
            tracing::debug!(config = %paths.config_dir().display(), "resolved cardpreview paths");
            paths.config_file()
        }
    };

    let config = CardConfig::load_or_default(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        fps = config.playback.fps,
        scale = config.playback.scale,
        extension = %config.source.extension,
        "configuration loaded"
    );
    Ok(config)
}

fn run_render(config: &CardConfig, args: RenderArgs) -> Result<()> {
    let frame = image::open(&args.frame)
        .with_context(|| format!("failed to decode frame {}", args.frame.display()))?
        .to_rgba8();
    let settings = playback_settings(config, args.orientation, None);
    let orientation = settings.orientation;
    let (width, height) = args.size.unwrap_or_else(|| {
        orientation.output_size(frame.width(), frame.height(), settings.scale)
    });

    let mut renderer = build_renderer(args.backend, config, (width, height))
        .context("failed to initialise the alpha matte renderer")?;
    renderer.set_texture(&frame)?;
    renderer.render(width, height, orientation)?;
    let output = renderer.read_pixels()?;

    write_png(&output, &args.out)?;
    tracing::info!(
        out = %args.out.display(),
        width,
        height,
        %orientation,
        "composited frame"
    );
    Ok(())
}

fn run_play(config: &CardConfig, args: PlayArgs) -> Result<()> {
    let mut sequence = ImageSequence::load(&args.frames, args.source_fps, args.looping)?;
    let settings = playback_settings(config, args.orientation, args.fps);
    let gate = SourceGate::from_config(config);

    let (frame_width, frame_height) = sequence
        .first_frame()
        .map(|frame| frame.dimensions())
        .unwrap_or((1, 1));
    let canvas_size = settings
        .orientation
        .output_size(frame_width, frame_height, settings.scale);

    let preview = Preview::initialise(&gate, &args.url, || {
        build_renderer(args.backend, config, canvas_size)
    });
    let shaded = preview.is_shaded();
    let mut renderer: Box<dyn FrameRenderer> = match preview {
        Preview::Shaded(renderer) => renderer,
        Preview::Plain => Box::new(Passthrough::default()),
        Preview::NotReady => bail!("drawing surface is not available"),
    };

    if let Some(dir) = args.out_dir.as_ref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    tracing::info!(
        url = %args.url,
        frames = sequence.len(),
        shaded,
        fps = settings.fps,
        orientation = %settings.orientation,
        duration = %humantime::format_duration(args.duration),
        "starting playback"
    );

    let mut clock = DisplayClock::new(config.playback.refresh_interval);
    let mut driver = PlaybackDriver::new(settings);
    driver.on_play(&mut clock);

    let deadline_ms = args.duration.as_secs_f64() * 1000.0;
    let mut written = 0u32;
    loop {
        let refresh = clock.next_refresh();
        if refresh.at_ms >= deadline_ms {
            break;
        }
        sequence.advance(refresh.at_ms);
        let Some(handle) = refresh.due else {
            continue;
        };

        let outcome = driver
            .tick(handle, refresh.at_ms, &sequence, &mut renderer, &mut clock)
            .context("failed to draw frame")?;
        match outcome {
            TickOutcome::Drew => {
                tracing::trace!(at_ms = refresh.at_ms, index = sequence.current_index(), "drew frame");
                if let Some(dir) = args.out_dir.as_ref() {
                    let pixels = renderer.read_pixels()?;
                    write_png(&pixels, &frame_path(dir, written))?;
                }
                written += 1;
                if let Some(every) = args.toggle_every.filter(|every| *every > 0) {
                    if written % every == 0 {
                        let next = driver.orientation().toggled();
                        tracing::debug!(orientation = %next, "toggling orientation");
                        driver.set_orientation(next);
                    }
                }
            }
            TickOutcome::Stopped => {
                tracing::info!("playback ended");
                break;
            }
            TickOutcome::Waiting | TickOutcome::Stale => {}
        }
    }

    let stats = driver.teardown(&mut clock);
    tracing::info!(
        ticks = stats.ticks,
        draws = stats.draws,
        waits = stats.waits,
        stale = stats.stale,
        "playback finished"
    );
    Ok(())
}

fn run_shaders(args: ShadersArgs) -> Result<()> {
    let sources = ShaderSources::default();
    for orientation in Orientation::ALL {
        check_program(&sources.vertex, sources.fragment(orientation))
            .with_context(|| format!("bundled {orientation} program is invalid"))?;
    }

    let assets = [
        ("matte.vert", &*sources.vertex),
        ("horizontal.frag", sources.fragment(Orientation::Horizontal)),
        ("vertical.frag", sources.fragment(Orientation::Vertical)),
    ];

    match args.out_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (name, source) in assets {
                let path = dir.join(name);
                fs::write(&path, source)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            tracing::info!(dir = %dir.display(), version = SHADER_ASSET_VERSION, "exported shaders");
        }
        None => {
            for (name, source) in assets {
                println!("// {name} (asset version {SHADER_ASSET_VERSION})");
                println!("{source}");
            }
        }
    }
    Ok(())
}

fn playback_settings(
    config: &CardConfig,
    orientation: Option<Orientation>,
    fps: Option<f32>,
) -> PlaybackSettings {
    let mut settings = PlaybackSettings::from_config(config);
    if let Some(orientation) = orientation {
        settings.orientation = orientation;
    }
    match fps {
        Some(value) if value > 0.0 => settings.fps = value,
        Some(value) => tracing::warn!(fps = value, "ignoring non-positive fps override"),
        None => {}
    }
    settings
}

fn build_renderer(
    backend: Backend,
    config: &CardConfig,
    (width, height): (u32, u32),
) -> Result<Box<dyn FrameRenderer>, RenderError> {
    let sources = ShaderSources::default();
    match backend {
        Backend::Gpu => {
            let power = match config.render.gpu_power {
                PowerSetting::Low => GpuPowerPreference::Low,
                PowerSetting::High => GpuPowerPreference::High,
            };
            let gpu = GpuContext::headless(power)?;
            let canvas = Canvas::new(&gpu, width, height)?;
            let renderer = MatteRenderer::new(gpu, Some(canvas), &sources)?;
            tracing::info!(
                adapter = %renderer.adapter_profile().name,
                canvas = ?renderer.canvas_size(),
                "using GPU backend"
            );
            Ok(Box::new(renderer))
        }
        Backend::Cpu => {
            for orientation in Orientation::ALL {
                check_program(&sources.vertex, sources.fragment(orientation))?;
            }
            tracing::info!("using CPU backend");
            Ok(Box::new(CpuMatte::new()))
        }
    }
}

fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

fn write_png(image: &image::RgbaImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}
