use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use feedconfig::FeederConfig;
use feeder::{FeederSettings, FrameFeeder, PngEncoder, SteppedClock};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::trace::TraceHost;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let settings = FeederSettings::from(&config);
    let (width, height) = config.resolution();
    tracing::info!(
        width,
        height,
        frames = args.frames,
        create_window = config.window.create_window,
        show_ui = config.window.show_ui,
        capture = ?settings.capture.as_ref().map(|trigger| trigger.trigger_frame),
        "starting dry-run feeder"
    );
    if config.window.create_window {
        tracing::debug!("dry-run host renders off-screen; create_window is ignored");
    }

    let stdout = io::stdout();
    let mut host = TraceHost::new(width, height, args.frames, stdout.lock());

    let summary = match args.step_ms {
        Some(step) => {
            let clock = SteppedClock::new(Duration::from_millis(step));
            FrameFeeder::with_parts(settings, clock, PngEncoder).run(&mut host)?
        }
        None => FrameFeeder::new(settings).run(&mut host)?,
    };

    match summary.capture {
        Some(report) => tracing::info!(
            frames = summary.frames,
            native = %report.native.display(),
            manual = %report.manual.display(),
            "run finished with capture"
        ),
        None => tracing::info!(frames = summary.frames, "run finished"),
    }
    Ok(())
}

pub fn print_config(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let rendered = config
        .to_toml_string()
        .context("failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<FeederConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => {
            let config = FeederConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded feeder configuration");
            config
        }
        None => FeederConfig::default(),
    };

    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }

    let capture = &mut config.capture;
    if let Some(frame) = args.trigger_frame {
        capture.enabled = true;
        capture.trigger_frame = frame;
    }
    if let Some(dir) = args.captures.as_ref() {
        capture.enabled = true;
        capture.directory = dir.clone();
    }
    if let Some(shader) = args.next_shader.as_ref() {
        capture.next_shader = Some(shader.clone());
    }
    if args.no_capture {
        capture.enabled = false;
    }

    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;
    Ok(config)
}
