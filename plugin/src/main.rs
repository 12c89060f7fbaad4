//! Scene-as-transition simulator.

use anyhow::Context;
use clap::Parser;
use scene_transition_types::{keys, Settings, TransitionSettings};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use scene_transition::config::{load_settings, SimConfig};
use scene_transition::version::VersionInfo;

/// Scene As Transition - plays one transition against a simulated host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (merged over the user and local config files)
    #[arg(short, long, env = "SCENE_TRANSITION_CONFIG")]
    config: Option<PathBuf>,

    /// Transition settings file (.json or .toml)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of video frames to render
    #[arg(long)]
    frames: Option<u32>,

    /// Video frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Bridge scene name (overrides the settings file)
    #[arg(long)]
    scene: Option<String>,

    /// Filter to trigger on the bridge scene (overrides the settings file)
    #[arg(long)]
    filter: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = SimConfig::from_figment(
        args.config.as_deref(),
        args.frames,
        args.fps,
        args.settings.clone(),
        args.log_level.clone(),
    )?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config)?;

    info!(
        "Starting scene-transition-sim {}",
        VersionInfo::get().display_version()
    );

    let mut settings = match &config.settings_path {
        Some(path) => load_settings(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::new(),
    };
    if let Some(scene) = &args.scene {
        settings.set_string(keys::SCENE, scene);
    }
    if let Some(filter) = &args.filter {
        settings.set_string(keys::FILTER, filter);
    }

    for problem in TransitionSettings::from_settings(&settings).problems() {
        warn!("Settings out of range, value will be clamped: {}", problem);
    }

    let report = scene_transition::sim::run(&config, &settings)?;

    match &report.bridge {
        Some(balance) if !balance.is_balanced() => {
            warn!("Bridge scene '{}' left unbalanced: {:?}", balance.scene, balance)
        }
        Some(balance) => info!("Bridge scene '{}' balanced", balance.scene),
        None => info!("No bridge scene configured"),
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Install the stderr logger and, when configured, a log file layer.
fn init_logging(
    config: &SimConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // Config log level overrides RUST_LOG, which overrides the "info" default
    let filter = match &config.log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(UtcTime::new(Rfc3339));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
