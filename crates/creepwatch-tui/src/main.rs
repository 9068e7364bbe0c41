//! `creepwatch` — terminal dashboard for spotting wireless devices that
//! follow you.
//!
//! Connects to a Kismet sensor, polls its device registry for records
//! updated since the last pass, scores each located device by the
//! great-circle spread between its extreme recorded positions, and keeps
//! a live table of everything seen — devices over the configured drift
//! threshold are flagged as creeps.
//!
//! Logs are written to a file (default `/tmp/creepwatch.log`) to avoid
//! corrupting the terminal UI. A background data bridge task streams row
//! updates from the monitor into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, config
//! layering, and app launch.

mod action;
mod app;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use creepwatch_config::{load_config_from, load_config_or_default, to_sensor_config, to_settings};
use creepwatch_core::{Monitor, Unit};

use crate::app::App;

/// Terminal dashboard for creep detection against a Kismet sensor.
#[derive(Parser, Debug)]
#[command(name = "creepwatch", version, about)]
struct Cli {
    /// Kismet server URL (e.g., http://localhost:2501)
    #[arg(short = 'u', long, env = "CREEPWATCH_URL")]
    url: Option<String>,

    /// Kismet httpd username (password comes from CREEPWATCH_PASSWORD,
    /// the keyring, or the config file)
    #[arg(long, env = "CREEPWATCH_USERNAME")]
    username: Option<String>,

    /// Skip TLS certificate verification (self-signed sensors)
    #[arg(long)]
    insecure: bool,

    /// Config file path (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Drift threshold for flagging, in the configured unit
    #[arg(short = 't', long)]
    threshold: Option<f64>,

    /// Distance unit: km, mile, meter, or nmi
    #[arg(long)]
    unit: Option<Unit>,

    /// Show only devices over the threshold
    #[arg(long)]
    creeps_only: bool,

    /// Window selector for the first fetch (1 = session start, -N = last
    /// N seconds, or an absolute epoch)
    #[arg(long)]
    since: Option<i64>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log file path (defaults to /tmp/creepwatch.log)
    #[arg(long, default_value = "/tmp/creepwatch.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Route tracing to a file — stdout belongs to the terminal UI and must
/// stay clean. The returned guard flushes buffered lines on drop, so it
/// has to outlive the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "creepwatch={level},creepwatch_core={level},creepwatch_api={level}"
        ))
    });

    let dir = cli.log_file.parent().unwrap_or(Path::new("/tmp"));
    let file = cli
        .log_file
        .file_name()
        .unwrap_or(OsStr::new("creepwatch.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = setup_tracing(&cli);
    tui::install_hooks()?;

    // Config file layered under env, then CLI flags on top.
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config_or_default(),
    };

    if let Some(ref url) = cli.url {
        config.sensor.url = url.clone();
    }
    if let Some(ref username) = cli.username {
        config.sensor.username = Some(username.clone());
    }
    if cli.insecure {
        config.sensor.insecure = true;
    }
    if let Some(threshold) = cli.threshold {
        config.tracking.threshold_distance = threshold;
    }
    if let Some(unit) = cli.unit {
        config.tracking.unit = unit;
    }
    if cli.creeps_only {
        config.tracking.show_only_creeps = true;
    }
    if let Some(since) = cli.since {
        config.tracking.initial_window_secs = since;
    }
    if let Some(interval) = cli.interval_ms {
        config.tracking.poll_interval_ms = interval;
    }

    let sensor = to_sensor_config(&config)?;
    let settings = to_settings(&config);
    settings.validate()?;

    info!(url = %sensor.url, "starting creepwatch");

    let monitor = Monitor::new(sensor, settings.clone());
    App::new(settings).run(monitor).await
}
