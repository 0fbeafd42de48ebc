//! Master volume command line tool
//!
//! Changes and shows the current volume and mute state of the default
//! audio device.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mastervol::{
    config::AppConfig,
    platform::AudioHost,
    LineSelector, Request, TierPreference, VolumeReport, VolumeService,
};

/// Change and show current master volume level
#[derive(Debug, Parser)]
#[command(name = "mastervol", version, about)]
struct Cli {
    /// New volume, 0 to 100 (values outside are clamped)
    #[arg(allow_negative_numbers = true)]
    volume: Option<f32>,

    /// Silent mode (does not print current volume)
    #[arg(short, long)]
    silent: bool,

    /// Mute the line
    #[arg(long, conflicts_with = "unmute")]
    mute: bool,

    /// Unmute the line
    #[arg(long)]
    unmute: bool,

    /// Print the mute state
    #[arg(long)]
    get_mute: bool,

    /// Line to operate on
    #[arg(short, long, value_enum)]
    line: Option<LineSelector>,

    /// Also operate the legacy waveform output register
    #[arg(long)]
    wave: bool,

    /// Backend tier
    #[arg(long, value_enum)]
    tier: Option<TierPreference>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn request(&self, config: &AppConfig) -> Result<Request> {
        let line = self.line.unwrap_or(config.control.line);
        let mut request =
            Request::new(line).with_wave_register(self.wave || config.control.wave_register);

        if let Some(percent) = self.volume {
            request = request.with_volume_percent(percent);
        }
        if self.mute || self.unmute {
            request = request.with_mute(self.mute);
        }
        if !self.silent {
            request = request.read_volume();
        }
        if self.get_mute {
            request = request.read_mute();
        }
        if request.operations.is_empty() {
            bail!("nothing to do: give a volume, --mute/--unmute or --get-mute");
        }
        Ok(request)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match AppConfig::default_path() {
            Some(path) => Ok(AppConfig::load_or_default(&path)?),
            None => Ok(AppConfig::default()),
        },
    }
}

#[cfg(windows)]
fn audio_host() -> Result<AudioHost> {
    Ok(AudioHost::system())
}

#[cfg(all(not(windows), feature = "simulation"))]
fn audio_host() -> Result<AudioHost> {
    tracing::warn!("No OS audio backend on this platform, using the simulated mixer");
    Ok(mastervol::platform::sim::SimAudio::new().host())
}

#[cfg(all(not(windows), not(feature = "simulation")))]
fn audio_host() -> Result<AudioHost> {
    bail!("mastervol requires Windows (build with --features simulation to try it elsewhere)")
}

fn print_report(report: &VolumeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    if let Some(percent) = report.volume_percent() {
        println!("{}", percent);
    }
    if let Some(muted) = report.muted {
        println!("{}", if muted { "muted" } else { "unmuted" });
    }
    if let Some(percent) = report.wave_volume_percent() {
        println!("wave {}", percent);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Логи в stderr, stdout только для результата
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tier = cli.tier.unwrap_or(config.control.tier).resolve();
    tracing::debug!("Using {} tier", tier);

    let request = cli.request(&config)?;

    let service = VolumeService::new(tier, audio_host()?);
    let report = service.execute(&request)?;
    print_report(&report, cli.json)
}
