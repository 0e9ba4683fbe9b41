// stepsense command line interface
// Captures a frame, asks the vision service what is in front of the camera
// and plays the matching alert sound.

mod display;
mod settings;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use settings::Settings;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stepsense_core::{
    Annotator, CapturedImage, Detections, Error as CoreError, ImageSource, ObstacleCategory,
    ScanOutcome, Scanner,
};
use stepsense_eye::wire::AnnotateResponse;
use stepsense_eye::{source_from_config, CloudVisionClient};
use stepsense_spk::engines::SilentEngine;
use stepsense_spk::{engine_from_config, AudioConfig, PlaybackEngineKind, SoundBank};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Longest wait for an alert to finish before exiting
const PLAYBACK_WAIT: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(name = "stepsense")]
#[command(about = "Obstacle alerts from camera frames", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML settings file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one detection cycle
    Scan {
        /// Show the raw label panel
        #[arg(long)]
        labels: bool,
    },

    /// Run detection cycles periodically until Ctrl-C
    Watch {
        /// Milliseconds between cycles (overrides watch.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Show the raw label panel
        #[arg(long)]
        labels: bool,
    },

    /// Classify a saved annotate response without capturing
    Replay {
        /// JSON body returned by the annotate endpoint
        response: PathBuf,

        /// Also play the alert
        #[arg(long)]
        play: bool,

        /// Show the raw label panel
        #[arg(long)]
        labels: bool,
    },

    /// Play every category's alert in turn
    Sounds {
        #[arg(long, default_value = "0.8")]
        volume: f64,
    },

    /// Print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { labels } => scan(&settings, labels).await,
        Commands::Watch { interval_ms, labels } => watch(&settings, interval_ms, labels).await,
        Commands::Replay { response, play, labels } => replay(&settings, response, play, labels).await,
        Commands::Sounds { volume } => sounds(&settings, volume).await,
        Commands::Config => {
            print!("{}", settings.to_redacted_toml()?);
            Ok(())
        }
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_sound_bank(config: &AudioConfig) -> anyhow::Result<Arc<SoundBank>> {
    let engine = engine_from_config(config).context("Failed to open audio output")?;
    let bank = SoundBank::load(engine, config).context("Failed to load alert sounds")?;
    Ok(Arc::new(bank))
}

fn build_scanner(settings: &Settings) -> anyhow::Result<(Scanner, Arc<SoundBank>)> {
    let source = source_from_config(&settings.capture).context("Failed to set up capture")?;
    let client = CloudVisionClient::new(&settings.vision).context("Failed to set up vision client")?;
    let bank = load_sound_bank(&settings.audio)?;

    info!("Capturing from {}", source.describe());
    let scanner = Scanner::new(source, Arc::new(client), bank.clone(), settings.classifier()?);
    Ok((scanner, bank))
}

async fn scan(settings: &Settings, labels: bool) -> anyhow::Result<()> {
    let (scanner, bank) = build_scanner(settings)?;
    let result = scanner.scan().await;
    println!("{}", display::render(&scanner.display(), labels));

    if let Ok(ScanOutcome::Alerted(ref detection)) = result {
        wait_for_playback(&bank, &settings.audio, detection.category).await;
    }
    result?;
    Ok(())
}

async fn watch(settings: &Settings, interval_ms: Option<u64>, labels: bool) -> anyhow::Result<()> {
    let interval_ms = interval_ms.unwrap_or(settings.watch.interval_ms);
    let mut watch_config = settings.watch.clone();
    watch_config.interval_ms = interval_ms;
    watch_config.validate().map_err(anyhow::Error::msg)?;

    let (scanner, bank) = build_scanner(settings)?;
    info!("Watching every {} ms, Ctrl-C to stop", interval_ms);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let cycles = watch_loop(&scanner, Duration::from_millis(interval_ms), labels, shutdown).await;

    info!("Stopped after {} cycles", cycles);
    bank.stop_all();
    Ok(())
}

/// Run a cycle on every tick until `shutdown` resolves.
///
/// A cycle still in flight when `shutdown` fires is dropped. Returns the
/// number of cycles that ran to completion.
async fn watch_loop<F>(scanner: &Scanner, interval: Duration, labels: bool, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut cycles = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("Abandoning cycle in flight");
                break;
            }
            // Failures are logged by the scanner; keep watching
            _ = scanner.scan() => {}
        }

        cycles += 1;
        println!("{}\n", display::render(&scanner.display(), labels));
    }
    cycles
}

async fn replay(settings: &Settings, response: PathBuf, play: bool, labels: bool) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(&response)
        .await
        .with_context(|| format!("Failed to read {}", response.display()))?;
    let detections = AnnotateResponse::from_json(&body)?.into_detections()?;

    let bank = if play {
        load_sound_bank(&settings.audio)?
    } else {
        Arc::new(SoundBank::load(Arc::new(SilentEngine::new()), &settings.audio)?)
    };

    let offline = Arc::new(Offline);
    let scanner = Scanner::new(offline.clone(), offline, bank.clone(), settings.classifier()?);
    let outcome = scanner.present(detections, play).await;
    println!("{}", display::render(&scanner.display(), labels));

    if let Ok(ScanOutcome::Alerted(ref detection)) = outcome {
        if play {
            wait_for_playback(&bank, &settings.audio, detection.category).await;
        }
    }
    outcome?;
    Ok(())
}

async fn sounds(settings: &Settings, volume: f64) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&volume) {
        anyhow::bail!("Volume must be between 0.0 and 1.0");
    }

    let bank = load_sound_bank(&settings.audio)?;
    for category in ObstacleCategory::ALL {
        println!("{:<8} {}", category.as_str(), category.sound_asset());
        bank.play(category, volume)?;
        wait_for_playback(&bank, &settings.audio, category).await;
    }
    Ok(())
}

/// Let a real output device finish the alert before the process exits
async fn wait_for_playback(bank: &SoundBank, audio: &AudioConfig, category: ObstacleCategory) {
    if audio.effective_engine() != PlaybackEngineKind::Cpal {
        return;
    }

    let started = Instant::now();
    while bank.status(category).map(|s| s.playing).unwrap_or(false) {
        if started.elapsed() >= PLAYBACK_WAIT {
            warn!("Alert for {} still playing, not waiting any longer", category);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Stand-in capture and annotate stages for replay, which never reaches them
struct Offline;

#[async_trait]
impl ImageSource for Offline {
    async fn capture(&self) -> stepsense_core::Result<CapturedImage> {
        Err(CoreError::Capture("no capture source during replay".to_string()))
    }

    fn describe(&self) -> String {
        "replay".to_string()
    }
}

#[async_trait]
impl Annotator for Offline {
    async fn annotate(&self, _image: &CapturedImage) -> stepsense_core::Result<Detections> {
        Err(CoreError::Vision("no vision service during replay".to_string()))
    }
}
