//! Play every alert sound through the default output device

use std::sync::Arc;
use std::time::Duration;
use stepsense_core::ObstacleCategory;
use stepsense_spk::{engine_from_config, AudioConfig, SoundBank};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = AudioConfig::default();
    let engine = engine_from_config(&config)?;
    let bank = SoundBank::load(Arc::clone(&engine), &config)?;

    for category in ObstacleCategory::ALL {
        println!("{} -> {}", category, category.sound_asset());
        bank.play(category, 0.8)?;
        tokio::time::sleep(Duration::from_millis(600)).await;
    }

    Ok(())
}
