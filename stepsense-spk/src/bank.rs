//! Preloaded alert sounds, one per obstacle category

use crate::clip::{AudioClip, Tone};
use crate::config::AudioConfig;
use crate::engines::{AlertSound, PlaybackEngine, PlaybackStatus};
use crate::error::AudioError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use stepsense_core::{AlertPlayer, ObstacleCategory};
use tracing::{debug, info, warn};

/// Alert sounds keyed by category
pub struct SoundBank {
    sounds: HashMap<ObstacleCategory, Arc<dyn AlertSound>>,
    exclusive: bool,
    engine_name: String,
}

impl SoundBank {
    /// Load every category's sound through `engine`.
    ///
    /// With `sounds_dir` set, each category's asset file is decoded from that
    /// directory; otherwise the built-in tones are used.
    pub fn load(engine: Arc<dyn PlaybackEngine>, config: &AudioConfig) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::Config)?;

        if let Some(ref dir) = config.sounds_dir {
            if !dir.is_dir() {
                return Err(AudioError::Asset(format!(
                    "Sounds directory not found: {}",
                    dir.display()
                )));
            }
        }

        let mut decoded: HashMap<&'static str, AudioClip> = HashMap::new();
        let mut sounds = HashMap::new();
        for category in ObstacleCategory::ALL {
            let asset = category.sound_asset();
            let clip = match decoded.get(asset) {
                Some(clip) => clip.clone(),
                None => {
                    let clip = match config.sounds_dir {
                        Some(ref dir) => Self::decode_asset(dir, asset)?,
                        None => AudioClip::tone(Tone::for_category(category)),
                    };
                    decoded.insert(asset, clip.clone());
                    clip
                }
            };
            debug!(
                "Prepared {} for {} ({} ms)",
                asset,
                category,
                clip.duration().as_millis()
            );
            sounds.insert(category, engine.load(asset, clip)?);
        }

        info!(
            "Loaded {} alert sounds on the {} engine",
            sounds.len(),
            engine.name()
        );

        Ok(Self {
            sounds,
            exclusive: config.exclusive,
            engine_name: engine.name().to_string(),
        })
    }

    /// Build a bank from already loaded sounds
    pub fn from_sounds(
        sounds: HashMap<ObstacleCategory, Arc<dyn AlertSound>>,
        exclusive: bool,
    ) -> Self {
        Self {
            sounds,
            exclusive,
            engine_name: "custom".to_string(),
        }
    }

    fn decode_asset(dir: &Path, asset: &str) -> Result<AudioClip, AudioError> {
        let path = dir.join(asset);
        AudioClip::from_wav_file(&path)
            .map_err(|e| AudioError::Asset(format!("{}: {}", path.display(), e)))
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// Sound for `category`, falling back to the default alert
    pub fn sound(&self, category: ObstacleCategory) -> Option<&Arc<dyn AlertSound>> {
        self.sounds
            .get(&category)
            .or_else(|| self.sounds.get(&ObstacleCategory::Default))
    }

    pub fn status(&self, category: ObstacleCategory) -> Option<PlaybackStatus> {
        self.sound(category).map(|sound| sound.status())
    }

    /// Restart the category's sound at `volume`
    pub fn play(&self, category: ObstacleCategory, volume: f64) -> Result<(), AudioError> {
        let sound = self
            .sound(category)
            .ok_or_else(|| AudioError::Asset(format!("No sound loaded for {}", category)))?;

        if self.exclusive {
            for other in self.sounds.values() {
                if !Arc::ptr_eq(other, sound) && other.status().playing {
                    other.stop()?;
                }
            }
        }

        sound.stop()?;
        sound.set_muted(false)?;
        sound.set_volume(volume.clamp(0.0, 1.0) as f32)?;
        sound.play()?;

        debug!("Playing {} at volume {:.2}", sound.name(), volume);
        Ok(())
    }

    /// Stop every sound
    pub fn stop_all(&self) {
        for sound in self.sounds.values() {
            if let Err(e) = sound.stop() {
                warn!("Failed to stop {}: {}", sound.name(), e);
            }
        }
    }
}

#[async_trait]
impl AlertPlayer for SoundBank {
    async fn play_alert(&self, category: ObstacleCategory, volume: f64) -> stepsense_core::Result<()> {
        self.play(category, volume)?;
        Ok(())
    }
}
