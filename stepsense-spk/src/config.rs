//! Configuration for alert playback

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Play alerts; when disabled the silent engine is used
    pub enabled: bool,

    /// Output engine
    pub engine: PlaybackEngineKind,

    /// Output device name (substring match), default device when unset
    pub device_name: Option<String>,

    /// Directory holding the alert WAV files; built-in tones when unset
    pub sounds_dir: Option<PathBuf>,

    /// Stop every other alert before starting a new one
    pub exclusive: bool,
}

/// Playback engine type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackEngineKind {
    /// System audio output through cpal
    Cpal,
    /// No output; playback state is tracked and logged only
    Silent,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: PlaybackEngineKind::Cpal,
            device_name: None,
            sounds_dir: None,
            exclusive: true,
        }
    }
}

impl AudioConfig {
    /// Engine actually used, taking `enabled` into account
    pub fn effective_engine(&self) -> PlaybackEngineKind {
        if self.enabled {
            self.engine
        } else {
            PlaybackEngineKind::Silent
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.device_name {
            if name.is_empty() {
                return Err("Device name cannot be empty if provided".to_string());
            }

            if name.len() > 256 {
                return Err("Device name too long (max 256 chars)".to_string());
            }

            if name.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("Device name contains invalid characters".to_string());
            }
        }

        if let Some(ref dir) = self.sounds_dir {
            if dir.as_os_str().is_empty() {
                return Err("Sounds directory cannot be empty if provided".to_string());
            }
            if dir.to_string_lossy().contains("..") {
                return Err("Sounds directory path cannot contain '..'".to_string());
            }
        }

        Ok(())
    }
}
