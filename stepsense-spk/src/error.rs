//! Error types for stepsense-spk

use stepsense_core::Error as CoreError;
use thiserror::Error;

/// Audio playback errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Device error: {0}")]
    Device(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl From<AudioError> for CoreError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Config(msg) => CoreError::Configuration(msg),
            other => CoreError::Playback(other.to_string()),
        }
    }
}
