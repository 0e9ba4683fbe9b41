//! stepsense-spk: alert playback
//!
//! Provides:
//! - WAV decoding and built-in synthesized alert tones
//! - Playback engines (cpal output device, silent)
//! - A preloaded sound bank implementing the `AlertPlayer` port

pub mod error;
pub mod config;
pub mod clip;
pub mod engines;
pub mod bank;

pub use error::AudioError;
pub use config::{AudioConfig, PlaybackEngineKind};
pub use clip::{AudioClip, Tone};
pub use engines::{engine_from_config, AlertSound, PlaybackEngine, PlaybackStatus};
pub use bank::SoundBank;
