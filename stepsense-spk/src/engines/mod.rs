//! Playback engines

pub mod cpal;
pub mod silent;

use crate::clip::AudioClip;
use crate::config::{AudioConfig, PlaybackEngineKind};
use crate::error::AudioError;
use parking_lot::Mutex;
use std::sync::Arc;

pub use self::cpal::CpalEngine;
pub use self::silent::SilentEngine;

/// Creates playable sounds from decoded clips
pub trait PlaybackEngine: Send + Sync {
    /// Register a clip and return a handle controlling it
    fn load(&self, name: &str, clip: AudioClip) -> Result<Arc<dyn AlertSound>, AudioError>;

    /// Engine name
    fn name(&self) -> &str;

    /// Whether the engine can produce output
    fn is_available(&self) -> bool;
}

/// A loaded sound that can be restarted at any time
pub trait AlertSound: Send + Sync {
    fn name(&self) -> &str;

    fn stop(&self) -> Result<(), AudioError>;

    fn set_muted(&self, muted: bool) -> Result<(), AudioError>;

    /// Volume in [0.0, 1.0]
    fn set_volume(&self, volume: f32) -> Result<(), AudioError>;

    /// Start from the beginning
    fn play(&self) -> Result<(), AudioError>;

    fn status(&self) -> PlaybackStatus;
}

/// Snapshot of a sound's playback state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    pub playing: bool,
    pub muted: bool,
    pub volume: f32,
    pub plays: u64,
}

/// Create the engine selected by the configuration
pub fn engine_from_config(config: &AudioConfig) -> Result<Arc<dyn PlaybackEngine>, AudioError> {
    config.validate().map_err(AudioError::Config)?;

    let engine: Arc<dyn PlaybackEngine> = match config.effective_engine() {
        PlaybackEngineKind::Cpal => Arc::new(CpalEngine::new(config.device_name.as_deref())?),
        PlaybackEngineKind::Silent => Arc::new(SilentEngine::new()),
    };
    Ok(engine)
}

/// Mutable state of one loaded sound, shared with the mixer
#[derive(Debug)]
pub(crate) struct VoiceState {
    pub clip: AudioClip,
    /// Source frames advanced per output frame
    pub step: f64,
    pub cursor: f64,
    pub playing: bool,
    pub muted: bool,
    pub volume: f32,
    pub plays: u64,
}

impl VoiceState {
    pub fn new(clip: AudioClip, output_rate: u32) -> Self {
        let step = clip.sample_rate() as f64 / output_rate.max(1) as f64;
        Self {
            clip,
            step,
            cursor: 0.0,
            playing: false,
            muted: false,
            volume: 1.0,
            plays: 0,
        }
    }
}

pub(crate) type SharedVoice = Arc<Mutex<VoiceState>>;

/// Handle over a shared voice
pub(crate) struct Voice {
    name: String,
    state: SharedVoice,
}

impl Voice {
    pub fn new(name: &str, state: SharedVoice) -> Self {
        Self {
            name: name.to_string(),
            state,
        }
    }
}

impl AlertSound for Voice {
    fn name(&self) -> &str {
        &self.name
    }

    fn stop(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        state.playing = false;
        state.cursor = 0.0;
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> Result<(), AudioError> {
        self.state.lock().muted = muted;
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(AudioError::Playback(format!(
                "Volume {} outside [0.0, 1.0]",
                volume
            )));
        }
        self.state.lock().volume = volume;
        Ok(())
    }

    fn play(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        state.cursor = 0.0;
        state.playing = true;
        state.plays += 1;
        Ok(())
    }

    fn status(&self) -> PlaybackStatus {
        let state = self.state.lock();
        PlaybackStatus {
            playing: state.playing,
            muted: state.muted,
            volume: state.volume,
            plays: state.plays,
        }
    }
}

/// Mix every playing voice into an interleaved output buffer.
///
/// Source frames are picked by nearest sample; mono sources are spread over
/// all output channels and extra source channels are dropped. Voices that
/// run past their last frame stop.
pub(crate) fn mix_into(voices: &[SharedVoice], out: &mut [f32], out_channels: usize) {
    out.iter_mut().for_each(|s| *s = 0.0);
    if out_channels == 0 {
        return;
    }

    for voice in voices {
        let mut guard = voice.lock();
        let state = &mut *guard;
        if !state.playing {
            continue;
        }

        let gain = if state.muted { 0.0 } else { state.volume };
        let channels = state.clip.channels() as usize;
        let frames = state.clip.frames();
        let samples = state.clip.samples();

        for frame in out.chunks_mut(out_channels) {
            let index = state.cursor as usize;
            if index >= frames {
                state.playing = false;
                state.cursor = 0.0;
                break;
            }
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample += samples[index * channels + channel.min(channels - 1)] * gain;
            }
            state.cursor += state.step;
        }
    }

    for sample in out.iter_mut() {
        *sample = sample.clamp(-1.0, 1.0);
    }
}
