//! Engine that produces no output

use super::{AlertSound, PlaybackEngine, PlaybackStatus, Voice, VoiceState};
use crate::clip::AudioClip;
use crate::error::AudioError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Tracks playback state without an audio device. Used for headless runs
/// and tests; sounds stay "playing" until stopped.
#[derive(Debug, Default)]
pub struct SilentEngine;

impl SilentEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackEngine for SilentEngine {
    fn load(&self, name: &str, clip: AudioClip) -> Result<Arc<dyn AlertSound>, AudioError> {
        let rate = clip.sample_rate();
        let state = Arc::new(Mutex::new(VoiceState::new(clip, rate)));
        Ok(Arc::new(SilentSound {
            inner: Voice::new(name, state),
        }))
    }

    fn name(&self) -> &str {
        "silent"
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct SilentSound {
    inner: Voice,
}

impl AlertSound for SilentSound {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn stop(&self) -> Result<(), AudioError> {
        self.inner.stop()
    }

    fn set_muted(&self, muted: bool) -> Result<(), AudioError> {
        self.inner.set_muted(muted)
    }

    fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        self.inner.set_volume(volume)
    }

    fn play(&self) -> Result<(), AudioError> {
        self.inner.play()?;
        let status = self.inner.status();
        info!(
            "Alert '{}' (volume {:.2}{})",
            self.inner.name(),
            status.volume,
            if status.muted { ", muted" } else { "" }
        );
        Ok(())
    }

    fn status(&self) -> PlaybackStatus {
        self.inner.status()
    }
}
