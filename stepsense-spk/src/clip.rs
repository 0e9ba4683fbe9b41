//! Decoded alert clips and built-in tones

use crate::error::AudioError;
use hound::{SampleFormat, WavReader};
use std::f32::consts::TAU;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stepsense_core::ObstacleCategory;

/// Sample rate used for synthesized tones
pub const TONE_SAMPLE_RATE: u32 = 22_050;

/// Interleaved f32 PCM in [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self, AudioError> {
        if channels == 0 {
            return Err(AudioError::Format("Clip must have at least one channel".to_string()));
        }
        if sample_rate == 0 {
            return Err(AudioError::Format("Clip sample rate cannot be zero".to_string()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::Format(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples: samples.into(),
            channels,
            sample_rate,
        })
    }

    /// Decode a WAV file from disk
    pub fn from_wav_file(path: &Path) -> Result<Self, AudioError> {
        let file = std::fs::File::open(path)
            .map_err(|e| AudioError::Asset(format!("Cannot open {}: {}", path.display(), e)))?;
        Self::from_wav_reader(WavReader::new(std::io::BufReader::new(file))?)
    }

    /// Decode WAV bytes held in memory
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        Self::from_wav_reader(WavReader::new(Cursor::new(bytes))?)
    }

    fn from_wav_reader<R: Read>(mut reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();
        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let scale = (1_i64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
            (format, bits) => {
                return Err(AudioError::Format(format!(
                    "Unsupported WAV encoding: {:?} at {} bits",
                    format, bits
                )))
            }
        };
        Self::new(samples, spec.channels, spec.sample_rate)
    }

    /// Synthesize a built-in tone
    pub fn tone(tone: Tone) -> Self {
        let samples = tone.render(TONE_SAMPLE_RATE);
        Self {
            samples: samples.into(),
            channels: 1,
            sample_rate: TONE_SAMPLE_RATE,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Built-in alert tones, one per sound asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Rising sweep
    Whistle,
    /// Low decaying thump
    Thud,
    /// Short tick
    Click,
    /// Steady 880 Hz
    Beep,
    /// Falling sweep
    Swoosh,
}

impl Tone {
    pub fn for_category(category: ObstacleCategory) -> Self {
        match category {
            ObstacleCategory::Stairs => Tone::Whistle,
            ObstacleCategory::Wall => Tone::Thud,
            ObstacleCategory::Low => Tone::Click,
            ObstacleCategory::Head => Tone::Beep,
            ObstacleCategory::Ceiling => Tone::Swoosh,
            ObstacleCategory::Default => Tone::Beep,
        }
    }

    fn render(self, rate: u32) -> Vec<f32> {
        match self {
            Tone::Whistle => sweep(rate, 0.35, 1200.0, 2400.0, 0.6),
            Tone::Thud => decaying(rate, 0.30, 80.0, 12.0, 0.9),
            Tone::Click => decaying(rate, 0.015, 2000.0, 250.0, 0.8),
            Tone::Beep => sweep(rate, 0.20, 880.0, 880.0, 0.6),
            Tone::Swoosh => sweep(rate, 0.40, 1500.0, 300.0, 0.5),
        }
    }
}

/// Linear frequency sweep with short fades at both ends
fn sweep(rate: u32, seconds: f32, from_hz: f32, to_hz: f32, amplitude: f32) -> Vec<f32> {
    let total = (rate as f32 * seconds) as usize;
    let fade = (rate as f32 * 0.005) as usize;
    let mut phase = 0.0_f32;
    (0..total)
        .map(|i| {
            let progress = i as f32 / total as f32;
            let freq = from_hz + (to_hz - from_hz) * progress;
            phase = (phase + TAU * freq / rate as f32) % TAU;
            let edge = i.min(total - 1 - i);
            let envelope = if edge < fade { edge as f32 / fade as f32 } else { 1.0 };
            phase.sin() * amplitude * envelope
        })
        .collect()
}

/// Sine with exponential decay
fn decaying(rate: u32, seconds: f32, hz: f32, decay: f32, amplitude: f32) -> Vec<f32> {
    let total = (rate as f32 * seconds) as usize;
    (0..total)
        .map(|i| {
            let t = i as f32 / rate as f32;
            (TAU * hz * t).sin() * (-decay * t).exp() * amplitude
        })
        .collect()
}
