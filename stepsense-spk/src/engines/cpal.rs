//! System audio output through cpal

use super::{mix_into, AlertSound, PlaybackEngine, SharedVoice, Voice, VoiceState};
use crate::clip::AudioClip;
use crate::error::AudioError;
use ::cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ::cpal::{Device, Host, SampleFormat, Stream};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

const MAX_DEVICES_TO_CHECK: usize = 100;

/// Output engine backed by the default host.
///
/// `cpal::Stream` is not `Send`, so a dedicated thread builds the stream and
/// keeps it alive until the engine is dropped. Loaded voices are shared with
/// the stream callback, which mixes them on every buffer.
pub struct CpalEngine {
    device_name: String,
    sample_rate: u32,
    channels: u16,
    voices: Arc<Mutex<Vec<SharedVoice>>>,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CpalEngine {
    /// Open an output device (substring match on `device_name`, else the default)
    pub fn new(device_name: Option<&str>) -> Result<Self, AudioError> {
        let voices: Arc<Mutex<Vec<SharedVoice>>> = Arc::new(Mutex::new(Vec::new()));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(String, u32, u16), AudioError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let requested = device_name.map(str::to_string);
        let callback_voices = voices.clone();
        let thread = std::thread::Builder::new()
            .name("stepsense-audio".to_string())
            .spawn(move || {
                let stream = match open_stream(requested.as_deref(), callback_voices) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Returns on shutdown or when the engine is dropped
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Audio output thread stopped");
            })?;

        let (device_name, sample_rate, channels) = ready_rx
            .recv()
            .map_err(|_| AudioError::Device("Audio thread exited before reporting".to_string()))??;

        info!(
            "Audio output on '{}' at {} Hz, {} channel(s)",
            device_name, sample_rate, channels
        );

        Ok(Self {
            device_name,
            sample_rate,
            channels,
            voices,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    fn find_device_by_name(host: &Host, name: &str) -> Result<Option<Device>, AudioError> {
        let devices = host
            .output_devices()
            .map_err(|e| AudioError::Device(format!("Failed to enumerate devices: {}", e)))?;

        for device in devices.take(MAX_DEVICES_TO_CHECK) {
            if let Ok(device_name) = device.name() {
                if device_name == name || device_name.contains(name) {
                    return Ok(Some(device));
                }
            }
        }

        Ok(None)
    }
}

/// Build and start the output stream; runs on the audio thread
fn open_stream(
    device_name: Option<&str>,
    voices: Arc<Mutex<Vec<SharedVoice>>>,
) -> Result<(Stream, (String, u32, u16)), AudioError> {
    let host = ::cpal::default_host();

    let device = match device_name {
        Some(name) => CpalEngine::find_device_by_name(&host, name)?
            .ok_or_else(|| AudioError::Device(format!("No output device matching '{}'", name)))?,
        None => host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("No output device available".to_string()))?,
    };
    let name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::Device(format!("Failed to get output config: {}", e)))?;
    let sample_format = supported.sample_format();
    let config = supported.config();
    let out_channels = config.channels as usize;

    let on_error = |err: ::cpal::StreamError| error!("Audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &::cpal::OutputCallbackInfo| {
                let voices = voices.lock();
                mix_into(&voices, data, out_channels);
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => {
            let mut scratch: Vec<f32> = Vec::new();
            device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &::cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    {
                        let voices = voices.lock();
                        mix_into(&voices, &mut scratch, out_channels);
                    }
                    for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                        *out = (sample * i16::MAX as f32) as i16;
                    }
                },
                on_error,
                None,
            )
        }
        other => {
            return Err(AudioError::Format(format!(
                "Unsupported output sample format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| AudioError::Device(format!("Failed to build stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| AudioError::Playback(format!("Failed to start stream: {}", e)))?;

    Ok((stream, (name, config.sample_rate.0, config.channels)))
}

impl PlaybackEngine for CpalEngine {
    fn load(&self, name: &str, clip: AudioClip) -> Result<Arc<dyn AlertSound>, AudioError> {
        let state = Arc::new(Mutex::new(VoiceState::new(clip, self.sample_rate)));
        self.voices.lock().push(state.clone());
        debug!("Loaded '{}' into output mixer", name);
        Ok(Arc::new(Voice::new(name, state)))
    }

    fn name(&self) -> &str {
        "cpal"
    }

    fn is_available(&self) -> bool {
        self.thread.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for CpalEngine {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Audio output thread panicked");
            }
        }
    }
}
