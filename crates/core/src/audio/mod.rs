//! Microphone capture feeding the signal normalizer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use tracing::{debug, info, warn};

use crate::{ColumnVjError, Result};

/// Polled source of time-domain samples.
pub trait SampleSource {
    /// Acquires the underlying device. Called once before polling.
    fn start(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;

    /// Copies the most recent block into `out`. Returns false when nothing
    /// has been captured yet.
    fn read_latest(&mut self, out: &mut Vec<f32>) -> bool;

    /// True while the capture stream is stalled and needs a resume.
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Input stream on a cpal device, keeping the last `block_size` samples of
/// the first channel.
pub struct MicrophoneCapture {
    device_name: Option<String>,
    block_size: usize,
    shared: Arc<Mutex<Vec<f32>>>,
    suspended: Arc<AtomicBool>,
    stream: Option<Stream>,
}

impl MicrophoneCapture {
    pub fn new(device_name: Option<String>, block_size: usize) -> Self {
        Self {
            device_name: device_name.filter(|name| !name.is_empty()),
            block_size: block_size.max(2),
            shared: Arc::new(Mutex::new(Vec::new())),
            suspended: Arc::new(AtomicBool::new(false)),
            stream: None,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn device_and_stream_config(&self) -> Result<(Device, StreamConfig)> {
        let host = cpal::default_host();
        let device = match &self.device_name {
            Some(wanted) => host
                .input_devices()
                .map_err(audio_error)?
                .find(|d| d.name().map(|n| &n == wanted).unwrap_or(false))
                .ok_or_else(|| {
                    ColumnVjError::AudioDevice(format!("audio device '{wanted}' not found"))
                })?,
            None => host
                .default_input_device()
                .ok_or_else(|| ColumnVjError::AudioDevice("no default input device".into()))?,
        };

        let stream_config = device.default_input_config().map_err(audio_error)?.into();
        Ok((device, stream_config))
    }

    fn lock(&self) -> Option<MutexGuard<'_, Vec<f32>>> {
        self.shared.lock().ok()
    }
}

impl SampleSource for MicrophoneCapture {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let (device, stream_config) = self.device_and_stream_config()?;
        let channels = usize::from(stream_config.channels);
        if channels < 1 {
            return Err(ColumnVjError::AudioDevice(
                "device must have at least one channel".into(),
            ));
        }

        let shared = self.shared.clone();
        let block_size = self.block_size;
        let suspended_flag = self.suspended.clone();
        let suspended_on_error = self.suspended.clone();

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _| {
                    let Ok(mut buffer) = shared.lock() else {
                        return;
                    };
                    buffer.extend(data.iter().step_by(channels).copied());
                    if buffer.len() > block_size {
                        let overflow = buffer.len() - block_size;
                        buffer.drain(..overflow);
                    }
                    suspended_flag.store(false, Ordering::Relaxed);
                },
                move |err| {
                    warn!(error = %err, "audio stream error, capture suspended");
                    suspended_on_error.store(true, Ordering::Relaxed);
                },
                None,
            )
            .map_err(audio_error)?;

        stream.play().map_err(audio_error)?;
        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate = stream_config.sample_rate.0,
            channels,
            "microphone capture started"
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn read_latest(&mut self, out: &mut Vec<f32>) -> bool {
        let Some(buffer) = self.lock() else {
            return false;
        };
        if buffer.is_empty() {
            return false;
        }
        out.clear();
        out.extend_from_slice(&buffer);
        true
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    fn resume(&mut self) -> Result<()> {
        let Some(stream) = &self.stream else {
            return Ok(());
        };
        stream.play().map_err(audio_error)?;
        self.suspended.store(false, Ordering::Relaxed);
        debug!("audio stream resumed");
        Ok(())
    }
}

impl std::fmt::Debug for MicrophoneCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrophoneCapture")
            .field("device_name", &self.device_name)
            .field("block_size", &self.block_size)
            .field("running", &self.stream.is_some())
            .field("suspended", &self.is_suspended())
            .finish()
    }
}

/// Names of the input devices on the default host.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    host.input_devices()
        .map_err(audio_error)?
        .map(|device| device.name().map_err(audio_error))
        .collect()
}

fn audio_error(err: impl std::fmt::Display) -> ColumnVjError {
    ColumnVjError::AudioDevice(err.to_string())
}
