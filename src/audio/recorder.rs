//! System microphone capture via CPAL.
//!
//! Handles device enumeration and sample-format conversion. Callback buffers are
//! downmixed to mono and re-chunked into fixed frames on a bounded channel, so the
//! meter thread sees one 100 ms frame per reading.

use super::dispatch::FrameDispatcher;
use super::frame_samples_for_rate;
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Frames buffered between the callback and the meter thread (~3 s at 10 Hz).
pub const DEFAULT_FRAME_CHANNEL_CAPACITY: usize = 32;

/// Audio input device wrapper.
pub struct Recorder {
    device: cpal::Device,
}

impl Recorder {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open the named input device, or the system default when `preferred_device` is `None`.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host
                .default_input_device()
                .context("no default input device available")?,
        };
        Ok(Self { device })
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Native sample rate of the device's default input configuration.
    pub fn default_sample_rate(&self) -> Result<u32> {
        let config = self
            .device
            .default_input_config()
            .context("failed to query default input config")?;
        Ok(config.sample_rate().0)
    }

    /// Start streaming 100 ms mono frames.
    ///
    /// `sample_rate` overrides the device default; the device must support it. The
    /// stream runs until the returned [`CaptureStream`] is dropped, at which point the
    /// frame receiver disconnects.
    pub fn start_stream(
        &self,
        sample_rate: Option<u32>,
        channel_capacity: usize,
    ) -> Result<(CaptureStream, Receiver<Vec<f32>>)> {
        let default_config = self
            .device
            .default_input_config()
            .context("failed to query default input config")?;
        let format = default_config.sample_format();
        let mut device_config: StreamConfig = default_config.into();
        if let Some(rate) = sample_rate {
            device_config.sample_rate = cpal::SampleRate(rate);
        }
        let stream_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let frame_samples = frame_samples_for_rate(stream_rate);

        log_debug(&format!(
            "Recorder config: format={format:?} sample_rate={stream_rate}Hz channels={channels} frame_samples={frame_samples}"
        ));

        let (sender, receiver) = bounded::<Vec<f32>>(channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(Mutex::new(FrameDispatcher::new(
            frame_samples,
            sender,
            dropped.clone(),
        )));

        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));
        let stream = match format {
            SampleFormat::F32 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| sample);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| sample as f32 / 32_768.0);
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let dispatcher = dispatcher.clone();
                let dropped = dropped.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut pump) = dispatcher.try_lock() {
                            pump.push(data, channels, |sample| {
                                (sample as f32 - 32_768.0) / 32_768.0
                            });
                        } else {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        }
        .with_context(|| {
            format!(
                "failed to open input stream on '{}' at {stream_rate} Hz. {}",
                self.device_name(),
                mic_permission_hint()
            )
        })?;

        stream.play().context("failed to start input stream")?;
        tracing::info!(
            device = %self.device_name(),
            sample_rate = stream_rate,
            channels,
            frame_samples,
            "capture_started"
        );

        Ok((
            CaptureStream {
                stream,
                sample_rate: stream_rate,
                dropped,
            },
            receiver,
        ))
    }
}

/// A live input stream. Dropping it stops capture and disconnects the frame channel.
pub struct CaptureStream {
    stream: cpal::Stream,
    sample_rate: u32,
    dropped: Arc<AtomicUsize>,
}

impl CaptureStream {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames discarded because the meter thread fell behind.
    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Pause and release the device; returns the final dropped-frame count.
    pub fn stop(self) -> usize {
        if let Err(err) = self.stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        let dropped = self.dropped_frames();
        drop(self.stream);
        tracing::info!(dropped_frames = dropped, "capture_stopped");
        dropped
    }
}

pub(crate) fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
