//! Offline driver: measure a PCM buffer the way the live pipeline would.
//!
//! Used by tests and tooling that have samples in memory instead of a device.

use super::dispatch::append_downmixed_samples;
use super::frame_samples_for_rate;
use crate::error::ConfigError;
use crate::meter::{compute_leq, LevelMeter, LevelMeterConfig, MeterSnapshot, READINGS_PER_SECOND};
use crate::session::MeasurementSession;

/// Result of an offline run.
#[derive(Debug, Clone)]
pub struct OfflineMeasurement {
    /// One level per frame, in order; not capped by the meter's history.
    pub levels: Vec<f64>,
    pub snapshot: MeterSnapshot,
    /// Leq over every frame.
    pub leq: f64,
    /// Session sampled once per second of audio, finished at the end of the input.
    pub session: MeasurementSession,
}

/// Downmix interleaved `samples`, cut them into 100 ms frames and meter each one.
///
/// A trailing partial frame is measured as it is. Configuration problems (bad rate,
/// C-weighting below ~24.4 kHz, non-finite calibration) fail before any sample is read.
pub fn offline_measure_from_pcm(
    samples: &[f32],
    channels: usize,
    sample_rate: u32,
    config: &LevelMeterConfig,
) -> Result<OfflineMeasurement, ConfigError> {
    let mut meter = LevelMeter::new(*config);
    meter.start(f64::from(sample_rate))?;

    let mut mono = Vec::with_capacity(samples.len() / channels.max(1));
    append_downmixed_samples(&mut mono, samples, channels, |sample| sample);

    let mut session =
        MeasurementSession::starting_at(config.weighting, config.calibration_offset_db, 0.0);
    let mut levels = Vec::new();
    for frame in mono.chunks(frame_samples_for_rate(sample_rate)) {
        if let Some(level) = meter.process_buffer(frame) {
            if levels.len() % READINGS_PER_SECOND == 0 {
                session.add_reading(level);
            }
            levels.push(level);
        }
    }
    meter.stop();
    session.finish_at(mono.len() as f64 / f64::from(sample_rate));

    Ok(OfflineMeasurement {
        leq: compute_leq(levels.iter().copied()),
        snapshot: meter.snapshot(),
        levels,
        session,
    })
}
