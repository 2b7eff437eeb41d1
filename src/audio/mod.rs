//! Audio capture plumbing around the level meter.
//!
//! Microphone input is captured via CPAL, downmixed to mono, cut into 100 ms frames
//! and handed over a bounded channel to one worker thread that owns the
//! [`crate::meter::LevelMeter`]. Display code reads a [`LiveMeter`] copy.

use crate::meter::READINGS_PER_SECOND;

mod capture;
mod dispatch;
mod live;
mod recorder;
#[cfg(test)]
mod tests;
mod worker;

pub use capture::{offline_measure_from_pcm, OfflineMeasurement};
pub use live::{LiveMeter, LiveView};
pub use recorder::{CaptureStream, Recorder, DEFAULT_FRAME_CHANNEL_CAPACITY};
pub use worker::{spawn_meter_worker, MeterJob};

/// Samples per frame so that one frame yields one reading at the history cadence.
pub fn frame_samples_for_rate(sample_rate: u32) -> usize {
    (sample_rate as usize / READINGS_PER_SECOND).max(1)
}
