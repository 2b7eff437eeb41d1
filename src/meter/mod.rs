//! Sound-level measurement: calibrated dB per buffer, reading history, and Leq.
//!
//! Data flows one way: samples -> weighting cascade -> RMS -> dB -> history, with
//! statistics and Leq derived from the history on demand.

mod history;
mod leq;
mod level;

pub use history::{ReadingHistory, Statistics, MAX_BUFFER_SECONDS, READINGS_PER_SECOND};
pub use leq::compute_leq;
pub use level::{
    level_from_rms, rms, LevelMeter, LevelMeterConfig, MeterSnapshot, MeterState,
    DEFAULT_SAMPLE_RATE, MAX_DECIBEL_LEVEL, MIN_DECIBEL_LEVEL, REFERENCE_LEVEL, RMS_FLOOR,
};
