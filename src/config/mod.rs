//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use crate::dsp::WeightingMode;
use clap::Parser;

pub use defaults::{
    DEFAULT_CALIBRATION_OFFSET_DB, DEFAULT_FRAME_CHANNEL_CAPACITY, DEFAULT_GRAPH_SECONDS,
    DEFAULT_MEASURE_SECONDS, DEFAULT_REFRESH_MS, MAX_CALIBRATION_OFFSET_DB, MAX_DEVICE_NAME_BYTES,
    MAX_MEASURE_SECONDS, MAX_SAMPLE_RATE, MIN_CALIBRATION_OFFSET_DB, MIN_SAMPLE_RATE,
};

/// CLI options for the splmeter sound level meter.
#[derive(Debug, Parser, Clone)]
#[command(about = "splmeter sound level meter", author, version)]
pub struct AppConfig {
    /// Frequency weighting applied before the level is computed
    #[arg(long, value_enum, default_value_t = WeightingMode::A)]
    pub weighting: WeightingMode,

    /// Additive correction applied to every reading (dB)
    #[arg(
        long = "calibration-offset",
        allow_negative_numbers = true,
        default_value_t = DEFAULT_CALIBRATION_OFFSET_DB
    )]
    pub calibration_offset_db: f64,

    /// Capture sample rate override (Hz); defaults to the device rate
    #[arg(long = "sample-rate")]
    pub sample_rate: Option<u32>,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Measurement duration in seconds
    #[arg(long, default_value_t = DEFAULT_MEASURE_SECONDS)]
    pub seconds: u64,

    /// Display refresh interval (milliseconds)
    #[arg(long = "refresh-ms", default_value_t = DEFAULT_REFRESH_MS)]
    pub refresh_ms: u64,

    /// Seconds of history shown in the mini graph
    #[arg(long = "graph-seconds", default_value_t = DEFAULT_GRAPH_SECONDS)]
    pub graph_seconds: usize,

    /// Frames buffered between capture and the meter thread
    #[arg(
        long = "frame-channel-capacity",
        default_value_t = DEFAULT_FRAME_CHANNEL_CAPACITY
    )]
    pub frame_channel_capacity: usize,

    /// Print the session summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SPLMETER_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SPLMETER_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}
