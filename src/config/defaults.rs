pub const DEFAULT_CALIBRATION_OFFSET_DB: f64 = 0.0;
pub const MIN_CALIBRATION_OFFSET_DB: f64 = -50.0;
pub const MAX_CALIBRATION_OFFSET_DB: f64 = 50.0;

pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;

pub const DEFAULT_MEASURE_SECONDS: u64 = 10;
pub const MAX_MEASURE_SECONDS: u64 = 24 * 60 * 60;

pub const DEFAULT_REFRESH_MS: u64 = 100;
pub(super) const MIN_REFRESH_MS: u64 = 50;
pub(super) const MAX_REFRESH_MS: u64 = 2_000;

pub const DEFAULT_GRAPH_SECONDS: usize = 5;

pub const DEFAULT_FRAME_CHANNEL_CAPACITY: usize = crate::audio::DEFAULT_FRAME_CHANNEL_CAPACITY;
pub(super) const MIN_FRAME_CHANNEL_CAPACITY: usize = 8;
pub(super) const MAX_FRAME_CHANNEL_CAPACITY: usize = 1024;

pub const MAX_DEVICE_NAME_BYTES: usize = 256;
