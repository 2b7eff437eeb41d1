//! Sound level meter core: frequency weighting, calibrated dB readings, a bounded
//! reading history, and Leq, with CPAL capture plumbing around it.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
mod lock;
mod logging;
pub mod meter;
pub mod safety;
pub mod session;
mod telemetry;

pub(crate) use lock::lock_or_recover;
pub use error::ConfigError;
pub use logging::{
    crash_log_path, init_logging, install_panic_hook, log_debug, log_file_path, log_panic,
};
pub use meter::{LevelMeter, LevelMeterConfig};
pub use telemetry::tracing_log_path;
