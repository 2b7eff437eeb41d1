//! Configuration errors raised when a filter cascade or meter setting cannot be built.
//!
//! These are caller mistakes: they surface synchronously at construction time so the
//! audio path never produces NaN or infinite levels from a bad design.

use std::fmt;

/// Rejected meter or filter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Sample rate was zero, negative, or not finite.
    InvalidSampleRate(f64),
    /// Cutoff frequency was zero, negative, or not finite.
    InvalidCutoff(f64),
    /// Cutoff frequency sits at or above the Nyquist limit for the sample rate.
    CutoffAboveNyquist { cutoff_hz: f64, nyquist_hz: f64 },
    /// Calibration offset was not a finite number.
    InvalidCalibration(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(rate) => {
                write!(f, "sample rate must be a positive finite value, got {rate}")
            }
            ConfigError::InvalidCutoff(cutoff) => {
                write!(f, "cutoff frequency must be a positive finite value, got {cutoff}")
            }
            ConfigError::CutoffAboveNyquist {
                cutoff_hz,
                nyquist_hz,
            } => write!(
                f,
                "cutoff {cutoff_hz:.3} Hz must be below the Nyquist limit {nyquist_hz:.3} Hz"
            ),
            ConfigError::InvalidCalibration(offset) => {
                write!(f, "calibration offset must be finite, got {offset}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
