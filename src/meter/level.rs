//! The level meter: weighting, RMS, calibrated dB, peak and history.
//!
//! A meter has a single writer. The capture thread owns it and calls
//! [`LevelMeter::process_buffer`] sequentially; display threads read copies through
//! [`LevelMeter::snapshot`] or a [`crate::audio::LiveMeter`].

use super::history::{ReadingHistory, Statistics};
use super::leq::compute_leq;
use crate::dsp::{WeightingFilterBank, WeightingMode};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Amplitude treated as 0 dB before calibration.
///
/// Chosen empirically so phone-class microphones land in a plausible SPL range; it is
/// not a physical 20 µPa reference, so uncalibrated readings are approximate.
pub const REFERENCE_LEVEL: f64 = 0.0001;

/// Smallest RMS fed to the logarithm, so silence never reaches `log10(0)`.
pub const RMS_FLOOR: f64 = 1e-10;

pub const MIN_DECIBEL_LEVEL: f64 = 0.0;
pub const MAX_DECIBEL_LEVEL: f64 = 140.0;

/// Default sample rate assumed before capture reports the device rate.
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// Settings the host applies to a meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelMeterConfig {
    pub weighting: WeightingMode,
    pub calibration_offset_db: f64,
    pub sample_rate: f64,
}

impl Default for LevelMeterConfig {
    fn default() -> Self {
        Self {
            weighting: WeightingMode::A,
            calibration_offset_db: 0.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl LevelMeterConfig {
    /// Check the config by building the cascade it describes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_calibration(self.calibration_offset_db)?;
        WeightingFilterBank::new(self.weighting, self.sample_rate).map(|_| ())
    }
}

fn validate_calibration(offset_db: f64) -> Result<(), ConfigError> {
    if !offset_db.is_finite() {
        return Err(ConfigError::InvalidCalibration(offset_db));
    }
    Ok(())
}

/// Capture lifecycle. Both edges are instantaneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeterState {
    Idle,
    Running,
}

/// Copy-out view of the meter for display consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub state: MeterState,
    pub weighting: WeightingMode,
    pub current_db: f64,
    pub peak_db: f64,
    pub statistics: Statistics,
}

impl Default for MeterSnapshot {
    fn default() -> Self {
        Self {
            state: MeterState::Idle,
            weighting: WeightingMode::default(),
            current_db: 0.0,
            peak_db: 0.0,
            statistics: Statistics::EMPTY,
        }
    }
}

/// Convert a buffer RMS into a calibrated, clamped level.
pub fn level_from_rms(rms: f64, calibration_offset_db: f64) -> f64 {
    let safe_rms = rms.max(RMS_FLOOR);
    let db_raw = 20.0 * (safe_rms / REFERENCE_LEVEL).log10();
    let db_compensated = db_raw + calibration_offset_db;
    db_compensated.clamp(MIN_DECIBEL_LEVEL, MAX_DECIBEL_LEVEL)
}

/// `sqrt(mean(x²))`, accumulated in f64.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f64 = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    (energy / samples.len() as f64).sqrt()
}

pub struct LevelMeter {
    config: LevelMeterConfig,
    state: MeterState,
    bank: Option<WeightingFilterBank>,
    history: ReadingHistory,
    statistics: Statistics,
    current_level: f64,
    peak_level: f64,
    scratch: Vec<f32>,
}

impl LevelMeter {
    pub fn new(config: LevelMeterConfig) -> Self {
        Self::with_history(config, ReadingHistory::default())
    }

    pub fn with_history(config: LevelMeterConfig, history: ReadingHistory) -> Self {
        Self {
            config,
            state: MeterState::Idle,
            bank: None,
            history,
            statistics: Statistics::EMPTY,
            current_level: 0.0,
            peak_level: 0.0,
            scratch: Vec::new(),
        }
    }

    /// Idle -> Running: build the cascade for `sample_rate` and restart peak tracking.
    ///
    /// Starting a running meter is a no-op. History and statistics are kept; clear
    /// them with [`LevelMeter::reset_statistics`].
    pub fn start(&mut self, sample_rate: f64) -> Result<(), ConfigError> {
        if self.state == MeterState::Running {
            return Ok(());
        }
        validate_calibration(self.config.calibration_offset_db)?;
        let bank = WeightingFilterBank::new(self.config.weighting, sample_rate)?;
        self.config.sample_rate = sample_rate;
        self.bank = Some(bank);
        self.state = MeterState::Running;
        self.peak_level = self.current_level;
        tracing::info!(
            weighting = self.config.weighting.label(),
            sample_rate,
            calibration_offset_db = self.config.calibration_offset_db,
            "meter_started"
        );
        Ok(())
    }

    /// Running -> Idle. The cascade is released; readings stay available.
    pub fn stop(&mut self) {
        if self.state == MeterState::Idle {
            return;
        }
        self.state = MeterState::Idle;
        self.bank = None;
        tracing::info!(
            readings = self.history.len(),
            peak_db = self.peak_level,
            "meter_stopped"
        );
    }

    /// Measure one buffer of mono samples and append the resulting reading.
    ///
    /// Returns the new level, or `None` while idle or for an empty buffer.
    pub fn process_buffer(&mut self, samples: &[f32]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let bank = match (self.state, self.bank.as_mut()) {
            (MeterState::Running, Some(bank)) => bank,
            _ => return None,
        };

        // NaN or infinite input would stick in the delay registers; meter it as silence.
        let mut non_finite = 0usize;
        self.scratch.clear();
        self.scratch.extend(samples.iter().map(|&sample| {
            if sample.is_finite() {
                sample
            } else {
                non_finite += 1;
                0.0
            }
        }));
        if non_finite > 0 {
            tracing::warn!(non_finite, frame_len = samples.len(), "meter_non_finite_input");
        }
        bank.process_in_place(&mut self.scratch);

        let rms = if self.scratch.iter().all(|sample| sample.is_finite()) {
            rms(&self.scratch)
        } else {
            // A stage overflowed f32. Clear the cascade so later frames recover and
            // report the frame at full scale.
            bank.reset();
            tracing::warn!(weighting = self.config.weighting.label(), "meter_filter_overflow");
            f64::INFINITY
        };
        let level = level_from_rms(rms, self.config.calibration_offset_db);

        self.current_level = level;
        self.peak_level = self.peak_level.max(level);
        self.history.append(level);
        self.statistics = self.history.statistics();
        Some(level)
    }

    /// Switch weighting. A running meter rebuilds its cascade with zeroed delay state;
    /// on failure the previous mode and cascade stay in place.
    pub fn set_weighting(&mut self, mode: WeightingMode) -> Result<(), ConfigError> {
        if self.state == MeterState::Running {
            let bank = WeightingFilterBank::new(mode, self.config.sample_rate)?;
            self.bank = Some(bank);
        }
        self.config.weighting = mode;
        tracing::info!(weighting = mode.label(), "meter_weighting_changed");
        Ok(())
    }

    /// Set the additive offset applied after the dB conversion.
    pub fn set_calibration(&mut self, offset_db: f64) -> Result<(), ConfigError> {
        validate_calibration(offset_db)?;
        self.config.calibration_offset_db = offset_db;
        tracing::info!(calibration_offset_db = offset_db, "meter_calibration_changed");
        Ok(())
    }

    /// Clear history and statistics; peak falls back to the current level.
    pub fn reset_statistics(&mut self) {
        self.history.clear();
        self.statistics = Statistics::EMPTY;
        self.peak_level = self.current_level;
        tracing::debug!("meter_statistics_reset");
    }

    pub fn reset_peak(&mut self) {
        self.peak_level = self.current_level;
    }

    pub fn current_level(&self) -> f64 {
        self.current_level
    }

    pub fn peak_level(&self) -> f64 {
        self.peak_level
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn recent_readings(&self, seconds: usize) -> Vec<f64> {
        self.history.window(seconds)
    }

    pub fn all_readings(&self) -> Vec<f64> {
        self.history.to_vec()
    }

    pub fn history(&self) -> &ReadingHistory {
        &self.history
    }

    /// Leq over every reading currently held.
    pub fn calculate_leq(&self) -> f64 {
        compute_leq(self.history.iter())
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MeterState::Running
    }

    pub fn config(&self) -> LevelMeterConfig {
        self.config
    }

    pub fn filter_bank(&self) -> Option<&WeightingFilterBank> {
        self.bank.as_ref()
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            state: self.state,
            weighting: self.config.weighting,
            current_db: self.current_level,
            peak_db: self.peak_level,
            statistics: self.statistics,
        }
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new(LevelMeterConfig::default())
    }
}
