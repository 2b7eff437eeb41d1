//! Frequency-weighting cascades built from high-pass biquad stages.
//!
//! These approximate only the low-frequency roll-off of the IEC 61672 curves: A uses
//! two identical stages at the low pole, C pairs the low pole with a stage at the high
//! pole, and Z passes audio through untouched. Readings are therefore not lab-grade.

use super::biquad::{validate_sample_rate, Biquad};
use crate::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Low-frequency pole shared by the A and C curves (Hz).
pub const LOW_POLE_HZ: f64 = 20.598_997;

/// High-frequency pole of the A and C curves (Hz).
pub const HIGH_POLE_HZ: f64 = 12_194.217;

/// Frequency weighting applied before the RMS stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
pub enum WeightingMode {
    #[default]
    A,
    C,
    Z,
}

impl WeightingMode {
    /// Unit suffix shown next to a reading.
    pub fn label(self) -> &'static str {
        match self {
            WeightingMode::A => "dBA",
            WeightingMode::C => "dBC",
            WeightingMode::Z => "dBZ",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WeightingMode::A => "A-weighted (human hearing)",
            WeightingMode::C => "C-weighted (bass/music)",
            WeightingMode::Z => "Z-weighted (flat)",
        }
    }

    /// Cutoffs of the cascade, in application order.
    fn stage_cutoffs(self) -> &'static [f64] {
        match self {
            WeightingMode::A => &[LOW_POLE_HZ, LOW_POLE_HZ],
            WeightingMode::C => &[LOW_POLE_HZ, HIGH_POLE_HZ],
            WeightingMode::Z => &[],
        }
    }
}

impl std::fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered cascade of stages for one weighting mode and sample rate.
#[derive(Debug, Clone)]
pub struct WeightingFilterBank {
    mode: WeightingMode,
    sample_rate: f64,
    stages: Vec<Biquad>,
}

impl WeightingFilterBank {
    /// Build the cascade, failing fast when the sample rate cannot support it.
    ///
    /// C-weighting needs a sample rate above twice [`HIGH_POLE_HZ`] (about 24.4 kHz).
    pub fn new(mode: WeightingMode, sample_rate: f64) -> Result<Self, ConfigError> {
        validate_sample_rate(sample_rate)?;
        let stages = mode
            .stage_cutoffs()
            .iter()
            .map(|&cutoff| Biquad::high_pass(cutoff, sample_rate))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            mode,
            sample_rate,
            stages,
        })
    }

    pub fn mode(&self) -> WeightingMode {
        self.mode
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn stages(&self) -> &[Biquad] {
        &self.stages
    }

    /// Filter a copy of `input`, leaving the caller's buffer untouched.
    pub fn apply_to(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = input.to_vec();
        self.process_in_place(&mut output);
        output
    }

    /// Run every stage across the whole buffer before moving to the next stage.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for stage in self.stages.iter_mut() {
            stage.process_slice(buffer);
        }
    }

    /// Zero the delay registers of every stage.
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }
}
