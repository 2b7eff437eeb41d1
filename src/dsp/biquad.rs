//! Second-order IIR section with persistent delay registers.
//!
//! Coefficients are kept in f64 while the audio path stays in f32, so cascading
//! several stages does not accumulate single-precision rounding in the feedback loop.

use crate::error::ConfigError;
use std::f64::consts::PI;

/// Quality factor of every high-pass stage (Butterworth, rounded as in the meter's calibration).
pub const BUTTERWORTH_Q: f64 = 0.707;

/// Normalized biquad coefficients with `a0` already divided out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoefficients {
    /// Design a Butterworth high-pass section at `cutoff_hz`.
    ///
    /// # Errors
    /// The design only yields a stable, physical filter when `sample_rate > 0` and
    /// `0 < cutoff_hz < sample_rate / 2`. Anything else is rejected instead of clamped.
    pub fn high_pass(cutoff_hz: f64, sample_rate: f64) -> Result<Self, ConfigError> {
        validate_design(cutoff_hz, sample_rate)?;

        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * BUTTERWORTH_Q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Ok(Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        })
    }

    pub fn b0(&self) -> f64 {
        self.b0
    }

    pub fn b1(&self) -> f64 {
        self.b1
    }

    pub fn b2(&self) -> f64 {
        self.b2
    }

    pub fn a1(&self) -> f64 {
        self.a1
    }

    pub fn a2(&self) -> f64 {
        self.a2
    }
}

/// Reject sample rates that are not positive and finite.
pub(crate) fn validate_sample_rate(sample_rate: f64) -> Result<(), ConfigError> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

fn validate_design(cutoff_hz: f64, sample_rate: f64) -> Result<(), ConfigError> {
    validate_sample_rate(sample_rate)?;
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
        return Err(ConfigError::InvalidCutoff(cutoff_hz));
    }
    let nyquist_hz = sample_rate / 2.0;
    if cutoff_hz >= nyquist_hz {
        return Err(ConfigError::CutoffAboveNyquist {
            cutoff_hz,
            nyquist_hz,
        });
    }
    Ok(())
}

/// One filter stage: immutable coefficients plus x[n-1], x[n-2], y[n-1], y[n-2].
///
/// Each stage is owned by exactly one cascade and mutated once per sample, in order.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Convenience constructor for a high-pass stage. See [`BiquadCoefficients::high_pass`].
    pub fn high_pass(cutoff_hz: f64, sample_rate: f64) -> Result<Self, ConfigError> {
        BiquadCoefficients::high_pass(cutoff_hz, sample_rate).map(Self::new)
    }

    /// Run one sample through the difference equation and shift the delay line.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let x0 = f64::from(input);
        let y0 = c.b0 * x0 + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;

        y0 as f32
    }

    /// Filter a whole buffer in place, preserving sample order.
    pub fn process_slice(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Zero the delay registers.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Delay registers as `[x1, x2, y1, y2]`.
    pub fn delay_state(&self) -> [f64; 4] {
        [self.x1, self.x2, self.y1, self.y2]
    }
}
