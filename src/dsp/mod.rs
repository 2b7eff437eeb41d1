//! Signal-processing primitives for the level meter.
//!
//! A biquad section is the atomic unit; weighting cascades chain sections in a
//! fixed order for a given sample rate.

mod biquad;
mod weighting;

pub use biquad::{Biquad, BiquadCoefficients, BUTTERWORTH_Q};
pub use weighting::{WeightingFilterBank, WeightingMode, HIGH_POLE_HZ, LOW_POLE_HZ};
