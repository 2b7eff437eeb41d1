//! In-memory record of one measurement run, summarized when the run ends.

use crate::dsp::WeightingMode;
use crate::meter::compute_leq;
use crate::safety::{format_exposure, safe_exposure_hours, SafetyLevel, SoundCategory};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate at which the host copies the current level into a session.
pub const SESSION_READINGS_PER_SECOND: usize = 1;

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[derive(Debug, Clone)]
pub struct MeasurementSession {
    started_at: f64,
    ended_at: Option<f64>,
    weighting: WeightingMode,
    calibration_offset_db: f64,
    readings: Vec<f64>,
    sum: f64,
    min_level: f64,
    max_level: f64,
    leq: Option<f64>,
}

impl MeasurementSession {
    pub fn new(weighting: WeightingMode, calibration_offset_db: f64) -> Self {
        Self::starting_at(weighting, calibration_offset_db, unix_now())
    }

    /// Session anchored at `started_at` seconds since the Unix epoch.
    pub fn starting_at(
        weighting: WeightingMode,
        calibration_offset_db: f64,
        started_at: f64,
    ) -> Self {
        Self {
            started_at,
            ended_at: None,
            weighting,
            calibration_offset_db,
            readings: Vec::new(),
            sum: 0.0,
            min_level: f64::INFINITY,
            max_level: 0.0,
            leq: None,
        }
    }

    pub fn add_reading(&mut self, db: f64) {
        self.readings.push(db);
        self.sum += db;
        self.min_level = self.min_level.min(db);
        self.max_level = self.max_level.max(db);
    }

    pub fn finish(&mut self) {
        self.finish_at(unix_now());
    }

    pub fn finish_at(&mut self, ended_at: f64) {
        self.ended_at = Some(ended_at);
        self.leq = Some(compute_leq(self.readings.iter().copied()));
    }

    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn readings(&self) -> &[f64] {
        &self.readings
    }

    pub fn weighting(&self) -> WeightingMode {
        self.weighting
    }

    pub fn min_level(&self) -> Option<f64> {
        (!self.readings.is_empty()).then_some(self.min_level)
    }

    pub fn max_level(&self) -> Option<f64> {
        (!self.readings.is_empty()).then_some(self.max_level)
    }

    pub fn avg_level(&self) -> Option<f64> {
        (!self.readings.is_empty()).then(|| self.sum / self.readings.len() as f64)
    }

    /// Leq, set by [`MeasurementSession::finish`].
    pub fn leq(&self) -> Option<f64> {
        self.leq
    }

    /// Elapsed time to the end stamp, or to now while the session is open.
    pub fn duration(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(unix_now);
        Duration::from_secs_f64((end - self.started_at).max(0.0))
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration())
    }

    /// Category of the average level, once any reading exists.
    pub fn category(&self) -> Option<&'static SoundCategory> {
        self.avg_level().map(SoundCategory::for_level)
    }

    pub fn summary(&self) -> SessionSummary {
        let category = self.category();
        SessionSummary {
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration: self.formatted_duration(),
            weighting: self.weighting,
            calibration_offset_db: self.calibration_offset_db,
            readings: self.readings.len(),
            min_db: self.min_level(),
            avg_db: self.avg_level(),
            max_db: self.max_level(),
            leq_db: self.leq,
            category: category.map(|c| c.name),
            safety: category.map(|c| c.safety),
            advice: category.map(SoundCategory::safety_message),
            safe_exposure: self.leq.and_then(safe_exposure_hours).map(format_exposure),
        }
    }
}

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Export view of a session with nullable statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub started_at: f64,
    pub ended_at: Option<f64>,
    pub duration: String,
    pub weighting: WeightingMode,
    pub calibration_offset_db: f64,
    pub readings: usize,
    pub min_db: Option<f64>,
    pub avg_db: Option<f64>,
    pub max_db: Option<f64>,
    pub leq_db: Option<f64>,
    pub category: Option<&'static str>,
    pub safety: Option<SafetyLevel>,
    pub advice: Option<String>,
    /// Daily exposure limit at the session Leq; absent below 85 dB.
    pub safe_exposure: Option<String>,
}

fn fmt_db(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |db| format!("{db:.1}"))
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.weighting.label();
        writeln!(f, "Duration: {} ({} readings)", self.duration, self.readings)?;
        writeln!(
            f,
            "Min/Avg/Max: {} / {} / {} {unit}",
            fmt_db(self.min_db),
            fmt_db(self.avg_db),
            fmt_db(self.max_db)
        )?;
        write!(f, "Leq: {} {unit}", fmt_db(self.leq_db))?;
        if let (Some(category), Some(safety)) = (self.category, self.safety) {
            write!(f, "\nCategory: {category} ({safety})")?;
        }
        if let Some(advice) = &self.advice {
            write!(f, "\nAdvice: {advice}")?;
        }
        if let Some(limit) = &self.safe_exposure {
            write!(f, "\nSafe daily exposure at this Leq: {limit}")?;
        }
        Ok(())
    }
}
