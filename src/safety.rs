//! Hearing-safety classification of decibel readings.
//!
//! Bands follow the NIOSH recommended exposure limit: 85 dB for 8 hours with a
//! 3 dB exchange rate (every +3 dB halves the safe duration).

use crate::meter::{MAX_DECIBEL_LEVEL, MIN_DECIBEL_LEVEL};
use serde::Serialize;
use std::fmt;

pub const CAUTION_LEVEL_DB: f64 = 80.0;
pub const WARNING_LEVEL_DB: f64 = 85.0;
pub const DANGER_LEVEL_DB: f64 = 90.0;
pub const EXTREME_LEVEL_DB: f64 = 100.0;

const NIOSH_REFERENCE_HOURS: f64 = 8.0;
const NIOSH_EXCHANGE_RATE_DB: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    Safe,
    Caution,
    Warning,
    Danger,
    Extreme,
}

impl SafetyLevel {
    pub fn for_level(db: f64) -> Self {
        if db < CAUTION_LEVEL_DB {
            SafetyLevel::Safe
        } else if db < WARNING_LEVEL_DB {
            SafetyLevel::Caution
        } else if db < DANGER_LEVEL_DB {
            SafetyLevel::Warning
        } else if db < EXTREME_LEVEL_DB {
            SafetyLevel::Danger
        } else {
            SafetyLevel::Extreme
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SafetyLevel::Safe => "Safe",
            SafetyLevel::Caution => "Caution",
            SafetyLevel::Warning => "Limited exposure",
            SafetyLevel::Danger => "Hearing damage risk",
            SafetyLevel::Extreme => "Immediate risk",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maximum recommended daily exposure at `db`, or `None` below 85 dB.
pub fn safe_exposure_hours(db: f64) -> Option<f64> {
    if db < WARNING_LEVEL_DB {
        return None;
    }
    Some(NIOSH_REFERENCE_HOURS / 2f64.powf((db - WARNING_LEVEL_DB) / NIOSH_EXCHANGE_RATE_DB))
}

/// Render an exposure duration with the coarsest whole unit that is non-zero.
pub fn format_exposure(hours: f64) -> String {
    if hours >= 1.0 {
        let h = hours as u64;
        return format!("{h} hour{}", if h > 1 { "s" } else { "" });
    }
    let minutes = (hours * 60.0) as u64;
    if minutes >= 1 {
        return format!("{minutes} min");
    }
    format!("{} sec", (hours * 3_600.0) as u64)
}

/// Position of `db` on the displayable scale, in `[0, 1]`.
pub fn normalized_level(db: f64) -> f64 {
    let clamped = db.clamp(MIN_DECIBEL_LEVEL, MAX_DECIBEL_LEVEL);
    (clamped - MIN_DECIBEL_LEVEL) / (MAX_DECIBEL_LEVEL - MIN_DECIBEL_LEVEL)
}

/// A named loudness band `[min_db, max_db)` with everyday examples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundCategory {
    pub min_db: f64,
    pub max_db: f64,
    pub name: &'static str,
    pub examples: &'static [&'static str],
    pub safety: SafetyLevel,
    pub max_exposure_secs: Option<u32>,
}

const HOUR: u32 = 3_600;

const fn band(
    min_db: f64,
    max_db: f64,
    name: &'static str,
    examples: &'static [&'static str],
    safety: SafetyLevel,
    max_exposure_secs: Option<u32>,
) -> SoundCategory {
    SoundCategory {
        min_db,
        max_db,
        name,
        examples,
        safety,
        max_exposure_secs,
    }
}

pub const SOUND_CATEGORIES: [SoundCategory; 14] = [
    band(
        0.0,
        30.0,
        "Almost silent",
        &["Breathing", "Rustling leaves"],
        SafetyLevel::Safe,
        None,
    ),
    band(
        30.0,
        40.0,
        "Whisper quiet",
        &["Whisper", "Quiet library"],
        SafetyLevel::Safe,
        None,
    ),
    band(
        40.0,
        50.0,
        "Quiet room",
        &["Quiet home", "Light rain"],
        SafetyLevel::Safe,
        None,
    ),
    band(
        50.0,
        60.0,
        "Quiet office",
        &["Quiet office", "Refrigerator hum"],
        SafetyLevel::Safe,
        None,
    ),
    band(
        60.0,
        70.0,
        "Normal conversation",
        &["Normal conversation", "Background music"],
        SafetyLevel::Safe,
        None,
    ),
    band(
        70.0,
        80.0,
        "Busy traffic",
        &["Busy traffic", "Vacuum cleaner"],
        SafetyLevel::Caution,
        None,
    ),
    band(
        80.0,
        85.0,
        "Loud restaurant",
        &["Loud restaurant", "Factory"],
        SafetyLevel::Warning,
        Some(8 * HOUR),
    ),
    band(
        85.0,
        90.0,
        "Heavy traffic",
        &["Heavy traffic", "Lawn mower"],
        SafetyLevel::Warning,
        Some(8 * HOUR),
    ),
    band(
        90.0,
        95.0,
        "Motorcycle",
        &["Motorcycle", "Power drill"],
        SafetyLevel::Danger,
        Some(4 * HOUR),
    ),
    band(
        95.0,
        100.0,
        "Power tools",
        &["Power tools", "Subway train"],
        SafetyLevel::Danger,
        Some(2 * HOUR),
    ),
    band(
        100.0,
        105.0,
        "Nightclub",
        &["Nightclub", "Chainsaw"],
        SafetyLevel::Danger,
        Some(HOUR),
    ),
    band(
        105.0,
        110.0,
        "Rock concert",
        &["Rock concert", "Jackhammer"],
        SafetyLevel::Extreme,
        Some(30 * 60),
    ),
    band(
        110.0,
        120.0,
        "Thunder / Siren",
        &["Thunder", "Emergency siren"],
        SafetyLevel::Extreme,
        Some(15 * 60),
    ),
    band(
        120.0,
        150.0,
        "Jet engine",
        &["Jet engine at takeoff", "Gunshot"],
        SafetyLevel::Extreme,
        Some(60),
    ),
];

impl SoundCategory {
    pub fn contains(&self, db: f64) -> bool {
        db >= self.min_db && db < self.max_db
    }

    /// Band holding `db`; anything outside the table maps to the loudest band.
    pub fn for_level(db: f64) -> &'static SoundCategory {
        let last = &SOUND_CATEGORIES[SOUND_CATEGORIES.len() - 1];
        SOUND_CATEGORIES
            .iter()
            .find(|category| category.contains(db))
            .unwrap_or(last)
    }

    /// One-line advice for the band, naming its exposure limit when it has one.
    pub fn safety_message(&self) -> String {
        let limit = self
            .max_exposure_secs
            .map(|secs| format_exposure(f64::from(secs) / f64::from(HOUR)));
        match (self.safety, limit) {
            (SafetyLevel::Safe, _) => "Safe for extended exposure".to_string(),
            (SafetyLevel::Caution, _) => "Caution advised for long exposure".to_string(),
            (SafetyLevel::Warning, Some(limit)) => format!("Safe for {limit}"),
            (SafetyLevel::Warning, None) => SafetyLevel::Warning.label().to_string(),
            (SafetyLevel::Danger, Some(limit)) => format!("Max exposure {limit}"),
            (SafetyLevel::Danger, None) => SafetyLevel::Danger.label().to_string(),
            (SafetyLevel::Extreme, _) => "Immediate risk of hearing damage".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_bands_use_half_open_thresholds() {
        assert_eq!(SafetyLevel::for_level(0.0), SafetyLevel::Safe);
        assert_eq!(SafetyLevel::for_level(79.99), SafetyLevel::Safe);
        assert_eq!(SafetyLevel::for_level(80.0), SafetyLevel::Caution);
        assert_eq!(SafetyLevel::for_level(85.0), SafetyLevel::Warning);
        assert_eq!(SafetyLevel::for_level(90.0), SafetyLevel::Danger);
        assert_eq!(SafetyLevel::for_level(99.9), SafetyLevel::Danger);
        assert_eq!(SafetyLevel::for_level(100.0), SafetyLevel::Extreme);
        assert_eq!(SafetyLevel::Warning.to_string(), "Limited exposure");
    }

    #[test]
    fn exposure_halves_every_three_db() {
        assert_eq!(safe_exposure_hours(84.9), None);
        assert_eq!(safe_exposure_hours(85.0), Some(8.0));
        let at_88 = safe_exposure_hours(88.0).unwrap();
        assert!((at_88 - 4.0).abs() < 1e-12);
        let at_100 = safe_exposure_hours(100.0).unwrap();
        assert!((at_100 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn exposure_formatting_picks_unit() {
        assert_eq!(format_exposure(8.0), "8 hours");
        assert_eq!(format_exposure(1.5), "1 hour");
        assert_eq!(format_exposure(0.25), "15 min");
        assert_eq!(format_exposure(0.01), "36 sec");
    }

    #[test]
    fn normalized_level_clamps_to_unit_range() {
        assert_eq!(normalized_level(-10.0), 0.0);
        assert_eq!(normalized_level(70.0), 0.5);
        assert_eq!(normalized_level(200.0), 1.0);
    }

    #[test]
    fn category_table_is_contiguous() {
        assert_eq!(SOUND_CATEGORIES[0].min_db, 0.0);
        for pair in SOUND_CATEGORIES.windows(2) {
            assert_eq!(pair[0].max_db, pair[1].min_db, "{}", pair[0].name);
        }
        assert_eq!(SOUND_CATEGORIES[13].max_db, 150.0);
    }

    #[test]
    fn category_lookup() {
        assert_eq!(SoundCategory::for_level(65.0).name, "Normal conversation");
        assert_eq!(SoundCategory::for_level(85.0).name, "Heavy traffic");
        assert_eq!(SoundCategory::for_level(200.0).name, "Jet engine");
        assert_eq!(SoundCategory::for_level(-1.0).name, "Jet engine");
    }

    #[test]
    fn safety_messages_name_limits() {
        assert_eq!(
            SoundCategory::for_level(92.0).safety_message(),
            "Max exposure 4 hours"
        );
        assert_eq!(SoundCategory::for_level(82.0).safety_message(), "Safe for 8 hours");
        assert_eq!(
            SoundCategory::for_level(40.0).safety_message(),
            "Safe for extended exposure"
        );
    }
}
