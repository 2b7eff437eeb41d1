use splmeter::audio::offline_measure_from_pcm;
use splmeter::dsp::WeightingMode;
use splmeter::meter::{compute_leq, LevelMeterConfig, MAX_DECIBEL_LEVEL};
use splmeter::safety::SafetyLevel;
use std::f64::consts::PI;

const SAMPLE_RATE: u32 = 48_000;

fn sine(freq_hz: f64, amplitude: f64, seconds: f64) -> Vec<f32> {
    let count = (f64::from(SAMPLE_RATE) * seconds) as usize;
    (0..count)
        .map(|n| {
            let t = n as f64 / f64::from(SAMPLE_RATE);
            (amplitude * (2.0 * PI * freq_hz * t).sin()) as f32
        })
        .collect()
}

fn config(weighting: WeightingMode, calibration_offset_db: f64) -> LevelMeterConfig {
    LevelMeterConfig {
        weighting,
        calibration_offset_db,
        sample_rate: f64::from(SAMPLE_RATE),
    }
}

/// Mean level over the last second, after filter transients settle.
fn settled_level(samples: &[f32], config: &LevelMeterConfig) -> f64 {
    let result = offline_measure_from_pcm(samples, 1, SAMPLE_RATE, config).expect("valid config");
    let tail = &result.levels[result.levels.len() - 10..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

#[test]
fn a_weighting_rolls_off_low_frequencies() {
    let low = settled_level(&sine(10.0, 0.1, 3.0), &config(WeightingMode::A, 0.0));
    let mid = settled_level(&sine(1_000.0, 0.1, 3.0), &config(WeightingMode::A, 0.0));
    let flat = settled_level(&sine(10.0, 0.1, 3.0), &config(WeightingMode::Z, 0.0));
    assert!(low < mid - 10.0, "low={low} mid={mid}");
    assert!((flat - mid).abs() < 0.5, "flat={flat} mid={mid}");
}

#[test]
fn calibration_shifts_every_reading() {
    let samples = sine(1_000.0, 0.02, 1.0);
    let base = offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &config(WeightingMode::Z, 0.0))
        .unwrap();
    let shifted =
        offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &config(WeightingMode::Z, -7.5))
            .unwrap();
    for (a, b) in base.levels.iter().zip(&shifted.levels) {
        assert!((a - b - 7.5).abs() < 1e-9);
    }
}

#[test]
fn leq_weights_loud_segments_by_energy() {
    let mut samples = sine(1_000.0, 0.001, 2.0);
    samples.extend(sine(1_000.0, 0.1, 2.0));
    let result =
        offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &config(WeightingMode::Z, 0.0)).unwrap();

    let avg = result.snapshot.statistics.avg().unwrap();
    assert!(result.leq > avg + 10.0, "leq={} avg={avg}", result.leq);
    assert!((result.leq - compute_leq(result.levels.iter().copied())).abs() < 1e-12);
    // The 57 dB half carries nearly all the energy, so Leq sits 3 dB below it.
    assert!((result.leq - 54.0).abs() < 0.5, "leq={}", result.leq);
}

#[test]
fn clipped_input_reports_display_ceiling() {
    let samples = vec![1.0e4f32; 4_800];
    let config = config(WeightingMode::Z, 10.0);
    let result = offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &config).unwrap();
    assert_eq!(result.levels, vec![MAX_DECIBEL_LEVEL]);
    assert_eq!(result.session.summary().safety, Some(SafetyLevel::Extreme));
}

#[test]
fn session_summary_serializes_run() {
    let samples = sine(1_000.0, 0.05, 2.5);
    let result =
        offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &config(WeightingMode::C, 0.0)).unwrap();
    let json = serde_json::to_value(result.session.summary()).unwrap();
    assert_eq!(json["readings"], 3);
    assert_eq!(json["duration"], "00:02");
    assert_eq!(json["weighting"], "C");
    assert!(json["leq_db"].as_f64().unwrap() > 0.0);
}
