use super::dispatch::{append_downmixed_samples, FrameDispatcher};
use super::{
    frame_samples_for_rate, offline_measure_from_pcm, spawn_meter_worker, LiveMeter,
};
use crate::dsp::WeightingMode;
use crate::error::ConfigError;
use crate::meter::{LevelMeter, LevelMeterConfig, MeterState};
use crossbeam_channel::bounded;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SAMPLE_RATE: u32 = 48_000;

fn tone(freq_hz: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
    let count = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..count)
        .map(|n| amplitude * (2.0 * PI * freq_hz * n as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn z_config() -> LevelMeterConfig {
    LevelMeterConfig {
        weighting: WeightingMode::Z,
        calibration_offset_db: 0.0,
        sample_rate: f64::from(SAMPLE_RATE),
    }
}

#[test]
fn downmixes_multi_channel_audio() {
    let mut buf = Vec::new();
    let samples = [1.0f32, -1.0, 0.5, 0.5];
    append_downmixed_samples(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf, vec![0.0, 0.5]);
}

#[test]
fn preserves_single_channel_audio() {
    let mut buf = Vec::new();
    let samples = [0.1f32, 0.2, 0.3];
    append_downmixed_samples(&mut buf, &samples, 1, |sample| sample);
    assert_eq!(buf, samples);
}

#[test]
fn downmix_averages_trailing_partial_frame() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[0.2f32, 0.4, 0.6, 0.5], 3, |sample| sample);
    assert_eq!(buf.len(), 2);
    assert!((buf[0] - 0.4).abs() < 1e-6);
    assert!((buf[1] - 0.5).abs() < 1e-6);
}

#[test]
fn downmix_converts_integer_samples() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[i16::MIN, 0i16], 1, |sample| {
        sample as f32 / 32_768.0
    });
    assert_eq!(buf, vec![-1.0, 0.0]);
}

#[test]
fn frame_size_matches_reading_cadence() {
    assert_eq!(frame_samples_for_rate(48_000), 4_800);
    assert_eq!(frame_samples_for_rate(44_100), 4_410);
    assert_eq!(frame_samples_for_rate(5), 1);
}

#[test]
fn dispatcher_emits_fixed_frames_across_callbacks() {
    let (sender, receiver) = bounded(8);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(4, sender, dropped.clone());

    dispatcher.push(&[1.0f32, 2.0, 3.0], 1, |s| s);
    assert!(receiver.try_recv().is_err());
    assert_eq!(dispatcher.pending_len(), 3);

    dispatcher.push(&[4.0f32, 5.0, 6.0, 7.0, 8.0, 9.0], 1, |s| s);
    assert_eq!(receiver.try_recv().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(receiver.try_recv().unwrap(), vec![5.0, 6.0, 7.0, 8.0]);
    assert_eq!(dispatcher.pending_len(), 1);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[test]
fn dispatcher_counts_frames_dropped_on_full_channel() {
    let (sender, receiver) = bounded(1);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(2, sender, dropped.clone());

    dispatcher.push(&[0.1f32; 6], 1, |s| s);
    assert_eq!(dropped.load(Ordering::Relaxed), 2);
    assert_eq!(receiver.len(), 1);
}

#[test]
fn dispatcher_discards_pending_after_disconnect() {
    let (sender, receiver) = bounded(4);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(2, sender, dropped.clone());
    drop(receiver);

    dispatcher.push(&[0.1f32; 5], 1, |s| s);
    assert_eq!(dispatcher.pending_len(), 0);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[test]
fn live_meter_defaults_to_idle_floor() {
    let live = LiveMeter::new();
    assert_eq!(live.level_db(), 0.0);
    assert_eq!(live.snapshot().state, MeterState::Idle);
    assert!(live.view().graph.is_empty());
}

#[test]
fn live_meter_copies_meter_state() {
    let mut meter = LevelMeter::new(z_config());
    meter.start(f64::from(SAMPLE_RATE)).unwrap();
    let frame = tone(1_000.0, 0.1, 0.1);
    for _ in 0..30 {
        meter.process_buffer(&frame);
    }

    let live = LiveMeter::new();
    live.publish(&meter, 2);
    let view = live.view();
    assert_eq!(live.level_db(), meter.current_level());
    assert_eq!(view.snapshot, meter.snapshot());
    assert_eq!(view.graph.len(), 20);
    assert_eq!(view.graph.last().copied(), Some(view.snapshot.current_db));

    meter.process_buffer(&frame);
    assert_eq!(live.view(), view, "published copy is detached");
}

#[test]
fn live_view_pairs_snapshot_with_its_graph() {
    let live = LiveMeter::new();
    let reader = {
        let live = live.clone();
        std::thread::spawn(move || {
            for _ in 0..2_000 {
                let view = live.view();
                if let Some(&last) = view.graph.last() {
                    assert_eq!(last, view.snapshot.current_db);
                    assert_eq!(view.graph.len(), view.snapshot.statistics.count());
                }
            }
        })
    };

    let mut meter = LevelMeter::new(z_config());
    meter.start(f64::from(SAMPLE_RATE)).unwrap();
    for step in 1..=40 {
        meter.process_buffer(&[0.001 * step as f32; 480]);
        live.publish(&meter, 30);
    }
    reader.join().unwrap();
}

#[test]
fn worker_meters_every_frame_and_returns_meter() {
    let mut meter = LevelMeter::new(z_config());
    meter.start(f64::from(SAMPLE_RATE)).unwrap();
    let (sender, receiver) = bounded(16);
    let job = spawn_meter_worker(meter, receiver, LiveMeter::new(), 5).unwrap();
    let live = job.live().clone();

    let frame = tone(1_000.0, 0.01, 0.1);
    for _ in 0..12 {
        sender.send(frame.clone()).unwrap();
    }
    drop(sender);

    let meter = job.join().unwrap();
    assert!(!meter.is_running());
    assert_eq!(meter.all_readings().len(), 12);
    assert_eq!(live.snapshot().state, MeterState::Idle);
    assert_eq!(live.snapshot().statistics.count(), 12);
    assert!((live.level_db() - meter.current_level()).abs() < f64::EPSILON);
}

#[test]
fn offline_measurement_reports_per_frame_levels() {
    let samples = tone(1_000.0, 0.01, 3.0);
    let result = offline_measure_from_pcm(&samples, 1, SAMPLE_RATE, &z_config()).unwrap();

    assert_eq!(result.levels.len(), 30);
    for level in &result.levels {
        assert!((level - 36.99).abs() < 0.05, "level={level}");
    }
    assert!((result.leq - 36.99).abs() < 0.05);
    assert_eq!(result.snapshot.state, MeterState::Idle);
    assert_eq!(result.snapshot.statistics.count(), 30);

    assert_eq!(result.session.readings().len(), 3);
    assert_eq!(result.session.formatted_duration(), "00:03");
    assert!(result.session.is_finished());
}

#[test]
fn offline_measurement_downmixes_interleaved_input() {
    let mono = tone(1_000.0, 0.01, 0.5);
    let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();

    let from_mono = offline_measure_from_pcm(&mono, 1, SAMPLE_RATE, &z_config()).unwrap();
    let from_stereo = offline_measure_from_pcm(&stereo, 2, SAMPLE_RATE, &z_config()).unwrap();
    assert_eq!(from_mono.levels, from_stereo.levels);
}

#[test]
fn offline_measurement_fails_fast_on_bad_config() {
    let config = LevelMeterConfig {
        weighting: WeightingMode::C,
        ..z_config()
    };
    let err = offline_measure_from_pcm(&[0.0; 1_600], 1, 16_000, &config).unwrap_err();
    assert!(matches!(err, ConfigError::CutoffAboveNyquist { .. }));
}

#[test]
fn offline_measurement_of_empty_input_has_no_readings() {
    let result = offline_measure_from_pcm(&[], 1, SAMPLE_RATE, &z_config()).unwrap();
    assert!(result.levels.is_empty());
    assert_eq!(result.leq, 0.0);
    assert!(!result.snapshot.statistics.has_data());
}
