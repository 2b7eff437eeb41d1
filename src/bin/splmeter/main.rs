//! splmeter entrypoint: meters the microphone for a fixed duration and prints a summary.
//!
//! - Capture callback: downmixes and chunks samples into 100 ms frames
//! - Meter worker: sole owner of the `LevelMeter`, one reading per frame
//! - Main thread: redraws the status line and samples the session once per second

mod cli_utils;
mod display;

use anyhow::{Context, Result};
use serde_json::json;
use splmeter::audio::{spawn_meter_worker, LiveMeter, Recorder};
use splmeter::config::AppConfig;
use splmeter::meter::LevelMeter;
use splmeter::session::MeasurementSession;
use splmeter::{init_logging, install_panic_hook, log_debug, log_file_path};
use std::io::{self, IsTerminal, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::cli_utils::list_input_devices;
use crate::display::format_status_line;

/// Sparkline cells per second of graph history.
const GRAPH_CELLS_PER_SECOND: usize = 4;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    if config.list_input_devices {
        list_input_devices()?;
        return Ok(());
    }

    init_logging(&config);
    install_panic_hook();
    log_debug("=== splmeter started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let recorder = Recorder::new(config.input_device.as_deref())?;
    let device_name = recorder.device_name();
    let sample_rate = match config.sample_rate {
        Some(rate) => rate,
        None => recorder.default_sample_rate()?,
    };

    // Build the cascade before opening the stream so bad settings fail without audio.
    let mut meter = LevelMeter::new(config.meter_config(f64::from(sample_rate)));
    meter
        .start(f64::from(sample_rate))
        .with_context(|| format!("cannot meter '{device_name}' at {sample_rate} Hz"))?;

    let (stream, frames) = recorder.start_stream(Some(sample_rate), config.frame_channel_capacity)?;
    let job = spawn_meter_worker(meter, frames, LiveMeter::new(), config.graph_seconds)?;
    let live = job.live().clone();

    if !config.json {
        eprintln!(
            "Metering '{device_name}' at {sample_rate} Hz, {}, {} s",
            config.weighting.description(),
            config.seconds
        );
    }

    let mut session = MeasurementSession::new(config.weighting, config.calibration_offset_db);
    let redraw = io::stderr().is_terminal() && !config.json;
    let graph_width = config.graph_seconds * GRAPH_CELLS_PER_SECOND;
    let refresh = Duration::from_millis(config.refresh_ms);
    let started = Instant::now();
    let deadline = started + Duration::from_secs(config.seconds);
    let mut next_sample = started + Duration::from_secs(1);

    while Instant::now() < deadline {
        thread::sleep(refresh.min(deadline.saturating_duration_since(Instant::now())));
        let now = Instant::now();
        if now >= next_sample {
            let snapshot = live.snapshot();
            if snapshot.statistics.has_data() {
                session.add_reading(snapshot.current_db);
            }
            next_sample += Duration::from_secs(1);
        }
        if redraw {
            let view = live.view();
            let line = format_status_line(&view.snapshot, &view.graph, graph_width);
            let mut err = io::stderr().lock();
            let _ = write!(err, "\r{line}");
            let _ = err.flush();
        }
    }
    if redraw {
        eprintln!();
    }

    let dropped_frames = stream.stop();
    let meter = job.join()?;
    session.finish();
    let summary = session.summary();
    log_debug(&format!(
        "session finished: readings={} dropped_frames={dropped_frames}",
        summary.readings
    ));

    if config.json {
        let report = json!({
            "device": device_name,
            "sample_rate": sample_rate,
            "session": summary,
            "meter": meter.snapshot(),
            "leq_db": meter.calculate_leq(),
            "dropped_frames": dropped_frames,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{summary}");
        println!(
            "Peak: {:.1} {}  (meter Leq over last {} readings: {:.1})",
            meter.peak_level(),
            config.weighting.label(),
            meter.history().len(),
            meter.calculate_leq()
        );
        println!("Dropped frames: {dropped_frames}");
    }
    Ok(())
}
