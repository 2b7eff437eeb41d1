//! The single consumer thread that owns the meter while capture runs.

use super::LiveMeter;
use crate::log_debug;
use crate::meter::LevelMeter;
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use std::thread;

/// Handle to a running meter worker.
pub struct MeterJob {
    handle: thread::JoinHandle<LevelMeter>,
    live: LiveMeter,
}

impl MeterJob {
    /// Display handle fed by the worker after every reading.
    pub fn live(&self) -> &LiveMeter {
        &self.live
    }

    /// Wait for the frame channel to disconnect and take the meter back.
    pub fn join(self) -> Result<LevelMeter> {
        self.handle
            .join()
            .map_err(|_| anyhow!("meter worker panicked"))
    }
}

/// Move `meter` onto a worker thread that measures every frame from `frames`.
///
/// The worker is the meter's only writer. It exits, stopping the meter, once every
/// sender is gone.
pub fn spawn_meter_worker(
    mut meter: LevelMeter,
    frames: Receiver<Vec<f32>>,
    live: LiveMeter,
    graph_seconds: usize,
) -> Result<MeterJob> {
    let worker_live = live.clone();
    let handle = thread::Builder::new()
        .name("splmeter-meter".to_string())
        .spawn(move || {
            let mut processed = 0usize;
            for frame in frames.iter() {
                if meter.process_buffer(&frame).is_some() {
                    processed += 1;
                    worker_live.publish(&meter, graph_seconds);
                }
            }
            meter.stop();
            worker_live.publish(&meter, graph_seconds);
            log_debug(&format!("meter worker exiting after {processed} frames"));
            meter
        })
        .context("failed to spawn meter worker")?;
    Ok(MeterJob { handle, live })
}
