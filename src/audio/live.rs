use crate::lock_or_recover;
use crate::meter::{LevelMeter, MeterSnapshot};
use std::sync::{Arc, Mutex};

/// One published reading: the meter state plus the graph window it was taken with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveView {
    pub snapshot: MeterSnapshot,
    pub graph: Vec<f64>,
}

/// Copy-out view of a meter owned by another thread.
///
/// The worker publishes after each reading and display threads copy the latest
/// [`LiveView`] out. Snapshot and graph share one lock, so a reader never pairs
/// values from different readings.
#[derive(Clone, Debug, Default)]
pub struct LiveMeter {
    view: Arc<Mutex<LiveView>>,
}

impl LiveMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the meter's display state, keeping `graph_seconds` of readings for the graph.
    pub fn publish(&self, meter: &LevelMeter, graph_seconds: usize) {
        let next = LiveView {
            snapshot: meter.snapshot(),
            graph: meter.recent_readings(graph_seconds),
        };
        *lock_or_recover(&self.view, "live meter view") = next;
    }

    pub fn view(&self) -> LiveView {
        lock_or_recover(&self.view, "live meter view").clone()
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        lock_or_recover(&self.view, "live meter view").snapshot
    }

    pub fn level_db(&self) -> f64 {
        self.snapshot().current_db
    }
}
