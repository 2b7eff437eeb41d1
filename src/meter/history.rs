//! Bounded chronological history of decibel readings with running statistics.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::fmt;

/// Readings appended per second of audio (one per 100 ms frame).
pub const READINGS_PER_SECOND: usize = 10;

/// Seconds of readings retained before the oldest are dropped.
pub const MAX_BUFFER_SECONDS: usize = 30;

/// Min/avg/max over the readings currently held.
///
/// An empty set keeps the raw sentinels (min = +inf, avg = 0, max = 0), but every
/// accessor reports `None` so callers render "no data" rather than a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    min: f64,
    avg: f64,
    max: f64,
    count: usize,
}

impl Statistics {
    pub const EMPTY: Statistics = Statistics {
        min: f64::INFINITY,
        avg: 0.0,
        max: 0.0,
        count: 0,
    };

    /// Full scan: min and max by comparison, avg as the arithmetic mean of dB values.
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut stats = Self::EMPTY;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        for value in readings {
            stats.min = stats.min.min(value);
            max = max.max(value);
            sum += value;
            stats.count += 1;
        }
        if stats.count > 0 {
            stats.max = max;
            stats.avg = sum / stats.count as f64;
        }
        stats
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        self.has_data().then_some(self.min)
    }

    pub fn avg(&self) -> Option<f64> {
        self.has_data().then_some(self.avg)
    }

    pub fn max(&self) -> Option<f64> {
        self.has_data().then_some(self.max)
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_data() {
            return f.write_str("no data");
        }
        write!(
            f,
            "min {:.1} / avg {:.1} / max {:.1}",
            self.min, self.avg, self.max
        )
    }
}

// Serialized as nullable fields so JSON consumers never see the +inf sentinel.
impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Statistics", 4)?;
        state.serialize_field("min", &self.min())?;
        state.serialize_field("avg", &self.avg())?;
        state.serialize_field("max", &self.max())?;
        state.serialize_field("count", &self.count)?;
        state.end()
    }
}

/// Fixed-capacity FIFO of readings; the oldest entry is evicted when full.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    readings: VecDeque<f64>,
    capacity: usize,
    readings_per_second: usize,
}

impl ReadingHistory {
    pub fn new(readings_per_second: usize, max_seconds: usize) -> Self {
        let readings_per_second = readings_per_second.max(1);
        let capacity = readings_per_second.saturating_mul(max_seconds).max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
            readings_per_second,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn readings_per_second(&self) -> usize {
        self.readings_per_second
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn append(&mut self, value: f64) {
        self.readings.push_back(value);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    /// Copy of the most recent `seconds` worth of readings, oldest first.
    pub fn window(&self, seconds: usize) -> Vec<f64> {
        let count = seconds
            .saturating_mul(self.readings_per_second)
            .min(self.readings.len());
        let start = self.readings.len() - count;
        self.readings.range(start..).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_readings(self.iter())
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new(READINGS_PER_SECOND, MAX_BUFFER_SECONDS)
    }
}
