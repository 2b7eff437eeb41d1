use super::defaults::{
    MAX_CALIBRATION_OFFSET_DB, MAX_DEVICE_NAME_BYTES, MAX_FRAME_CHANNEL_CAPACITY,
    MAX_MEASURE_SECONDS, MAX_REFRESH_MS, MAX_SAMPLE_RATE, MIN_CALIBRATION_OFFSET_DB,
    MIN_FRAME_CHANNEL_CAPACITY, MIN_REFRESH_MS, MIN_SAMPLE_RATE,
};
use super::AppConfig;
use crate::meter::{LevelMeterConfig, MAX_BUFFER_SECONDS};
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before any audio device is touched.
    pub fn validate(&mut self) -> Result<()> {
        if !self.calibration_offset_db.is_finite()
            || !(MIN_CALIBRATION_OFFSET_DB..=MAX_CALIBRATION_OFFSET_DB)
                .contains(&self.calibration_offset_db)
        {
            bail!(
                "--calibration-offset must be between {MIN_CALIBRATION_OFFSET_DB} and {MAX_CALIBRATION_OFFSET_DB} dB, got {}",
                self.calibration_offset_db
            );
        }

        if let Some(rate) = self.sample_rate {
            if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&rate) {
                bail!(
                    "--sample-rate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE} Hz, got {rate}"
                );
            }
            // Catch C-weighting at low rates here instead of after the device opens.
            if let Err(err) = self.meter_config(f64::from(rate)).validate() {
                bail!("--weighting {:?} cannot run at --sample-rate {rate}: {err}", self.weighting);
            }
        }

        if !(1..=MAX_MEASURE_SECONDS).contains(&self.seconds) {
            bail!(
                "--seconds must be between 1 and {MAX_MEASURE_SECONDS}, got {}",
                self.seconds
            );
        }

        if !(MIN_REFRESH_MS..=MAX_REFRESH_MS).contains(&self.refresh_ms) {
            bail!(
                "--refresh-ms must be between {MIN_REFRESH_MS} and {MAX_REFRESH_MS}, got {}",
                self.refresh_ms
            );
        }

        if !(1..=MAX_BUFFER_SECONDS).contains(&self.graph_seconds) {
            bail!(
                "--graph-seconds must be between 1 and {MAX_BUFFER_SECONDS}, got {}",
                self.graph_seconds
            );
        }

        if !(MIN_FRAME_CHANNEL_CAPACITY..=MAX_FRAME_CHANNEL_CAPACITY)
            .contains(&self.frame_channel_capacity)
        {
            bail!(
                "--frame-channel-capacity must be between {MIN_FRAME_CHANNEL_CAPACITY} and {MAX_FRAME_CHANNEL_CAPACITY}, got {}",
                self.frame_channel_capacity
            );
        }

        if let Some(device) = &self.input_device {
            let trimmed = device.trim();
            if trimmed.is_empty()
                || device.len() > MAX_DEVICE_NAME_BYTES
                || device.chars().any(char::is_control)
            {
                bail!(
                    "--input-device must be a non-empty name of at most {MAX_DEVICE_NAME_BYTES} bytes with no control characters"
                );
            }
        }

        Ok(())
    }

    /// Snapshot the meter settings for a stream running at `sample_rate`.
    pub fn meter_config(&self, sample_rate: f64) -> LevelMeterConfig {
        LevelMeterConfig {
            weighting: self.weighting,
            calibration_offset_db: self.calibration_offset_db,
            sample_rate,
        }
    }
}
