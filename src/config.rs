// src/config.rs
// Capture parameters. Everything here is fixed at compile time; `Default` is the run.
use std::path::PathBuf;
use std::time::Duration;

use crate::drivers::acquisition::sample_count;
use crate::drivers::CaptureError;
use crate::types::{BlockMethod, ConversionTime, MainsRejection, Step, VoltageRange};

const CHANNEL: i16 = 1;
const MAX_CHANNEL: i16 = 16;
const SAMPLE_INTERVAL_MS: u32 = 110;
const CAPTURE_DURATION_MS: u32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelConfig {
    pub channel: i16,
    pub enabled: bool,
    pub range: VoltageRange,
    pub single_ended: bool,
}
impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel: CHANNEL,
            enabled: true,
            range: VoltageRange::Mv2500,
            single_ended: true,
        }
    }
}
impl ChannelConfig {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !(1..=MAX_CHANNEL).contains(&self.channel) {
            return Err(CaptureError::Configuration {
                step: Step::SetAnalogInChannel,
                reason: format!("channel {} outside 1..={MAX_CHANNEL}", self.channel),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    pub interval_ms: u32,
    pub conversion: ConversionTime,
}
impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: SAMPLE_INTERVAL_MS,
            conversion: ConversionTime::Ms60,
        }
    }
}
impl SamplingConfig {
    /// The logger cannot sample faster than it converts.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let conversion_ms = self.conversion.millis();
        if self.interval_ms <= conversion_ms {
            return Err(CaptureError::Configuration {
                step: Step::SetInterval,
                reason: format!(
                    "interval {} ms must exceed conversion time {conversion_ms} ms",
                    self.interval_ms
                ),
            });
        }
        Ok(())
    }
}

/// Which wall-clock instant goes into the CSV `Timestamp` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RowTimestamp {
    /// Clock read as each row is written (not the acquisition instant).
    #[default]
    WrittenAt,
    /// Capture start plus the sample's elapsed time.
    CaptureTime,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub timeout: Duration,
}
impl PollPolicy {
    /// Twice the nominal capture length plus a fixed grace period.
    pub fn for_capture(samples: usize, interval_ms: u32) -> Self {
        let nominal = Duration::from_millis(interval_ms as u64 * samples as u64);
        Self {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(50),
            timeout: nominal * 2 + Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub mains: MainsRejection,
    pub channel: ChannelConfig,
    pub sampling: SamplingConfig,
    pub duration_ms: u32,
    pub method: BlockMethod,
    pub row_timestamps: RowTimestamp,
    pub output_dir: PathBuf,
}
impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mains: MainsRejection::Hz50,
            channel: ChannelConfig::default(),
            sampling: SamplingConfig::default(),
            duration_ms: CAPTURE_DURATION_MS,
            method: BlockMethod::Block,
            row_timestamps: RowTimestamp::WrittenAt,
            output_dir: PathBuf::from("."),
        }
    }
}
impl CaptureConfig {
    pub fn validate(&self) -> Result<(), CaptureError> {
        self.channel.validate()?;
        self.sampling.validate()
    }
    pub fn sample_count(&self) -> usize {
        sample_count(self.duration_ms, self.sampling.interval_ms)
    }
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::for_capture(self.sample_count(), self.sampling.interval_ms)
    }
}
