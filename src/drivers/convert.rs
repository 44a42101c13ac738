use chrono::{DateTime, Local};

use crate::config::ChannelConfig;
use crate::drivers::acquisition::SampleBlock;
use crate::drivers::CaptureError;

/// Device-reported ADC codes spanning the channel's full scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub min_adc: i32,
    pub max_adc: i32,
}
impl Calibration {
    pub fn new(channel: i16, min_adc: i32, max_adc: i32) -> Result<Self, CaptureError> {
        if max_adc <= 0 || min_adc >= max_adc {
            return Err(CaptureError::CalibrationRead {
                channel,
                reason: format!("unusable bounds [{min_adc}, {max_adc}]"),
            });
        }
        Ok(Self { min_adc, max_adc })
    }
    /// Linear scale: `max_adc` maps to the range's full scale, 0 maps to 0 mV.
    pub fn to_millivolts(&self, raw: i32, full_scale_mv: f64) -> f64 {
        raw as f64 * full_scale_mv / self.max_adc as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertedSample {
    /// 1-based position in the block.
    pub number: usize,
    pub time_ms: i32,
    pub raw: i32,
    pub millivolts: f64,
    pub overflow: bool,
}
impl ConvertedSample {
    pub fn seconds(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }
}

/// A converted block plus what is needed to describe it.
#[derive(Clone, Debug)]
pub struct Capture {
    pub channel: ChannelConfig,
    pub started_at: DateTime<Local>,
    pub samples: Vec<ConvertedSample>,
}
impl Capture {
    pub fn overflow_count(&self) -> usize {
        self.samples.iter().filter(|s| s.overflow).count()
    }
    /// `[seconds, millivolts]` pairs in sample order.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.seconds(), s.millivolts])
            .collect()
    }
    pub fn millivolt_bounds(&self) -> Option<(f64, f64)> {
        let first = self.samples.first()?.millivolts;
        Some(self.samples.iter().fold((first, first), |(lo, hi), s| {
            (lo.min(s.millivolts), hi.max(s.millivolts))
        }))
    }
}

fn overflowed(flags: i16, channel: i16) -> bool {
    (1..=16).contains(&channel) && (flags as u16) & (1u16 << (channel - 1)) != 0
}

pub fn convert(block: &SampleBlock, calibration: &Calibration, channel: &ChannelConfig) -> Vec<ConvertedSample> {
    let full_scale_mv = channel.range.full_scale_mv();
    block
        .iter()
        .map(|raw| ConvertedSample {
            number: raw.index + 1,
            time_ms: raw.time_ms,
            raw: raw.value,
            millivolts: calibration.to_millivolts(raw.value, full_scale_mv),
            overflow: overflowed(raw.overflow, channel.channel),
        })
        .collect()
}
