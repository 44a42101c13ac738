use std::thread;
use std::time::Instant;

use crate::config::PollPolicy;
use crate::drivers::CaptureError;

/// Samples in a block covering `duration_ms`, counting both ends.
pub fn sample_count(duration_ms: u32, interval_ms: u32) -> usize {
    duration_ms.checked_div(interval_ms).unwrap_or(0) as usize + 1
}

/// Polls `ready` until it reports true, sleeping between polls with a doubling backoff.
/// Returns the number of polls made.
pub fn poll_until<F: FnMut() -> bool>(policy: &PollPolicy, mut ready: F) -> Result<u32, CaptureError> {
    let started = Instant::now();
    let mut backoff = policy.initial_backoff;
    let mut polls = 0u32;
    loop {
        polls += 1;
        if ready() {
            return Ok(polls);
        }
        let waited = started.elapsed();
        if waited >= policy.timeout {
            return Err(CaptureError::Timeout { waited, polls });
        }
        thread::sleep(backoff.min(policy.timeout - waited));
        backoff = (backoff * 2).min(policy.max_backoff);
    }
}

/// Raw block as returned by the logger: three index-aligned buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBlock {
    times_ms: Vec<i32>,
    values: Vec<i32>,
    overflow: Vec<i16>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    pub index: usize,
    pub time_ms: i32,
    pub value: i32,
    pub overflow: i16,
}

impl SampleBlock {
    pub fn new(times_ms: Vec<i32>, values: Vec<i32>, overflow: Vec<i16>) -> Result<Self, CaptureError> {
        if times_ms.is_empty() || times_ms.len() != values.len() || values.len() != overflow.len() {
            return Err(CaptureError::AcquisitionRead(format!(
                "misaligned buffers: {} times, {} values, {} overflow flags",
                times_ms.len(),
                values.len(),
                overflow.len()
            )));
        }
        Ok(Self {
            times_ms,
            values,
            overflow,
        })
    }
    pub fn iter(&self) -> impl Iterator<Item = RawSample> + '_ {
        self.times_ms
            .iter()
            .zip(&self.values)
            .zip(&self.overflow)
            .enumerate()
            .map(|(index, ((&time_ms, &value), &overflow))| RawSample {
                index,
                time_ms,
                value,
                overflow,
            })
    }
}
