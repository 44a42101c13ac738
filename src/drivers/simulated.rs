use std::cell::RefCell;

use crate::drivers::device::HrdlDriver;
use crate::types::{ConversionTime, Step, UnitInfo};

/// In-memory logger useful for tests and deterministic playback.
///
/// Samples form a ramp of `ramp_step` counts per sample spaced by the configured interval.
pub struct SimulatedLogger {
    pub present: bool,
    /// `None` never signals ready.
    pub ready_after_polls: Option<u32>,
    /// Entry point that reports failure.
    pub reject: Option<Step>,
    pub short_read: bool,
    pub min_adc: i32,
    pub max_adc: i32,
    pub ramp_step: i32,
    pub overflow_at: Option<usize>,
    state: RefCell<SimState>,
}

#[derive(Default)]
struct SimState {
    open: bool,
    channel: i16,
    interval_ms: i32,
    requested: i32,
    polls: u32,
    calls: Vec<Step>,
}

const SIM_HANDLE: i16 = 1;

impl Default for SimulatedLogger {
    fn default() -> Self {
        Self {
            present: true,
            ready_after_polls: Some(3),
            reject: None,
            short_read: false,
            min_adc: -524_287,
            max_adc: 524_287,
            ramp_step: 20_000,
            overflow_at: None,
            state: RefCell::new(SimState::default()),
        }
    }
}

impl SimulatedLogger {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn rejecting(step: Step) -> Self {
        Self {
            reject: Some(step),
            ..Self::default()
        }
    }
    /// No unit attached.
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::default()
        }
    }
    pub fn never_ready() -> Self {
        Self {
            ready_after_polls: None,
            ..Self::default()
        }
    }
    /// Returns one value fewer than requested.
    pub fn short_reading() -> Self {
        Self {
            short_read: true,
            ..Self::default()
        }
    }
    /// Flags the channel's overflow bit on sample `index` (0-based).
    pub fn overflowing_at(index: usize) -> Self {
        Self {
            overflow_at: Some(index),
            ..Self::default()
        }
    }
    /// Entry points called so far, in order. Repeated ready polls are collapsed.
    pub fn calls(&self) -> Vec<Step> {
        self.state.borrow().calls.clone()
    }
    pub fn count(&self, step: Step) -> usize {
        self.state.borrow().calls.iter().filter(|s| **s == step).count()
    }
    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }
    pub fn raw_at(&self, index: usize) -> i32 {
        self.ramp_step.saturating_mul(index as i32)
    }
    fn record(&self, step: Step) {
        let mut state = self.state.borrow_mut();
        if step == Step::Ready && state.calls.last() == Some(&Step::Ready) {
            return;
        }
        state.calls.push(step);
    }
    fn status(&self, step: Step, handle: i16) -> i16 {
        self.record(step);
        let open = self.state.borrow().open;
        if self.reject == Some(step) || handle != SIM_HANDLE || !open {
            0
        } else {
            1
        }
    }
}

fn conversion_from_raw(raw: i16) -> Option<ConversionTime> {
    match raw {
        0 => Some(ConversionTime::Ms60),
        1 => Some(ConversionTime::Ms100),
        2 => Some(ConversionTime::Ms180),
        3 => Some(ConversionTime::Ms340),
        4 => Some(ConversionTime::Ms660),
        _ => None,
    }
}

impl HrdlDriver for SimulatedLogger {
    fn open_unit(&self) -> i16 {
        self.record(Step::OpenUnit);
        let mut state = self.state.borrow_mut();
        if !self.present {
            return 0;
        }
        if state.open || self.reject == Some(Step::OpenUnit) {
            return -1;
        }
        state.open = true;
        SIM_HANDLE
    }
    fn set_mains(&self, handle: i16, sixty_hertz: i16) -> i16 {
        if !(0..=1).contains(&sixty_hertz) {
            self.record(Step::MainsRejection);
            return 0;
        }
        self.status(Step::MainsRejection, handle)
    }
    fn set_analog_in_channel(
        &self,
        handle: i16,
        channel: i16,
        _enabled: i16,
        range: i16,
        _single_ended: i16,
    ) -> i16 {
        let status = self.status(Step::SetAnalogInChannel, handle);
        if status == 0 || !(0..=6).contains(&range) {
            return 0;
        }
        self.state.borrow_mut().channel = channel;
        status
    }
    fn set_interval(&self, handle: i16, sample_interval_ms: i32, conversion_time: i16) -> i16 {
        let status = self.status(Step::SetInterval, handle);
        let Some(conversion) = conversion_from_raw(conversion_time) else {
            return 0;
        };
        if status == 0 || sample_interval_ms <= conversion.millis() as i32 {
            return 0;
        }
        self.state.borrow_mut().interval_ms = sample_interval_ms;
        status
    }
    fn run(&self, handle: i16, n_values: i32, _method: i16) -> i16 {
        let status = self.status(Step::Run, handle);
        if status == 0 || n_values < 1 {
            return 0;
        }
        let mut state = self.state.borrow_mut();
        state.requested = n_values;
        state.polls = 0;
        status
    }
    fn ready(&self, handle: i16) -> i16 {
        if self.status(Step::Ready, handle) == 0 {
            return 0;
        }
        let mut state = self.state.borrow_mut();
        state.polls += 1;
        match self.ready_after_polls {
            Some(after) if state.polls >= after => 1,
            _ => 0,
        }
    }
    fn get_times_and_values(
        &self,
        handle: i16,
        times: &mut [i32],
        values: &mut [i32],
        overflow: &mut [i16],
    ) -> i32 {
        if self.status(Step::GetValues, handle) == 0 {
            return 0;
        }
        let (requested, interval_ms, channel) = {
            let state = self.state.borrow();
            (state.requested.max(0) as usize, state.interval_ms, state.channel)
        };
        let mut written = requested.min(times.len()).min(values.len()).min(overflow.len());
        if self.short_read {
            written = written.saturating_sub(1);
        }
        for i in 0..written {
            times[i] = interval_ms * i as i32;
            values[i] = self.raw_at(i);
            overflow[i] = if self.overflow_at == Some(i) {
                1 << (channel - 1)
            } else {
                0
            };
        }
        written as i32
    }
    fn stop(&self, _handle: i16) {
        self.record(Step::Stop);
    }
    fn get_min_max_adc_counts(
        &self,
        handle: i16,
        min: &mut i32,
        max: &mut i32,
        channel: i16,
    ) -> i16 {
        let status = self.status(Step::GetMinMaxAdcCounts, handle);
        if status == 0 || channel != self.state.borrow().channel {
            return 0;
        }
        *min = self.min_adc;
        *max = self.max_adc;
        status
    }
    fn close_unit(&self, handle: i16) -> i16 {
        let status = self.status(Step::CloseUnit, handle);
        if handle == SIM_HANDLE {
            self.state.borrow_mut().open = false;
        }
        status
    }
    fn unit_info(&self, handle: i16, info: UnitInfo) -> Option<String> {
        match info {
            UnitInfo::LastError if handle == 0 && !self.present => Some("3".into()),
            UnitInfo::Variant if handle == SIM_HANDLE => Some("ADC20".into()),
            UnitInfo::BatchAndSerial if handle == SIM_HANDLE => Some("SIM00/001".into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn simulated_unit_opens_once() {
        let sim = SimulatedLogger::new();
        assert_eq!(sim.open_unit(), SIM_HANDLE);
        assert_eq!(sim.open_unit(), -1);
        assert_eq!(sim.close_unit(SIM_HANDLE), 1);
        assert!(!sim.is_open());
    }
    #[test]
    fn calls_on_closed_handle_fail() {
        let sim = SimulatedLogger::new();
        assert_eq!(sim.set_mains(SIM_HANDLE, 0), 0);
    }
    #[test]
    fn simulated_interval_check_mirrors_device() {
        let sim = SimulatedLogger::new();
        let handle = sim.open_unit();
        assert_eq!(sim.set_interval(handle, 50, ConversionTime::Ms60 as i16), 0);
        assert_eq!(sim.set_interval(handle, 110, ConversionTime::Ms60 as i16), 1);
        assert_eq!(sim.set_interval(handle, 110, 9), 0);
    }
    #[test]
    fn ready_polls_are_collapsed_in_call_log() {
        let sim = SimulatedLogger::new();
        let handle = sim.open_unit();
        sim.set_interval(handle, 110, 0);
        sim.run(handle, 4, 0);
        while sim.ready(handle) == 0 {}
        assert_eq!(sim.calls(), vec![Step::OpenUnit, Step::SetInterval, Step::Run, Step::Ready]);
    }
}
