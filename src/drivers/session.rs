use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::config::{ChannelConfig, PollPolicy, SamplingConfig};
use crate::drivers::acquisition::{poll_until, SampleBlock};
use crate::drivers::convert::Calibration;
use crate::drivers::device::HrdlDriver;
use crate::drivers::status::{Checked, StepRecord};
use crate::drivers::CaptureError;
use crate::types::{BlockMethod, MainsRejection, Step, UnitInfo};

/// An open logger. Dropping it stops any running capture and closes the unit,
/// so the handle is released on every exit path.
pub struct Session<'a, D: HrdlDriver> {
    driver: &'a D,
    handle: i16,
    requested: usize,
    is_running: bool,
    released: bool,
}

impl<'a, D: HrdlDriver> Session<'a, D> {
    pub fn open(driver: &'a D) -> Checked<Self> {
        let handle = driver.open_unit();
        let record = StepRecord::checked(Step::OpenUnit, handle as i32, handle > 0);
        if handle <= 0 {
            let reason = if handle == 0 {
                "no unit found".to_owned()
            } else {
                "unit found but could not be claimed".to_owned()
            };
            let reason = match driver.unit_info(0, UnitInfo::LastError) {
                Some(code) => format!("{reason} (driver error {code})"),
                None => reason,
            };
            return Checked::err(record, CaptureError::DeviceOpen(reason));
        }
        let variant = driver.unit_info(handle, UnitInfo::Variant);
        let serial = driver.unit_info(handle, UnitInfo::BatchAndSerial);
        info!(
            "Unit opened with handle {handle}: {} {}",
            variant.as_deref().unwrap_or("unknown variant"),
            serial.as_deref().unwrap_or("unknown serial")
        );
        let session = Self {
            driver,
            handle,
            requested: 0,
            is_running: false,
            released: false,
        };
        Checked::ok(record, session)
    }

    fn setting(&self, step: Step, status: i16, reason: impl FnOnce() -> String) -> Checked<()> {
        let record = StepRecord::checked(step, status as i32, status != 0);
        if status == 0 {
            Checked::err(
                record,
                CaptureError::Configuration {
                    step,
                    reason: reason(),
                },
            )
        } else {
            Checked::ok(record, ())
        }
    }

    pub fn set_mains(&mut self, mains: MainsRejection) -> Checked<()> {
        let status = self.driver.set_mains(self.handle, mains as i16);
        self.setting(Step::MainsRejection, status, || format!("mains mode {mains:?}"))
    }

    pub fn configure_channel(&mut self, channel: &ChannelConfig) -> Checked<()> {
        let status = self.driver.set_analog_in_channel(
            self.handle,
            channel.channel,
            channel.enabled as i16,
            channel.range as i16,
            channel.single_ended as i16,
        );
        self.setting(Step::SetAnalogInChannel, status, || {
            format!(
                "channel {} range {:?} single-ended {}",
                channel.channel, channel.range, channel.single_ended
            )
        })
    }

    pub fn set_interval(&mut self, sampling: &SamplingConfig) -> Checked<()> {
        let status = self.driver.set_interval(
            self.handle,
            sampling.interval_ms as i32,
            sampling.conversion as i16,
        );
        self.setting(Step::SetInterval, status, || {
            format!(
                "interval {} ms with conversion {:?}",
                sampling.interval_ms, sampling.conversion
            )
        })
    }

    /// Arms a capture of `samples` values. Returns the wall-clock start.
    pub fn start_block(&mut self, samples: usize, method: BlockMethod) -> Checked<DateTime<Local>> {
        let started_at = Local::now();
        let status = self.driver.run(self.handle, samples as i32, method as i16);
        let record = StepRecord::checked(Step::Run, status as i32, status != 0);
        if status == 0 {
            return Checked::err(record, CaptureError::AcquisitionStart { status });
        }
        self.requested = samples;
        self.is_running = true;
        Checked::ok(record, started_at)
    }

    /// Blocks until the logger reports the block complete. Returns the number of polls.
    pub fn wait_until_ready(&mut self, policy: &PollPolicy) -> Checked<u32> {
        let driver = self.driver;
        let handle = self.handle;
        let mut last = 0i16;
        let polled = poll_until(policy, || {
            last = driver.ready(handle);
            last != 0
        });
        let record = StepRecord::checked(Step::Ready, last as i32, polled.is_ok());
        match polled {
            Ok(polls) => {
                debug!("unit {handle} ready after {polls} polls");
                Checked::ok(record, polls)
            }
            Err(err) => Checked::err(record, err),
        }
    }

    pub fn read_block(&mut self) -> Checked<SampleBlock> {
        let n = self.requested;
        let mut times = vec![0i32; n];
        let mut values = vec![0i32; n];
        let mut overflow = vec![0i16; n];
        let count = self
            .driver
            .get_times_and_values(self.handle, &mut times, &mut values, &mut overflow);
        let record = StepRecord::checked(Step::GetValues, count, count as usize == n && n > 0);
        if count <= 0 {
            return Checked::err(
                record,
                CaptureError::AcquisitionRead("driver returned no values".into()),
            );
        }
        if count as usize != n {
            return Checked::err(
                record,
                CaptureError::AcquisitionRead(format!("expected {n} values, got {count}")),
            );
        }
        match SampleBlock::new(times, values, overflow) {
            Ok(block) => Checked::ok(record, block),
            Err(err) => Checked::err(record, err),
        }
    }

    /// The driver gives no status for stop, so the record is always unchecked.
    pub fn stop(&mut self) -> Checked<()> {
        self.driver.stop(self.handle);
        self.is_running = false;
        Checked::ok(StepRecord::unchecked(Step::Stop), ())
    }

    pub fn read_calibration(&mut self, channel: i16) -> Checked<Calibration> {
        let mut min_adc = 0i32;
        let mut max_adc = 0i32;
        let status = self
            .driver
            .get_min_max_adc_counts(self.handle, &mut min_adc, &mut max_adc, channel);
        let record = StepRecord::checked(Step::GetMinMaxAdcCounts, status as i32, status != 0);
        if status == 0 {
            return Checked::err(
                record,
                CaptureError::CalibrationRead {
                    channel,
                    reason: format!("driver status {status}"),
                },
            );
        }
        match Calibration::new(channel, min_adc, max_adc) {
            Ok(calibration) => Checked::ok(record, calibration),
            Err(err) => Checked::err(record, err),
        }
    }

    /// Stops a capture still in flight, then releases the unit.
    pub fn close(mut self) -> Checked<()> {
        let handle = self.handle;
        if self.is_running {
            self.driver.stop(handle);
            self.is_running = false;
        }
        let status = self.driver.close_unit(handle);
        self.released = true;
        let record = StepRecord::checked(Step::CloseUnit, status as i32, status != 0);
        if status == 0 {
            Checked::err(record, CaptureError::DeviceClose { handle, status })
        } else {
            Checked::ok(record, ())
        }
    }
}

impl<'a, D: HrdlDriver> Drop for Session<'a, D> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if self.is_running {
            self.driver.stop(self.handle);
        }
        if self.driver.close_unit(self.handle) == 0 {
            warn!("failed to close unit {} while dropping session", self.handle);
        } else {
            debug!("unit {} closed on drop", self.handle);
        }
    }
}
