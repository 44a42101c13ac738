use chrono::{DateTime, Local};
use log::{info, warn};

use crate::config::CaptureConfig;
use crate::drivers::acquisition::SampleBlock;
use crate::drivers::convert::{convert, Calibration, Capture};
use crate::drivers::device::HrdlDriver;
use crate::drivers::error::CaptureError;
use crate::drivers::session::Session;
use crate::drivers::status::StatusReport;

/// Runs the device half of a capture: open, configure, acquire, calibrate, close, convert.
///
/// Every driver call lands in `report`, including the close that follows a failure.
pub fn capture<D: HrdlDriver>(
    driver: &D,
    config: &CaptureConfig,
    report: &mut StatusReport,
) -> Result<Capture, CaptureError> {
    config.validate()?;
    let samples = config.sample_count();
    info!(
        "Capturing {samples} samples on channel {} every {} ms",
        config.channel.channel, config.sampling.interval_ms
    );
    let mut session = report.track(Session::open(driver))?;
    let acquired = acquire(&mut session, config, samples, report);
    match report.track(session.close()) {
        Ok(()) => info!("Unit closed successfully"),
        Err(err) => warn!("{err}"),
    }
    let (started_at, block, calibration) = acquired?;
    let capture = Capture {
        channel: config.channel,
        started_at,
        samples: convert(&block, &calibration, &config.channel),
    };
    let overflows = capture.overflow_count();
    if overflows > 0 {
        warn!(
            "{overflows} of {} samples overflowed the {:?} range",
            capture.samples.len(),
            config.channel.range
        );
    }
    Ok(capture)
}

fn acquire<D: HrdlDriver>(
    session: &mut Session<'_, D>,
    config: &CaptureConfig,
    samples: usize,
    report: &mut StatusReport,
) -> Result<(DateTime<Local>, SampleBlock, Calibration), CaptureError> {
    report.track(session.set_mains(config.mains))?;
    report.track(session.configure_channel(&config.channel))?;
    report.track(session.set_interval(&config.sampling))?;
    let started_at = report.track(session.start_block(samples, config.method))?;
    report.track(session.wait_until_ready(&config.poll_policy()))?;
    let block = report.track(session.read_block())?;
    report.track(session.stop())?;
    let calibration = report.track(session.read_calibration(config.channel.channel))?;
    Ok((started_at, block, calibration))
}
