use std::time::Duration;
use thiserror::Error;

use crate::types::Step;
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open data logger: {0}")]
    DeviceOpen(String),
    #[error("failed to close unit {handle} (status {status})")]
    DeviceClose { handle: i16, status: i16 },
    #[error("{step} rejected: {reason}")]
    Configuration { step: Step, reason: String },
    #[error("failed to start acquisition (status {status})")]
    AcquisitionStart { status: i16 },
    #[error("failed to read samples: {0}")]
    AcquisitionRead(String),
    #[error("device not ready after {waited:?} ({polls} polls)")]
    Timeout { waited: Duration, polls: u32 },
    #[error("failed to read calibration bounds for channel {channel}: {reason}")]
    CalibrationRead { channel: i16, reason: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("plot window failed: {0}")]
    Display(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for CaptureError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        CaptureError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for CaptureError {
    fn from(value: image::ImageError) -> Self {
        CaptureError::Plot(value.to_string())
    }
}
