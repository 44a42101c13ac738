// src/drivers/mod.rs
pub mod acquisition;
pub mod convert;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod session;
#[cfg(test)]
pub mod simulated;
pub mod status;
pub use convert::Capture;
pub use device::HrdlDriver;
pub use error::CaptureError;
pub use pipeline::capture;
pub use plot::{render_capture_png, PlotStyle};
#[cfg(test)]
pub use simulated::SimulatedLogger;
pub use status::StatusReport;
