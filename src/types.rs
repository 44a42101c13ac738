// src/types.rs
// HRDL SDK enumerations. Discriminants are the values the driver expects.
use std::fmt;

/// Mains noise rejection frequency.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum MainsRejection {
    #[default]
    Hz50 = 0,
    Hz60 = 1,
}

/// Full-scale input range of an analog channel.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum VoltageRange {
    #[default]
    Mv2500 = 0,
    Mv1250 = 1,
    Mv625 = 2,
    Mv313 = 3,
    Mv156 = 4,
    Mv78 = 5,
    Mv39 = 6,
}

impl VoltageRange {
    /// Nominal full-scale value in millivolts.
    pub fn full_scale_mv(self) -> f64 {
        match self {
            VoltageRange::Mv2500 => 2500.0,
            VoltageRange::Mv1250 => 1250.0,
            VoltageRange::Mv625 => 625.0,
            VoltageRange::Mv313 => 312.5,
            VoltageRange::Mv156 => 156.25,
            VoltageRange::Mv78 => 78.125,
            VoltageRange::Mv39 => 39.0625,
        }
    }
}

/// Per-sample ADC conversion time.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum ConversionTime {
    #[default]
    Ms60 = 0,
    Ms100 = 1,
    Ms180 = 2,
    Ms340 = 3,
    Ms660 = 4,
}

impl ConversionTime {
    pub fn millis(self) -> u32 {
        match self {
            ConversionTime::Ms60 => 60,
            ConversionTime::Ms100 => 100,
            ConversionTime::Ms180 => 180,
            ConversionTime::Ms340 => 340,
            ConversionTime::Ms660 => 660,
        }
    }
}

/// Capture method passed to `HRDLRun`. Only `Block` is exercised.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum BlockMethod {
    #[default]
    Block = 0,
    Window = 1,
    Stream = 2,
}

/// Selector for `HRDLGetUnitInfo`.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UnitInfo {
    DriverVersion = 0,
    UsbVersion = 1,
    HardwareVersion = 2,
    Variant = 3,
    BatchAndSerial = 4,
    CalibrationDate = 5,
    KernelDriverVersion = 6,
    LastError = 7,
    SettingsError = 8,
}

/// One SDK call in the capture sequence, named the way the status report prints it.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Step {
    OpenUnit,
    MainsRejection,
    SetAnalogInChannel,
    SetInterval,
    Run,
    Ready,
    GetValues,
    Stop,
    GetMinMaxAdcCounts,
    CloseUnit,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::OpenUnit => "openUnit",
            Step::MainsRejection => "mainsRejection",
            Step::SetAnalogInChannel => "setAnalogInChannel",
            Step::SetInterval => "setInterval",
            Step::Run => "run",
            Step::Ready => "ready",
            Step::GetValues => "getValues",
            Step::Stop => "stop",
            Step::GetMinMaxAdcCounts => "getMinMaxAdcCounts",
            Step::CloseUnit => "closeUnit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
