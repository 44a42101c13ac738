use anyhow::{Context, Result};
use libloading::Library;
use once_cell::sync::OnceCell;
use std::os::raw::c_char;

use crate::drivers::HrdlDriver;
use crate::types::UnitInfo;

// picohrdl is stdcall on 32-bit Windows and cdecl elsewhere; "system" covers both.
type FnOpenUnit = unsafe extern "system" fn() -> i16;
type FnSetMains = unsafe extern "system" fn(i16, i16) -> i16;
type FnSetAnalogInChannel = unsafe extern "system" fn(i16, i16, i16, i16, i16) -> i16;
type FnSetInterval = unsafe extern "system" fn(i16, i32, i16) -> i16;
type FnRun = unsafe extern "system" fn(i16, i32, i16) -> i16;
type FnReady = unsafe extern "system" fn(i16) -> i16;
type FnGetTimesAndValues = unsafe extern "system" fn(i16, *mut i32, *mut i32, *mut i16, i32) -> i32;
type FnStop = unsafe extern "system" fn(i16);
type FnGetMinMaxAdcCounts = unsafe extern "system" fn(i16, *mut i32, *mut i32, i16) -> i16;
type FnCloseUnit = unsafe extern "system" fn(i16) -> i16;
type FnGetUnitInfo = unsafe extern "system" fn(i16, *mut c_char, i16, i16) -> i16;

const UNIT_INFO_LEN: usize = 80;

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    "C:\\Program Files\\Pico Technology\\SDK\\lib\\picohrdl.dll",
    "C:\\Program Files (x86)\\Pico Technology\\SDK\\lib\\picohrdl.dll",
];
#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] =
    &["/Library/Frameworks/PicoSDK.framework/Libraries/libpicohrdl/libpicohrdl.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const INSTALL_PATHS: &[&str] = &["/opt/picoscope/lib/libpicohrdl.so"];

struct HrdlApi {
    #[allow(dead_code)]
    lib: Library,
    open_unit: FnOpenUnit,
    set_mains: FnSetMains,
    set_analog_in_channel: FnSetAnalogInChannel,
    set_interval: FnSetInterval,
    run: FnRun,
    ready: FnReady,
    get_times_and_values: FnGetTimesAndValues,
    stop: FnStop,
    get_min_max_adc_counts: FnGetMinMaxAdcCounts,
    close_unit: FnCloseUnit,
    get_unit_info: FnGetUnitInfo,
}
impl HrdlApi {
    fn load() -> Result<Self> {
        let lib = Self::open_library()?;
        // Safety: signatures follow the PicoLog ADC-20/ADC-24 programmer's guide.
        unsafe {
            Ok(Self {
                open_unit: *lib.get(b"HRDLOpenUnit\0")?,
                set_mains: *lib.get(b"HRDLSetMains\0")?,
                set_analog_in_channel: *lib.get(b"HRDLSetAnalogInChannel\0")?,
                set_interval: *lib.get(b"HRDLSetInterval\0")?,
                run: *lib.get(b"HRDLRun\0")?,
                ready: *lib.get(b"HRDLReady\0")?,
                get_times_and_values: *lib.get(b"HRDLGetTimesAndValues\0")?,
                stop: *lib.get(b"HRDLStop\0")?,
                get_min_max_adc_counts: *lib.get(b"HRDLGetMinMaxAdcCounts\0")?,
                close_unit: *lib.get(b"HRDLCloseUnit\0")?,
                get_unit_info: *lib.get(b"HRDLGetUnitInfo\0")?,
                lib,
            })
        }
    }
    fn open_library() -> Result<Library> {
        let name = libloading::library_filename("picohrdl");
        let first = match unsafe { Library::new(&name) } {
            Ok(lib) => return Ok(lib),
            Err(err) => err,
        };
        for path in INSTALL_PATHS {
            if let Ok(lib) = unsafe { Library::new(path) } {
                log::debug!("loaded HRDL driver from {path}");
                return Ok(lib);
            }
        }
        Err(first).with_context(|| {
            format!(
                "{} not found on the library path or in {:?}",
                name.to_string_lossy(),
                INSTALL_PATHS
            )
        })
    }
    fn instance() -> Result<&'static HrdlApi> {
        static API: OnceCell<HrdlApi> = OnceCell::new();
        API.get_or_try_init(Self::load)
    }
}

/// The vendor driver, loaded once per process.
pub struct HrdlLibrary {
    api: &'static HrdlApi,
}
impl HrdlLibrary {
    pub fn load() -> Result<Self> {
        Ok(Self {
            api: HrdlApi::instance()?,
        })
    }
}

impl HrdlDriver for HrdlLibrary {
    fn open_unit(&self) -> i16 {
        unsafe { (self.api.open_unit)() }
    }
    fn set_mains(&self, handle: i16, sixty_hertz: i16) -> i16 {
        unsafe { (self.api.set_mains)(handle, sixty_hertz) }
    }
    fn set_analog_in_channel(
        &self,
        handle: i16,
        channel: i16,
        enabled: i16,
        range: i16,
        single_ended: i16,
    ) -> i16 {
        unsafe { (self.api.set_analog_in_channel)(handle, channel, enabled, range, single_ended) }
    }
    fn set_interval(&self, handle: i16, sample_interval_ms: i32, conversion_time: i16) -> i16 {
        unsafe { (self.api.set_interval)(handle, sample_interval_ms, conversion_time) }
    }
    fn run(&self, handle: i16, n_values: i32, method: i16) -> i16 {
        unsafe { (self.api.run)(handle, n_values, method) }
    }
    fn ready(&self, handle: i16) -> i16 {
        unsafe { (self.api.ready)(handle) }
    }
    fn get_times_and_values(
        &self,
        handle: i16,
        times: &mut [i32],
        values: &mut [i32],
        overflow: &mut [i16],
    ) -> i32 {
        // The driver writes exactly `n` entries into each buffer.
        let n = times.len().min(values.len()).min(overflow.len());
        unsafe {
            (self.api.get_times_and_values)(
                handle,
                times.as_mut_ptr(),
                values.as_mut_ptr(),
                overflow.as_mut_ptr(),
                n as i32,
            )
        }
    }
    fn stop(&self, handle: i16) {
        unsafe { (self.api.stop)(handle) }
    }
    fn get_min_max_adc_counts(
        &self,
        handle: i16,
        min: &mut i32,
        max: &mut i32,
        channel: i16,
    ) -> i16 {
        unsafe { (self.api.get_min_max_adc_counts)(handle, min as *mut i32, max as *mut i32, channel) }
    }
    fn close_unit(&self, handle: i16) -> i16 {
        unsafe { (self.api.close_unit)(handle) }
    }
    fn unit_info(&self, handle: i16, info: UnitInfo) -> Option<String> {
        let mut buf = [0 as c_char; UNIT_INFO_LEN];
        let written = unsafe {
            (self.api.get_unit_info)(handle, buf.as_mut_ptr(), UNIT_INFO_LEN as i16, info as i16)
        };
        if written <= 0 {
            return None;
        }
        let bytes: Vec<u8> = buf[..(written as usize).min(UNIT_INFO_LEN)]
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        let text = String::from_utf8_lossy(&bytes).trim().to_owned();
        (!text.is_empty()).then_some(text)
    }
}
