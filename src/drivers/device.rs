use crate::types::UnitInfo;

/// The HRDL SDK call set, one method per entry point.
///
/// Return values are the driver's raw status codes; `Session` interprets them.
/// Slices passed to `get_times_and_values` must all have the requested length.
pub trait HrdlDriver {
    /// Handle > 0 on success, 0 if no unit was found, < 0 if it failed to open.
    fn open_unit(&self) -> i16;
    fn set_mains(&self, handle: i16, sixty_hertz: i16) -> i16;
    fn set_analog_in_channel(
        &self,
        handle: i16,
        channel: i16,
        enabled: i16,
        range: i16,
        single_ended: i16,
    ) -> i16;
    fn set_interval(&self, handle: i16, sample_interval_ms: i32, conversion_time: i16) -> i16;
    fn run(&self, handle: i16, n_values: i32, method: i16) -> i16;
    fn ready(&self, handle: i16) -> i16;
    /// Number of values written, 0 on failure.
    fn get_times_and_values(
        &self,
        handle: i16,
        times: &mut [i32],
        values: &mut [i32],
        overflow: &mut [i16],
    ) -> i32;
    /// The driver reports nothing back from stop.
    fn stop(&self, handle: i16);
    fn get_min_max_adc_counts(&self, handle: i16, min: &mut i32, max: &mut i32, channel: i16)
        -> i16;
    fn close_unit(&self, handle: i16) -> i16;
    fn unit_info(&self, handle: i16, info: UnitInfo) -> Option<String>;
}
