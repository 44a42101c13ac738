use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::RowTimestamp;
use crate::drivers::Capture;

pub const HEADER: &str = "Sample Number,Time (ms),Value (mV),Timestamp";
const FILE_STAMP: &str = "%Y%m%d_%H%M%S";
const ROW_STAMP: &str = "%Y-%m-%d %H:%M:%S";
const MAX_SUFFIX: u32 = 100;

/// Writes a capture as CSV, one row per sample.
pub struct CaptureRecorder<W: Write> {
    writer: BufWriter<W>,
}

impl CaptureRecorder<File> {
    /// Creates `recorded_data_<stamp>.csv` in `dir`. An existing file is never
    /// truncated; a same-second collision gets a `_<n>` suffix instead.
    /// Returns the recorder with the path it claimed.
    pub fn create(dir: &Path, now: DateTime<Local>) -> io::Result<(Self, PathBuf)> {
        let stem = format!("recorded_data_{}", now.format(FILE_STAMP));
        let mut suffix = 0;
        loop {
            let name = if suffix == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{suffix}.csv")
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((Self::from_writer(file), path)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists && suffix < MAX_SUFFIX => {
                    suffix += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<W: Write> CaptureRecorder<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }
    /// Writes the header and every sample. Returns the number of rows.
    pub fn write_capture(&mut self, capture: &Capture, stamps: RowTimestamp) -> io::Result<usize> {
        writeln!(self.writer, "{HEADER}")?;
        for sample in &capture.samples {
            let stamp = match stamps {
                RowTimestamp::WrittenAt => Local::now(),
                RowTimestamp::CaptureTime => {
                    capture.started_at + chrono::Duration::milliseconds(sample.time_ms as i64)
                }
            };
            writeln!(
                self.writer,
                "{},{},{},{}",
                sample.number,
                sample.time_ms,
                sample.millivolts,
                stamp.format(ROW_STAMP)
            )?;
        }
        Ok(capture.samples.len())
    }
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;
    use crate::drivers::convert::ConvertedSample;
    use chrono::TimeZone;

    fn capture(n: usize) -> Capture {
        Capture {
            channel: ChannelConfig::default(),
            started_at: Local.with_ymd_and_hms(2024, 8, 3, 11, 50, 14).unwrap(),
            samples: (0..n)
                .map(|i| ConvertedSample {
                    number: i + 1,
                    time_ms: 110 * i as i32,
                    raw: 10 * i as i32,
                    millivolts: 25.0 * i as f64,
                    overflow: false,
                })
                .collect(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hrdl-capture-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn rows_follow_buffer_order() {
        let mut recorder = CaptureRecorder::from_writer(Vec::new());
        let rows = recorder.write_capture(&capture(19), RowTimestamp::WrittenAt).unwrap();
        assert_eq!(rows, 19);
        let text = String::from_utf8(recorder.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[0], HEADER);
        for (i, line) in lines[1..].iter().enumerate() {
            let cols: Vec<&str> = line.split(',').collect();
            assert_eq!(cols.len(), 4);
            assert_eq!(cols[0], (i + 1).to_string());
            assert_eq!(cols[1], (110 * i).to_string());
            assert_eq!(cols[3].len(), "2024-08-03 11:50:14".len());
        }
        assert!(lines[3].starts_with("3,220,50,"));
    }

    #[test]
    fn capture_time_stamps_offset_from_start() {
        let mut recorder = CaptureRecorder::from_writer(Vec::new());
        recorder.write_capture(&capture(19), RowTimestamp::CaptureTime).unwrap();
        let text = String::from_utf8(recorder.finish().unwrap()).unwrap();
        let last = text.lines().last().unwrap();
        // 18 * 110 ms = 1.98 s after 11:50:14
        assert!(last.ends_with("2024-08-03 11:50:15"), "{last}");
    }

    #[test]
    fn same_second_runs_get_distinct_files() {
        let dir = scratch_dir("collide");
        let now = Local.with_ymd_and_hms(2024, 8, 3, 11, 50, 14).unwrap();
        let mut paths = Vec::new();
        for _ in 0..2 {
            let (mut recorder, path) = CaptureRecorder::create(&dir, now).unwrap();
            recorder.write_capture(&capture(2), RowTimestamp::WrittenAt).unwrap();
            recorder.finish().unwrap();
            paths.push(path);
        }
        assert_eq!(paths[0], dir.join("recorded_data_20240803_115014.csv"));
        assert_eq!(paths[1], dir.join("recorded_data_20240803_115014_1.csv"));
        for path in &paths {
            let text = std::fs::read_to_string(path).unwrap();
            assert_eq!(text.lines().count(), 3);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
