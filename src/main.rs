// src/main.rs
mod config;
mod drivers;
mod gui;
mod hrdl;
mod recorder;
mod types;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::drivers::{render_capture_png, Capture, PlotStyle, StatusReport};
use crate::hrdl::HrdlLibrary;
use crate::recorder::CaptureRecorder;

fn persist(capture: &Capture, config: &CaptureConfig) -> Result<PathBuf> {
    let (mut recorder, path) = CaptureRecorder::create(&config.output_dir, Local::now())
        .with_context(|| format!("cannot create CSV in {}", config.output_dir.display()))?;
    let rows = recorder
        .write_capture(capture, config.row_timestamps)
        .with_context(|| format!("failed writing {}", path.display()))?;
    recorder
        .finish()
        .with_context(|| format!("failed flushing {}", path.display()))?;
    info!("{rows} rows written");
    Ok(path)
}

fn save_png(capture: &Capture, csv_path: &Path) {
    let png_path = csv_path.with_extension("png");
    let saved = render_capture_png(capture, PlotStyle::default())
        .and_then(|png| fs::write(&png_path, png).map_err(Into::into));
    match saved {
        Ok(()) => info!("Plot saved to {}", png_path.display()),
        Err(err) => warn!("plot image not saved: {err}"),
    }
}

/// One `Sample <n>: <mV> mV at time <ms> ms` line per sample.
fn print_samples(capture: &Capture, out: &mut impl Write) -> io::Result<()> {
    for sample in &capture.samples {
        writeln!(
            out,
            "Sample {}: {} mV at time {} ms",
            sample.number, sample.millivolts, sample.time_ms
        )?;
    }
    Ok(())
}

fn run(config: &CaptureConfig, report: &mut StatusReport) -> Result<()> {
    let driver = HrdlLibrary::load()?;
    let capture = drivers::capture(&driver, config, report)?;
    let csv_path = persist(&capture, config)?;
    println!("Data saved to {}", csv_path.display());
    save_png(&capture, &csv_path);
    print_samples(&capture, &mut io::stdout().lock())?;
    gui::show_capture(&capture)?;
    Ok(())
}

// 入口函数
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = CaptureConfig::default();
    let mut report = StatusReport::new();
    let outcome = run(&config, &mut report);
    debug!("step status:\n{report}");
    println!("{}", report.to_json()?);
    outcome
}
