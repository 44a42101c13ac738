use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use crate::drivers::convert::Capture;
use crate::drivers::error::CaptureError;

pub const TITLE: &str = "Recorded Voltage Values Over Time";
pub const X_LABEL: &str = "Time (s)";
pub const Y_LABEL: &str = "Voltage (mV)";

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub trace: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            background: WHITE,
            foreground: BLACK,
            trace: BLUE,
        }
    }
}

/// Axis ranges padded so a flat trace still gets a visible band.
pub fn axis_bounds(capture: &Capture) -> Option<((f64, f64), (f64, f64))> {
    let first = capture.samples.first()?;
    let last = capture.samples.last()?;
    let (lo, hi) = capture.millivolt_bounds()?;
    let x = if last.seconds() > first.seconds() {
        (first.seconds(), last.seconds())
    } else {
        (first.seconds() - 0.5, first.seconds() + 0.5)
    };
    let pad = ((hi - lo) * 0.05).max(1.0);
    Some((x, (lo - pad, hi + pad)))
}

pub fn render_capture_png(capture: &Capture, style: PlotStyle) -> Result<Vec<u8>, CaptureError> {
    let ((x_lo, x_hi), (y_lo, y_hi)) = axis_bounds(capture)
        .ok_or_else(|| CaptureError::Plot("capture has no samples".into()))?;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(TITLE, ("sans-serif", 22).into_font().color(&style.foreground))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
        chart
            .configure_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .light_line_style(&style.foreground.mix(0.1))
            .draw()?;
        let series: Vec<(f64, f64)> = capture
            .samples
            .iter()
            .map(|s| (s.seconds(), s.millivolts))
            .collect();
        chart.draw_series(LineSeries::new(series.iter().copied(), &style.trace))?;
        chart.draw_series(
            series
                .iter()
                .map(|&point| Circle::new(point, 3, style.trace.filled())),
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| CaptureError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
