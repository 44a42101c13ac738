// src/gui.rs
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::drivers::plot::{TITLE, X_LABEL, Y_LABEL};
use crate::drivers::{Capture, CaptureError};

pub struct CapturePlotApp {
    points: Vec<[f64; 2]>,
    summary: String,
}

impl CapturePlotApp {
    pub fn new(capture: &Capture) -> Self {
        let summary = match capture.millivolt_bounds() {
            Some((lo, hi)) => format!(
                "Channel {} ({:?}): {} samples, {:.3} .. {:.3} mV, {} overflowed",
                capture.channel.channel,
                capture.channel.range,
                capture.samples.len(),
                lo,
                hi,
                capture.overflow_count()
            ),
            None => "No samples".to_owned(),
        };
        Self {
            points: capture.points(),
            summary,
        }
    }
}

impl eframe::App for CapturePlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("summary").show(ctx, |ui| {
            ui.label(&self.summary);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| ui.heading(TITLE));
            Plot::new("capture_plot")
                .x_axis_label(X_LABEL)
                .y_axis_label(Y_LABEL)
                .auto_bounds_x()
                .auto_bounds_y()
                .show(ui, |plot_ui| {
                    let trace = Color32::from_rgb(31, 119, 180);
                    plot_ui.line(
                        Line::new(PlotPoints::new(self.points.clone()))
                            .name("Value (mV)")
                            .color(trace),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::new(self.points.clone()))
                            .radius(3.0)
                            .color(trace),
                    );
                });
        });
    }
}

/// Opens the plot window and returns once the user closes it.
pub fn show_capture(capture: &Capture) -> Result<(), CaptureError> {
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1000.0, 600.0])
        .with_title(TITLE);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let app = CapturePlotApp::new(capture);
    eframe::run_native(TITLE, options, Box::new(move |_cc| Box::new(app)))
        .map_err(|err| CaptureError::Display(err.to_string()))
}
