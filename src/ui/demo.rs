//! Demo plot models for the example binary
//!
//! A thin holder of example data: a function plot whose samples are
//! recomputed on each data-update pass, and the list of examples shown by
//! the demo application.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use egui::{Align2, Color32, Pos2, Rect, Stroke};

use crate::error::PlotError;
use crate::plot::{PlotHandle, PlotModel};
use crate::render::DrawContext;

const SAMPLE_COUNT: usize = 256;
const PLOT_MARGIN: f32 = 24.0;

/// Shared animation phase, written by the UI thread and read by the model's
/// data-update pass on the render loop.
#[derive(Clone, Default)]
pub struct PhaseHandle {
    bits: Arc<AtomicU32>,
}

impl PhaseHandle {
    pub fn set(&self, phase: f32) {
        self.bits.store(phase.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// A single-series function plot: y = f(x, phase) over x in [0, 1].
pub struct FunctionPlot {
    title: String,
    function: fn(f32, f32) -> f32,
    phase: PhaseHandle,
    /// Samples in the unit square, refreshed by the data-update pass.
    samples: Vec<Pos2>,
    /// Demo hook: force the next update pass to fail.
    fault: Arc<AtomicBool>,
}

impl FunctionPlot {
    pub fn new(title: impl Into<String>, function: fn(f32, f32) -> f32) -> Self {
        FunctionPlot {
            title: title.into(),
            function,
            phase: PhaseHandle::default(),
            samples: Vec::new(),
            fault: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn phase_handle(&self) -> PhaseHandle {
        self.phase.clone()
    }

    pub fn fault_flag(&self) -> Arc<AtomicBool> {
        self.fault.clone()
    }
}

impl PlotModel for FunctionPlot {
    fn update(&mut self, update_data: bool) -> Result<(), PlotError> {
        if self.fault.load(Ordering::SeqCst) {
            return Err(PlotError::UpdateFailed(format!(
                "injected fault in '{}'",
                self.title
            )));
        }

        if update_data || self.samples.is_empty() {
            let phase = self.phase.get();
            self.samples = (0..=SAMPLE_COUNT)
                .map(|i| {
                    let x = i as f32 / SAMPLE_COUNT as f32;
                    Pos2::new(x, (self.function)(x, phase))
                })
                .collect();

            if self.samples.iter().any(|p| !p.y.is_finite()) {
                return Err(PlotError::InvalidData(format!(
                    "non-finite sample in '{}'",
                    self.title
                )));
            }
        }
        Ok(())
    }

    fn render(&self, ctx: &mut dyn DrawContext, area: Rect) -> Result<(), PlotError> {
        let plot_area = area.shrink(PLOT_MARGIN);
        if plot_area.width() <= 0.0 || plot_area.height() <= 0.0 {
            return Ok(());
        }

        let axis_stroke = Stroke::new(1.0, Color32::from_gray(120));
        let grid_stroke = Stroke::new(0.5, Color32::from_gray(210));
        let series_stroke = Stroke::new(1.5, Color32::from_rgb(30, 110, 200));

        // Horizontal gridlines at quarter steps, y axis range [-1, 1].
        for step in 0..=4 {
            let y = plot_area.top() + plot_area.height() * step as f32 / 4.0;
            ctx.line(
                &[
                    Pos2::new(plot_area.left(), y),
                    Pos2::new(plot_area.right(), y),
                ],
                grid_stroke,
            );
        }

        // Axis frame.
        ctx.rect(plot_area, Color32::TRANSPARENT, axis_stroke);

        // Series polyline, clipped to the frame.
        ctx.push_clip(plot_area);
        let points: Vec<Pos2> = self
            .samples
            .iter()
            .map(|p| {
                Pos2::new(
                    plot_area.left() + p.x * plot_area.width(),
                    plot_area.center().y - p.y.clamp(-1.0, 1.0) * plot_area.height() / 2.0,
                )
            })
            .collect();
        ctx.line(&points, series_stroke);
        ctx.pop_clip();

        ctx.text(
            Pos2::new(area.center().x, area.top() + 4.0),
            Align2::CENTER_TOP,
            &self.title,
            12.0,
            Color32::from_gray(60),
        );

        Ok(())
    }

    fn background(&self) -> Option<Color32> {
        Some(Color32::WHITE)
    }
}

/// A named demo plot.
pub struct Example {
    pub name: &'static str,
    pub build: fn() -> FunctionPlot,
}

impl Example {
    pub fn instantiate(&self) -> FunctionPlot {
        (self.build)()
    }

    pub fn handle(&self) -> PlotHandle {
        PlotHandle::new(self.instantiate())
    }
}

/// The demo catalog.
pub fn examples() -> Vec<Example> {
    vec![
        Example {
            name: "Sine",
            build: || {
                FunctionPlot::new("Sine", |x, phase| {
                    (x * std::f32::consts::TAU * 2.0 + phase).sin()
                })
            },
        },
        Example {
            name: "Damped oscillation",
            build: || {
                FunctionPlot::new("Damped oscillation", |x, phase| {
                    (-3.0 * x).exp() * (x * std::f32::consts::TAU * 4.0 + phase).sin()
                })
            },
        },
        Example {
            name: "Beat pattern",
            build: || {
                FunctionPlot::new("Beat pattern", |x, phase| {
                    0.5 * ((x * 19.0 + phase).sin() + (x * 23.0 + phase).sin())
                })
            },
        },
    ]
}
