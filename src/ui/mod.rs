//! UI Module - egui integration
//!
//! Handles the interface between the render-scheduling core and the egui
//! frontend: the visible `PlotView` widget and the demo plot models used by
//! the example binary.

pub mod demo;
pub mod view;

pub use demo::{examples, Example, FunctionPlot};
pub use view::PlotView;
