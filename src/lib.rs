//! PlotView Rust Rendering Core
//!
//! This crate provides a background-rendered plot surface for egui. A plot
//! model is updated and drawn on a background task, never on the UI thread,
//! and the finished drawing is handed to the visible widget as an immutable
//! picture that can be repainted any number of times without recomputation.
//!
//! **Architecture**: UI-thread mutations signal a coalescing invalidation
//! gate; a supervised render loop drains the gate, updates and draws the
//! model under its lock, and publishes the resulting picture back to the
//! widget together with a repaint request.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures (severity, render size, loop state)
//! - **options**: Render configuration
//! - **picture**: Immutable draw-command recordings and the recorder
//! - **plot**: The plot-model trait and its shared, locked handle
//! - **render**: Invalidation gate, render-context adapter, render loop
//! - **ui**: egui integration (the visible `PlotView` widget, demo models)
//! - **logging**: Minimal logger backend for the `log` facade

#![allow(dead_code)]

// Core foundational modules
pub mod error;
pub mod models;
pub mod options;

// Picture recording and the plot-model seam
pub mod picture;
pub mod plot;

// Render scheduling: gate, context adapter, loop + lifecycle
pub mod render;

// egui integration
pub mod ui;

// Minimal stderr logger for the `log` facade
pub mod logging;

// Re-export the log crate for macro usage
pub use log;

// Re-export error types for easy access
pub use error::{PlotError, RenderError, Result};

// Re-export model types for easy access
pub use models::{LoopState, RenderSize, Severity};

// Re-export picture primitives
pub use picture::{DrawCommand, Picture, PictureRecorder};

// Re-export the plot-model seam
pub use plot::{PlotHandle, PlotModel};

// Re-export render scheduling types
pub use render::{DrawContext, InvalidationGate, PlotRenderer, RenderContext};

// Re-export UI surface and options
pub use options::RenderOptions;
pub use ui::PlotView;

// Re-export logging initialization
pub use logging::initialize_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
