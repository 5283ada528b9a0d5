//! Render scheduling: coalescing gate, context adapter, render loop
//!
//! The modules here form the background half of the crate: invalidations
//! raised on the UI thread coalesce in the gate, the render loop drains
//! them, and the lifecycle controller ties the loop to the display
//! surface's attach/detach cycle.

pub mod context;
pub mod gate;
pub mod renderer;

pub use context::{DrawContext, RenderContext};
pub use gate::InvalidationGate;
pub use renderer::PlotRenderer;
