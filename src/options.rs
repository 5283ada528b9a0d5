//! Render configuration
//!
//! Options controlling the display surface and the diagnostic paint path.
//! Serializable so host applications can persist them alongside their own
//! settings.

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

/// Configuration for a `PlotView` and its renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Start the render loop on the first `show` call instead of requiring
    /// an explicit `on_attach`.
    pub auto_attach: bool,

    /// Fallback fill used when the model reports no background of its own.
    pub background: Option<Color32>,

    /// Font size of the diagnostic error text.
    pub error_text_size: f32,

    /// Color of the diagnostic error text.
    pub error_text_color: Color32,

    /// Offset of the diagnostic error text from the widget's top-left corner.
    pub error_text_offset: Vec2,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            auto_attach: true,
            background: None,
            error_text_size: 10.0,
            error_text_color: Color32::BLACK,
            error_text_offset: Vec2::new(20.0, 20.0),
        }
    }
}

impl RenderOptions {
    /// Deserialize options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize options to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
