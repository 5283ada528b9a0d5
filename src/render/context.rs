//! Render-context adapter
//!
//! Translates the abstract drawing calls issued by a plot model's draw pass
//! into recorded draw commands for exactly one recording session. The
//! adapter borrows its canvas for the session's duration, so it cannot
//! retain a reference once the session's picture is finalized.

use egui::{Align2, Color32, Pos2, Rect, Stroke};

use crate::picture::{DrawCommand, PictureRecorder};

/// Abstract drawing calls a plot model issues during its draw pass.
pub trait DrawContext {
    /// An open polyline through `points`.
    fn line(&mut self, points: &[Pos2], stroke: Stroke);

    /// An axis-aligned rectangle.
    fn rect(&mut self, rect: Rect, fill: Color32, stroke: Stroke);

    /// A circle centered at `center`.
    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke);

    /// A filled convex polygon.
    fn polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke);

    /// Anchored text.
    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);

    /// Restrict subsequent drawing to `rect` until the matching `pop_clip`.
    fn push_clip(&mut self, rect: Rect);

    /// Undo the innermost `push_clip`.
    fn pop_clip(&mut self);
}

/// Adapter binding a plot model's draw pass to one recording session.
///
/// Unbalanced clip pushes are closed when the adapter unbinds, so a model
/// that forgets a `pop_clip` cannot leak its clip into the error-diagnostic
/// or any later paint.
pub struct RenderContext<'a> {
    canvas: &'a mut PictureRecorder,
    clip_depth: usize,
}

impl<'a> RenderContext<'a> {
    /// Bind a fresh adapter to the session's canvas.
    pub fn bind(canvas: &'a mut PictureRecorder) -> Self {
        RenderContext {
            canvas,
            clip_depth: 0,
        }
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }
}

impl DrawContext for RenderContext<'_> {
    fn line(&mut self, points: &[Pos2], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.canvas.push(DrawCommand::Line {
            points: points.to_vec(),
            stroke,
        });
    }

    fn rect(&mut self, rect: Rect, fill: Color32, stroke: Stroke) {
        self.canvas.push(DrawCommand::Rect { rect, fill, stroke });
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        if radius <= 0.0 {
            return;
        }
        self.canvas.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke) {
        if points.len() < 3 {
            return;
        }
        self.canvas.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        if text.is_empty() {
            return;
        }
        self.canvas.push(DrawCommand::Text {
            pos,
            anchor,
            text: text.to_string(),
            size,
            color,
        });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.canvas.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without matching push_clip ignored");
            return;
        }
        self.clip_depth -= 1;
        self.canvas.push(DrawCommand::PopClip);
    }
}

impl Drop for RenderContext<'_> {
    fn drop(&mut self) {
        // Close clips the draw pass left open.
        while self.clip_depth > 0 {
            self.clip_depth -= 1;
            self.canvas.push(DrawCommand::PopClip);
        }
    }
}
