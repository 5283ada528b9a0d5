//! Immutable draw-command recordings
//!
//! A `PictureRecorder` captures the draw commands of exactly one recording
//! session; `finish` seals them into a `Picture`, an immutable, replayable
//! snapshot that the UI thread can paint any number of times without
//! recomputing the plot. Pictures are shared by reference count between the
//! producing render loop and the consuming display surface: the previous
//! picture is released once the last in-flight paint drops its clone.

use std::sync::Arc;

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::models::RenderSize;

/// A single recorded draw command in picture-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole picture area with a color.
    Clear(Color32),

    /// An open polyline through the given points.
    Line { points: Vec<Pos2>, stroke: Stroke },

    /// An axis-aligned rectangle with fill and outline.
    Rect {
        rect: Rect,
        fill: Color32,
        stroke: Stroke,
    },

    /// A circle with fill and outline.
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },

    /// A filled convex polygon with outline.
    Polygon {
        points: Vec<Pos2>,
        fill: Color32,
        stroke: Stroke,
    },

    /// Anchored text; layout happens at replay time on the UI thread.
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        size: f32,
        color: Color32,
    },

    /// Restrict subsequent commands to the given rectangle.
    PushClip(Rect),

    /// Restore the clip active before the matching `PushClip`.
    PopClip,
}

/// An immutable, replayable recording of draw commands.
#[derive(Debug, Clone)]
pub struct Picture {
    size: RenderSize,
    commands: Arc<[DrawCommand]>,
}

impl Picture {
    /// The size the picture was recorded at.
    pub fn size(&self) -> RenderSize {
        self.size
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Draw this picture into the current paint pass.
    ///
    /// `offset` translates picture-local coordinates into screen space
    /// (typically the widget rect's top-left corner).
    pub fn replay(&self, painter: &Painter, offset: Vec2) {
        let bounds = self.size.as_rect().translate(offset);
        // Clip stack: each PushClip derives a narrower painter, PopClip
        // returns to the enclosing one.
        let mut painters: Vec<Painter> = vec![painter.with_clip_rect(bounds)];

        for command in self.commands.iter() {
            let current = painters.last().expect("clip stack never empties");
            match command {
                DrawCommand::Clear(color) => {
                    current.add(Shape::rect_filled(bounds, 0.0, *color));
                }
                DrawCommand::Line { points, stroke } => {
                    let points = points.iter().map(|p| *p + offset).collect();
                    current.add(Shape::line(points, *stroke));
                }
                DrawCommand::Rect { rect, fill, stroke } => {
                    let rect = rect.translate(offset);
                    current.add(Shape::rect_filled(rect, 0.0, *fill));
                    current.add(Shape::rect_stroke(rect, 0.0, *stroke));
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    let center = *center + offset;
                    current.add(Shape::circle_filled(center, *radius, *fill));
                    current.add(Shape::circle_stroke(center, *radius, *stroke));
                }
                DrawCommand::Polygon {
                    points,
                    fill,
                    stroke,
                } => {
                    let points = points.iter().map(|p| *p + offset).collect();
                    current.add(Shape::convex_polygon(points, *fill, *stroke));
                }
                DrawCommand::Text {
                    pos,
                    anchor,
                    text,
                    size,
                    color,
                } => {
                    current.text(
                        *pos + offset,
                        *anchor,
                        text.clone(),
                        FontId::proportional(*size),
                        *color,
                    );
                }
                DrawCommand::PushClip(rect) => {
                    let clip = rect.translate(offset).intersect(current.clip_rect());
                    painters.push(current.with_clip_rect(clip));
                }
                DrawCommand::PopClip => {
                    if painters.len() > 1 {
                        painters.pop();
                    }
                }
            }
        }
    }
}

/// The bounded interval between beginning and ending capture of draw
/// commands into one `Picture`.
#[derive(Debug)]
pub struct PictureRecorder {
    size: RenderSize,
    commands: Vec<DrawCommand>,
}

impl PictureRecorder {
    /// Begin a recording session at the given size.
    pub fn begin(size: RenderSize) -> Self {
        PictureRecorder {
            size,
            commands: Vec::new(),
        }
    }

    pub fn size(&self) -> RenderSize {
        self.size
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Fill the whole recording area, discarding commands recorded so far.
    pub fn clear(&mut self, color: Color32) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    pub(crate) fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// End the session and seal the recording into an immutable picture.
    pub fn finish(self) -> Picture {
        Picture {
            size: self.size,
            commands: self.commands.into(),
        }
    }
}
