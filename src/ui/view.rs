//! The visible plot control
//!
//! `PlotView` is the UI-thread half of the surface: it writes the target
//! render size from layout, paints the latest published picture, and shows
//! the diagnostic text when the render loop has faulted. Paint never
//! touches the plot model; the picture is the only thing crossing from the
//! background loop to the paint pass.

use egui::{Align2, FontId, Sense};

use crate::models::{LoopState, RenderSize, Severity};
use crate::options::RenderOptions;
use crate::plot::PlotHandle;
use crate::render::PlotRenderer;

/// Background-rendered plot widget.
pub struct PlotView {
    renderer: PlotRenderer,
}

impl PlotView {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        PlotView {
            renderer: PlotRenderer::with_options(options),
        }
    }

    /// Access the render-scheduling half of the surface.
    pub fn renderer(&self) -> &PlotRenderer {
        &self.renderer
    }

    /// Replace the displayed model and request a full refresh.
    pub fn set_model(&self, model: PlotHandle) {
        self.renderer.set_model(model);
        self.invalidate_plot(true);
    }

    pub fn clear_model(&self) {
        self.renderer.clear_model();
    }

    /// Notify the view that the plot is stale.
    ///
    /// `update_data` requests the model's data-update pass in addition to
    /// the redraw. Rendering happens on the background loop as necessary;
    /// bursts of invalidations coalesce into a single pass.
    pub fn invalidate_plot(&self, update_data: bool) {
        self.renderer
            .request_render(Severity::from_update_flag(update_data));
    }

    /// Start the render loop (called automatically on first `show` when
    /// `auto_attach` is set).
    pub fn on_attach(&self) {
        self.renderer.on_attach();
    }

    /// Stop the render loop without blocking.
    pub fn on_detach(&self) {
        self.renderer.on_detach();
    }

    /// Stop the render loop and wait for it to exit.
    pub async fn dispose(&self) {
        self.renderer.dispose().await;
    }

    /// Lay out and paint the plot into the available space.
    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
        let rect = response.rect;

        self.renderer.set_repaint_context(ui.ctx().clone());

        // Only a fresh surface auto-attaches; recovery from a fault stays
        // an explicit re-attach.
        if self.renderer.options().auto_attach
            && self.renderer.loop_state() == LoopState::NotStarted
        {
            self.renderer.on_attach();
        }

        let size = RenderSize::new(rect.width(), rect.height());
        if self.renderer.set_render_size(size) {
            self.renderer.request_render(Severity::RedrawOnly);
        }

        if let Some(error) = self.renderer.terminal_error() {
            let options = self.renderer.options();
            painter.text(
                rect.min + options.error_text_offset,
                Align2::LEFT_TOP,
                error.user_message(),
                FontId::proportional(options.error_text_size),
                options.error_text_color,
            );
        } else if let Some(picture) = self.renderer.current_picture() {
            picture.replay(&painter, rect.min.to_vec2());
        }

        response
    }
}

impl Default for PlotView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use crate::plot::PlotModel;
    use crate::render::DrawContext;
    use egui::{Pos2, Rect, Shape, Vec2};
    use std::time::Duration;

    struct FailingModel;

    impl PlotModel for FailingModel {
        fn update(&mut self, _update_data: bool) -> Result<(), PlotError> {
            Err(PlotError::UpdateFailed("broken series".to_string()))
        }

        fn render(&self, _ctx: &mut dyn DrawContext, _area: Rect) -> Result<(), PlotError> {
            Ok(())
        }
    }

    fn run_frame(ctx: &egui::Context, view: &PlotView) -> egui::FullOutput {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0))),
            ..Default::default()
        };
        ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                view.show(ui);
            });
        })
    }

    #[tokio::test]
    async fn test_show_samples_size_and_auto_attaches() {
        let view = PlotView::new();
        let ctx = egui::Context::default();

        let _ = run_frame(&ctx, &view);

        assert!(view.renderer().render_size().is_drawable());
        assert_eq!(view.renderer().loop_state(), LoopState::Running);

        view.dispose().await;
    }

    #[tokio::test]
    async fn test_explicit_attach_when_auto_attach_disabled() {
        let mut options = RenderOptions::default();
        options.auto_attach = false;
        let view = PlotView::with_options(options);
        let ctx = egui::Context::default();

        let _ = run_frame(&ctx, &view);
        assert_eq!(view.renderer().loop_state(), LoopState::NotStarted);

        view.on_attach();
        assert_eq!(view.renderer().loop_state(), LoopState::Running);

        view.dispose().await;
    }

    #[tokio::test]
    async fn test_faulted_surface_paints_diagnostic_text() {
        let view = PlotView::new();
        view.set_model(PlotHandle::new(FailingModel));
        let ctx = egui::Context::default();

        // First frame attaches; the queued invalidation then faults the loop.
        let _ = run_frame(&ctx, &view);
        for _ in 0..200 {
            if view.renderer().terminal_error().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(view.renderer().terminal_error().is_some());
        assert_eq!(view.renderer().picture_revision(), 0);

        let output = run_frame(&ctx, &view);
        let has_text = output
            .shapes
            .iter()
            .any(|clipped| matches!(clipped.shape, Shape::Text(_)));
        assert!(has_text, "diagnostic text must be painted after a fault");

        view.dispose().await;
    }
}
