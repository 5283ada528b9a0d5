use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eframe::egui;

use plotview::ui::demo::{examples, Example, PhaseHandle};
use plotview::{LoopState, PlotHandle, PlotView};

/// Demo application: one background-rendered plot plus controls that
/// exercise the invalidation, fault and lifecycle paths.
struct DemoApp {
    view: PlotView,
    examples: Vec<Example>,
    selected: usize,
    phase: PhaseHandle,
    fault_flag: Arc<AtomicBool>,
    animate: bool,
    elapsed: f32,
}

impl DemoApp {
    fn new() -> Self {
        let examples = examples();
        let view = PlotView::new();
        let (phase, fault_flag) = Self::load_example(&view, &examples[0]);
        DemoApp {
            view,
            examples,
            selected: 0,
            phase,
            fault_flag,
            animate: true,
            elapsed: 0.0,
        }
    }

    fn load_example(view: &PlotView, example: &Example) -> (PhaseHandle, Arc<AtomicBool>) {
        let plot = example.instantiate();
        let phase = plot.phase_handle();
        let fault_flag = plot.fault_flag();
        view.set_model(PlotHandle::new(plot));
        (phase, fault_flag)
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Examples");
        let mut switched = None;
        for (index, example) in self.examples.iter().enumerate() {
            if ui
                .selectable_label(self.selected == index, example.name)
                .clicked()
            {
                switched = Some(index);
            }
        }
        if let Some(index) = switched {
            self.selected = index;
            let (phase, fault_flag) = Self::load_example(&self.view, &self.examples[index]);
            self.phase = phase;
            self.fault_flag = fault_flag;
        }

        ui.separator();
        ui.checkbox(&mut self.animate, "Animate");

        if ui.button("Invalidate (redraw only)").clicked() {
            self.view.invalidate_plot(false);
        }
        if ui.button("Invalidate (update data)").clicked() {
            self.view.invalidate_plot(true);
        }
        if ui.button("Signal storm (x500)").clicked() {
            for _ in 0..500 {
                self.view.invalidate_plot(true);
            }
        }

        ui.separator();
        if ui.button("Inject fault").clicked() {
            self.fault_flag.store(true, Ordering::SeqCst);
            self.view.invalidate_plot(true);
        }
        if ui.button("Re-attach (recover)").clicked() {
            self.fault_flag.store(false, Ordering::SeqCst);
            self.view.on_attach();
            self.view.invalidate_plot(true);
        }

        ui.separator();
        let renderer = self.view.renderer();
        ui.label(format!("Loop state: {}", renderer.loop_state().as_str()));
        ui.label(format!("Pictures published: {}", renderer.picture_revision()));
        ui.label(format!(
            "Pending invalidations: {}",
            renderer.pending_invalidations()
        ));
        if let Some(error) = renderer.terminal_error() {
            ui.colored_label(egui::Color32::RED, error.user_message());
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.animate && self.view.renderer().loop_state() == LoopState::Running {
            self.elapsed += ctx.input(|i| i.stable_dt).min(0.1);
            self.phase.set(self.elapsed * 1.5);
            self.view.invalidate_plot(true);
            ctx.request_repaint();
        }

        egui::SidePanel::left("controls")
            .default_width(220.0)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // The process is going away; a non-blocking cancel is enough.
        self.view.on_detach();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plotview::initialize_logging();
    log::info!("PlotView demo starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 700.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PlotView Demo",
        options,
        Box::new(move |_cc| Box::new(DemoApp::new())),
    )
    .map_err(|e| anyhow::anyhow!("failed to launch demo: {e}"))?;

    log::info!("PlotView demo shutting down");
    Ok(())
}
