//! Background render loop and lifecycle controller
//!
//! `PlotRenderer` owns the render-scheduling state shared between the UI
//! thread and the background loop: the invalidation gate, the capacity-1
//! start mutex, the cancellation scope, the published picture and the
//! captured terminal error. The loop itself is a supervised tokio task:
//! its outcome (cancelled or faulted) is recorded for the paint path, never
//! silently discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{RenderError, Result};
use crate::models::{LoopState, RenderSize, Severity};
use crate::options::RenderOptions;
use crate::picture::{Picture, PictureRecorder};
use crate::plot::PlotHandle;
use crate::render::context::RenderContext;
use crate::render::gate::InvalidationGate;

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lifecycle bookkeeping for the currently active loop scope.
struct LifecycleState {
    state: LoopState,
    cancel: Option<watch::Sender<bool>>,
    /// Bumped on every attach; a draining loop from an older scope must not
    /// overwrite the state of the scope that replaced it.
    epoch: u64,
}

impl LifecycleState {
    fn transition(&mut self, next: LoopState) {
        if !self.state.can_transition_to(next) {
            log::warn!(
                "invalid loop state transition: {} -> {}",
                self.state.as_str(),
                next.as_str()
            );
        }
        self.state = next;
    }
}

/// State shared between the UI thread, the loop task and blocking passes.
struct RendererInner {
    gate: InvalidationGate,
    /// Capacity-1 start mutex; holding it is the proof that a loop body is
    /// active, and acquiring it in `dispose` is the proof that none is.
    loop_mutex: AsyncMutex<()>,
    lifecycle: StdMutex<LifecycleState>,
    render_size: StdMutex<RenderSize>,
    model: StdMutex<Option<PlotHandle>>,
    picture: ArcSwapOption<Picture>,
    revision: AtomicU64,
    error: StdMutex<Option<RenderError>>,
    repaint_ctx: StdMutex<Option<egui::Context>>,
    options: RenderOptions,
}

impl RendererInner {
    /// Hand the finished picture to the display surface and ask the UI
    /// thread to repaint. The previous picture is released by reference
    /// count once the last in-flight paint drops its clone.
    fn publish(&self, picture: Picture) {
        self.picture.store(Some(Arc::new(picture)));
        self.revision.fetch_add(1, Ordering::AcqRel);
        self.request_repaint();
    }

    /// Ask the host to schedule a repaint. Safe from any thread; egui
    /// marshals the request internally.
    fn request_repaint(&self) {
        if let Some(ctx) = lock(&self.repaint_ctx).as_ref() {
            ctx.request_repaint();
        }
    }
}

/// Render loop plus lifecycle controller for one display surface.
pub struct PlotRenderer {
    inner: Arc<RendererInner>,
}

impl PlotRenderer {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        PlotRenderer {
            inner: Arc::new(RendererInner {
                gate: InvalidationGate::new(),
                loop_mutex: AsyncMutex::new(()),
                lifecycle: StdMutex::new(LifecycleState {
                    state: LoopState::NotStarted,
                    cancel: None,
                    epoch: 0,
                }),
                render_size: StdMutex::new(RenderSize::default()),
                model: StdMutex::new(None),
                picture: ArcSwapOption::const_empty(),
                revision: AtomicU64::new(0),
                error: StdMutex::new(None),
                repaint_ctx: StdMutex::new(None),
                options,
            }),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.inner.options
    }

    /// Notify the renderer that a re-render of at least `severity` is
    /// needed. Never blocks; callable from any thread. While a terminal
    /// error is captured the signal is accepted but has no effect until
    /// the next attach.
    pub fn request_render(&self, severity: Severity) {
        self.inner.gate.signal(severity);
    }

    /// Signals not yet consumed by the loop.
    pub fn pending_invalidations(&self) -> usize {
        self.inner.gate.pending()
    }

    pub fn set_model(&self, model: PlotHandle) {
        *lock(&self.inner.model) = Some(model);
    }

    pub fn clear_model(&self) {
        *lock(&self.inner.model) = None;
    }

    pub fn model(&self) -> Option<PlotHandle> {
        lock(&self.inner.model).clone()
    }

    /// Record the target render size written by layout. Returns whether the
    /// size actually changed.
    pub fn set_render_size(&self, size: RenderSize) -> bool {
        let mut current = lock(&self.inner.render_size);
        if *current == size {
            return false;
        }
        *current = size;
        true
    }

    pub fn render_size(&self) -> RenderSize {
        *lock(&self.inner.render_size)
    }

    /// Bind the egui context used for cross-thread repaint requests.
    pub fn set_repaint_context(&self, ctx: egui::Context) {
        *lock(&self.inner.repaint_ctx) = Some(ctx);
    }

    /// The latest published picture, if any.
    pub fn current_picture(&self) -> Option<Arc<Picture>> {
        self.inner.picture.load_full()
    }

    /// Number of pictures published since creation.
    pub fn picture_revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// The loop's captured terminal error, if it faulted.
    pub fn terminal_error(&self) -> Option<RenderError> {
        lock(&self.inner.error).clone()
    }

    pub fn loop_state(&self) -> LoopState {
        lock(&self.inner.lifecycle).state
    }

    /// Start the render loop for this surface.
    ///
    /// Idempotent: a call while a scope is already running is a no-op. The
    /// cancellation scope is created synchronously, so a detach racing the
    /// spawned task is still observed before the first wait. The loop body
    /// queues on the start mutex until any previous body has fully exited.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_attach(&self) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("on_attach called outside a tokio runtime; render loop not started");
                return;
            }
        };

        let (epoch, cancel_rx) = {
            let mut lc = lock(&self.inner.lifecycle);
            if lc.state == LoopState::Running {
                log::debug!("attach ignored: render loop already running");
                return;
            }
            let (cancel_tx, cancel_rx) = watch::channel(false);
            lc.cancel = Some(cancel_tx);
            lc.epoch += 1;
            lc.transition(LoopState::Running);
            (lc.epoch, cancel_rx)
        };

        log::debug!("starting render loop (epoch {})", epoch);
        let inner = self.inner.clone();
        runtime.spawn(run_render_loop(inner, cancel_rx, epoch));
    }

    /// Request cancellation of the active loop scope. Does not block; the
    /// loop observes the request at its next checkpoint.
    pub fn on_detach(&self) {
        let mut lc = lock(&self.inner.lifecycle);
        if let Some(cancel) = lc.cancel.as_ref() {
            let _ = cancel.send(true);
        }
        if lc.state == LoopState::Running {
            lc.transition(LoopState::Stopping);
        }
        log::debug!("detach requested (epoch {})", lc.epoch);
    }

    /// Cancel the loop and wait until its body has fully exited.
    ///
    /// Safe to call multiple times; after it returns, no render cycle will
    /// start until the next `on_attach`.
    pub async fn dispose(&self) {
        self.on_detach();

        // The start mutex becoming available is the proof that the loop
        // body has terminated.
        let _proof = self.inner.loop_mutex.lock().await;

        let mut lc = lock(&self.inner.lifecycle);
        if matches!(lc.state, LoopState::Running | LoopState::Stopping) {
            lc.transition(LoopState::Stopped);
        }
        lc.cancel = None;
        log::debug!("renderer disposed");
    }
}

impl Default for PlotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Supervised loop task: runs the cycles, records the terminal outcome, and
/// marks its scope stopped unless a newer attach already replaced it.
async fn run_render_loop(
    inner: Arc<RendererInner>,
    mut cancel_rx: watch::Receiver<bool>,
    epoch: u64,
) {
    let _active = inner.loop_mutex.lock().await;

    // The captured error belongs to the scope this one replaces.
    *lock(&inner.error) = None;

    log::debug!("render loop running (epoch {})", epoch);
    let outcome = render_cycles(&inner, &mut cancel_rx).await;

    match outcome {
        Ok(()) => {}
        Err(RenderError::Cancelled) => {
            log::debug!("render loop cancelled (epoch {})", epoch);
        }
        Err(err) => {
            log::warn!("render loop faulted: {}", err);
            *lock(&inner.error) = Some(err);
            // Repaint now so the diagnostic replaces the stale picture.
            inner.request_repaint();
        }
    }

    let mut lc = lock(&inner.lifecycle);
    if lc.epoch == epoch && lc.state != LoopState::Stopped {
        lc.transition(LoopState::Stopped);
    }
}

/// Run render cycles until cancellation or a model fault.
///
/// Cycles are strictly sequential: the next wait does not begin until the
/// previous publish completed, so passes for one model are never
/// interleaved or reordered.
async fn render_cycles(
    inner: &Arc<RendererInner>,
    cancel_rx: &mut watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let severity = inner.gate.wait_and_drain(cancel_rx).await?;

        let size = *lock(&inner.render_size);
        if !size.is_drawable() {
            log::debug!(
                "skipping render pass: degenerate size {}x{}",
                size.width,
                size.height
            );
            continue;
        }
        let model = match lock(&inner.model).clone() {
            Some(model) => model,
            None => continue,
        };
        if !severity.needs_render() {
            continue;
        }

        // Update and draw may be CPU-intensive; keep them off the async
        // workers.
        let cancel_probe = cancel_rx.clone();
        let background = inner.options.background;
        let update_data = severity.needs_data_update();
        let pass = tokio::task::spawn_blocking(move || {
            render_pass(&model, size, update_data, background, &cancel_probe)
        })
        .await
        .map_err(|join| {
            if join.is_cancelled() {
                RenderError::Cancelled
            } else {
                RenderError::ModelFault(format!("update/draw pass panicked: {}", join))
            }
        })?;

        let picture = pass?;
        inner.publish(picture);
    }
}

/// One update-and-draw critical section.
///
/// The model lock is held across the update pass, the draw pass and the
/// finalization of the recording session: the picture must capture a single
/// consistent model state.
fn render_pass(
    model: &PlotHandle,
    size: RenderSize,
    update_data: bool,
    fallback_background: Option<egui::Color32>,
    cancel: &watch::Receiver<bool>,
) -> Result<Picture> {
    let mut guard = model.lock();
    guard.update(update_data)?;

    // Cancellation checkpoint: past this point the pass runs to completion,
    // so the recording session is never abandoned half-written.
    if *cancel.borrow() {
        return Err(RenderError::Cancelled);
    }

    let mut recorder = PictureRecorder::begin(size);
    if let Some(background) = guard.background().or(fallback_background) {
        recorder.clear(background);
    }
    {
        let mut ctx = RenderContext::bind(&mut recorder);
        guard.render(&mut ctx, size.as_rect())?;
    }
    Ok(recorder.finish())
}
