//! The plot-model seam
//!
//! The plot model is an external, mutable object graph. This crate only
//! requires two passes from it: an update pass (recompute derived data) and
//! a draw pass (issue abstract drawing calls against a `DrawContext`). Both
//! run under the model's single lock, which is shared process-wide: any
//! bookkeeping outside this subsystem that touches the same model must go
//! through the same `PlotHandle`.

use std::sync::{Arc, Mutex, MutexGuard};

use egui::{Color32, Rect};

use crate::error::PlotError;
use crate::render::DrawContext;

/// A renderable, updatable plot model.
pub trait PlotModel: Send {
    /// Refresh the model's internal state.
    ///
    /// `update_data` distinguishes a full data refresh from a cheap
    /// layout-only update.
    fn update(&mut self, update_data: bool) -> Result<(), PlotError>;

    /// Issue the model's drawing calls for the given area.
    ///
    /// `area` is in picture-local coordinates with the origin at the
    /// top-left corner.
    fn render(&self, ctx: &mut dyn DrawContext, area: Rect) -> Result<(), PlotError>;

    /// Background fill painted before the draw pass, if any.
    fn background(&self) -> Option<Color32> {
        None
    }
}

/// Shared handle to a plot model and its process-wide lock.
///
/// Only one thread may be inside an update-or-render critical section for a
/// given model at any time; `lock` is the single entry point for that
/// critical section.
#[derive(Clone)]
pub struct PlotHandle {
    inner: Arc<Mutex<Box<dyn PlotModel>>>,
}

impl PlotHandle {
    pub fn new(model: impl PlotModel + 'static) -> Self {
        PlotHandle {
            inner: Arc::new(Mutex::new(Box::new(model))),
        }
    }

    /// Enter the model's update-or-render critical section.
    ///
    /// A poisoned lock is recovered rather than propagated: a panic in a
    /// previous pass has already been captured as the loop's terminal
    /// error, and a repaired model must be able to resume after re-attach.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn PlotModel>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run a closure inside the critical section.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut dyn PlotModel) -> R) -> R {
        let mut guard = self.lock();
        f(guard.as_mut())
    }
}

impl std::fmt::Debug for PlotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotHandle").finish_non_exhaustive()
    }
}
