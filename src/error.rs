//! Unified error type hierarchy for PlotView
//!
//! Provides structured error handling with PlotError (faults raised inside a
//! model's update or draw pass) and RenderError (the render loop's terminal
//! outcome taxonomy).

use thiserror::Error;

/// Faults raised by a plot model during its update or draw pass.
#[derive(Error, Debug, Clone)]
pub enum PlotError {
    #[error("update pass failed: {0}")]
    UpdateFailed(String),

    #[error("draw pass failed: {0}")]
    DrawFailed(String),

    #[error("invalid plot data: {0}")]
    InvalidData(String),
}

/// Terminal outcome taxonomy for the render loop.
///
/// `Cancelled` is the expected shutdown path and is never surfaced to the
/// user. `ModelFault` is captured as the loop's terminal error and painted
/// diagnostically by the display surface; it is never retried automatically,
/// because a malformed model is assumed to fail the same way again. Recovery
/// requires an explicit re-attach, which clears the captured error.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// Cancellation observed while waiting on the gate or mid-cycle.
    #[error("render loop cancelled")]
    Cancelled,

    /// Exception raised inside the model's update/draw critical section.
    #[error("plot model fault: {0}")]
    ModelFault(String),
}

impl RenderError {
    /// Get a user-facing message suitable for the diagnostic paint path.
    pub fn user_message(&self) -> String {
        match self {
            RenderError::Cancelled => "Rendering stopped".to_string(),
            RenderError::ModelFault(msg) => format!("Plot rendering failed: {}", msg),
        }
    }

    /// Whether this outcome is the clean cancellation path.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderError::Cancelled)
    }
}

impl From<PlotError> for RenderError {
    fn from(e: PlotError) -> Self {
        RenderError::ModelFault(e.to_string())
    }
}

/// Top-level result type for render-scheduling operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_error_display() {
        let err = PlotError::UpdateFailed("series length mismatch".to_string());
        assert_eq!(err.to_string(), "update pass failed: series length mismatch");
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::ModelFault("NaN in axis range".to_string());
        assert_eq!(err.to_string(), "plot model fault: NaN in axis range");
    }

    #[test]
    fn test_cancelled_is_not_a_user_fault() {
        assert!(RenderError::Cancelled.is_cancelled());
        assert!(!RenderError::ModelFault("x".into()).is_cancelled());
    }

    #[test]
    fn test_plot_error_converts_to_model_fault() {
        let err: RenderError = PlotError::DrawFailed("bad geometry".to_string()).into();
        assert!(matches!(err, RenderError::ModelFault(_)));
        assert!(err.user_message().contains("bad geometry"));
    }
}
