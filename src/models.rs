//! Core data structures for render scheduling
//!
//! **Architecture**:
//! - `Severity`: how much work an invalidation requires
//! - `RenderSize`: target dimensions sampled at the start of each pass
//! - `LoopState`: discrete liveness states of the render-loop task
//!
//! State transitions are managed by the lifecycle controller in
//! `render::renderer`; this module provides the data structures.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// How much work an invalidation requires.
///
/// Severities combine monotonically: when several signals coalesce into one
/// wake-up, the consumer observes the maximum severity among them, never a
/// downgraded one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Severity {
    /// Nothing to do; a wake-up carrying this severity is a no-op.
    #[default]
    None = 0,

    /// The displayed picture is stale but the model data is current.
    RedrawOnly = 1,

    /// The model data must be refreshed before drawing.
    RedrawAndUpdateData = 2,
}

impl Severity {
    /// Combine two severities, keeping the stronger request.
    pub fn combine(self, other: Severity) -> Severity {
        self.max(other)
    }

    /// Whether this severity requires a render pass at all.
    pub fn needs_render(&self) -> bool {
        *self >= Severity::RedrawOnly
    }

    /// Whether the model's data-update pass must run before drawing.
    pub fn needs_data_update(&self) -> bool {
        *self == Severity::RedrawAndUpdateData
    }

    /// Severity for an `invalidate_plot(update_data)` request.
    pub fn from_update_flag(update_data: bool) -> Severity {
        if update_data {
            Severity::RedrawAndUpdateData
        } else {
            Severity::RedrawOnly
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Severity {
        match raw {
            0 => Severity::None,
            1 => Severity::RedrawOnly,
            _ => Severity::RedrawAndUpdateData,
        }
    }
}

/// Width/height pair sampled at the start of each render pass.
///
/// A pass with a non-positive dimension is skipped: no picture is produced
/// and no error is raised.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderSize {
    pub width: f32,
    pub height: f32,
}

impl RenderSize {
    pub fn new(width: f32, height: f32) -> Self {
        RenderSize { width, height }
    }

    /// Whether both dimensions are positive.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// The drawing area in picture-local coordinates (origin at top-left).
    pub fn as_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(self.width, self.height))
    }
}

impl From<Vec2> for RenderSize {
    fn from(v: Vec2) -> Self {
        RenderSize::new(v.x, v.y)
    }
}

/// Liveness states of the render-loop task.
///
/// Exactly one loop body may be active per display surface; the lifecycle
/// controller transitions between these states on attach, detach and
/// disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopState {
    /// No loop has been started for this surface yet.
    NotStarted,

    /// A loop scope is active (the body may still be queued on the start
    /// mutex behind a draining predecessor).
    Running,

    /// Cancellation requested; the body is draining towards exit.
    Stopping,

    /// The loop body has fully exited.
    Stopped,
}

impl LoopState {
    /// Get the human-readable name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::NotStarted => "not started",
            LoopState::Running => "running",
            LoopState::Stopping => "stopping",
            LoopState::Stopped => "stopped",
        }
    }

    /// Get all valid state transitions FROM this state.
    pub fn valid_next_states(&self) -> Vec<LoopState> {
        match self {
            LoopState::NotStarted => vec![LoopState::Running],
            LoopState::Running => vec![LoopState::Stopping, LoopState::Stopped],
            // A re-attach may start a fresh scope while the old body drains.
            LoopState::Stopping => vec![LoopState::Stopped, LoopState::Running],
            LoopState::Stopped => vec![LoopState::Running],
        }
    }

    /// Check if a transition to the given state is valid.
    pub fn can_transition_to(&self, next: LoopState) -> bool {
        self.valid_next_states().contains(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_combine_keeps_maximum() {
        assert_eq!(
            Severity::RedrawOnly.combine(Severity::RedrawAndUpdateData),
            Severity::RedrawAndUpdateData
        );
        assert_eq!(
            Severity::RedrawAndUpdateData.combine(Severity::None),
            Severity::RedrawAndUpdateData
        );
        assert_eq!(Severity::None.combine(Severity::None), Severity::None);
    }

    #[test]
    fn test_severity_flags() {
        assert!(!Severity::None.needs_render());
        assert!(Severity::RedrawOnly.needs_render());
        assert!(!Severity::RedrawOnly.needs_data_update());
        assert!(Severity::RedrawAndUpdateData.needs_data_update());
    }

    #[test]
    fn test_severity_from_update_flag() {
        assert_eq!(Severity::from_update_flag(true), Severity::RedrawAndUpdateData);
        assert_eq!(Severity::from_update_flag(false), Severity::RedrawOnly);
    }

    #[test]
    fn test_severity_u8_round_trip() {
        for severity in [
            Severity::None,
            Severity::RedrawOnly,
            Severity::RedrawAndUpdateData,
        ] {
            assert_eq!(Severity::from_u8(severity as u8), severity);
        }
    }

    #[test]
    fn test_render_size_drawable() {
        assert!(RenderSize::new(640.0, 480.0).is_drawable());
        assert!(!RenderSize::new(0.0, 480.0).is_drawable());
        assert!(!RenderSize::new(640.0, -1.0).is_drawable());
        assert!(!RenderSize::default().is_drawable());
    }

    #[test]
    fn test_render_size_as_rect() {
        let rect = RenderSize::new(100.0, 50.0).as_rect();
        assert_eq!(rect.min, Pos2::ZERO);
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn test_loop_state_transitions() {
        assert!(LoopState::NotStarted.can_transition_to(LoopState::Running));
        assert!(LoopState::Running.can_transition_to(LoopState::Stopping));
        assert!(LoopState::Stopping.can_transition_to(LoopState::Stopped));
        assert!(LoopState::Stopped.can_transition_to(LoopState::Running));
        assert!(!LoopState::NotStarted.can_transition_to(LoopState::Stopped));
        assert!(!LoopState::Stopped.can_transition_to(LoopState::Stopping));
    }
}
