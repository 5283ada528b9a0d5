//! Coalescing invalidation gate
//!
//! A counting signal that collapses any number of "something changed"
//! notifications arriving between two consumptions into a single wake-up,
//! while tracking the strongest severity requested since the last
//! consumption. A GUI mutation storm must not spawn one render pass per
//! mutation; the gate guarantees at most one render per quiet period, and
//! the max-combined severity guarantees a data-update request is never
//! silently downgraded by a concurrent redraw-only request.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::watch;
use tokio::sync::Semaphore;

use crate::error::{RenderError, Result};
use crate::models::Severity;

/// Coalescing invalidation signal shared between the UI thread and the
/// render loop.
///
/// Pending-count only grows via `signal` and only shrinks via
/// `wait_and_drain`; severity is the maximum requested since the last
/// drain.
#[derive(Debug)]
pub struct InvalidationGate {
    pending: Semaphore,
    severity: AtomicU8,
}

impl InvalidationGate {
    pub fn new() -> Self {
        InvalidationGate {
            pending: Semaphore::new(0),
            severity: AtomicU8::new(Severity::None as u8),
        }
    }

    /// Record that a render of at least `severity` is needed.
    ///
    /// Never blocks; callable from any thread, any number of times
    /// concurrently. The severity is published before the permit so a
    /// consumer woken by this signal observes at least this severity.
    pub fn signal(&self, severity: Severity) {
        self.severity.fetch_max(severity as u8, Ordering::AcqRel);
        self.pending.add_permits(1);
    }

    /// Number of signals not yet consumed by a drain.
    pub fn pending(&self) -> usize {
        self.pending.available_permits()
    }

    /// Suspend until at least one signal is pending, then drain all
    /// currently pending signals and return the strongest severity seen
    /// across them.
    ///
    /// Cancellation observed while suspended (or already requested on
    /// entry) yields `RenderError::Cancelled`; a closed cancellation
    /// channel counts as cancellation, since the owning scope is gone.
    pub async fn wait_and_drain(&self, cancel: &mut watch::Receiver<bool>) -> Result<Severity> {
        if *cancel.borrow() {
            return Err(RenderError::Cancelled);
        }

        loop {
            tokio::select! {
                permit = self.pending.acquire() => {
                    match permit {
                        Ok(permit) => {
                            permit.forget();
                            break;
                        }
                        Err(_) => return Err(RenderError::Cancelled),
                    }
                }
                changed = cancel.changed() => {
                    match changed {
                        Ok(()) if *cancel.borrow() => return Err(RenderError::Cancelled),
                        Ok(()) => continue,
                        Err(_) => return Err(RenderError::Cancelled),
                    }
                }
            }
        }

        // Collapse the burst: consume every signal that arrived up to now.
        while let Ok(permit) = self.pending.try_acquire() {
            permit.forget();
        }

        // A signal racing this drain may leave a permit whose severity was
        // already consumed here; the resulting wake-up carries `None` and
        // the loop treats it as a no-op.
        let drained = self.severity.swap(Severity::None as u8, Ordering::AcqRel);
        Ok(Severity::from_u8(drained))
    }
}

impl Default for InvalidationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn cancel_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn test_burst_collapses_into_one_wakeup() {
        let gate = InvalidationGate::new();
        let (_tx, mut cancel) = cancel_channel();

        gate.signal(Severity::RedrawOnly);
        gate.signal(Severity::RedrawAndUpdateData);
        gate.signal(Severity::RedrawOnly);
        assert_eq!(gate.pending(), 3);

        let severity = gate.wait_and_drain(&mut cancel).await.unwrap();
        assert_eq!(severity, Severity::RedrawAndUpdateData);
        assert_eq!(gate.pending(), 0);

        // A second drain must block: the burst was fully consumed.
        let second = tokio::time::timeout(
            Duration::from_millis(50),
            gate.wait_and_drain(&mut cancel),
        )
        .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_severity_resets_after_drain() {
        let gate = InvalidationGate::new();
        let (_tx, mut cancel) = cancel_channel();

        gate.signal(Severity::RedrawAndUpdateData);
        assert_eq!(
            gate.wait_and_drain(&mut cancel).await.unwrap(),
            Severity::RedrawAndUpdateData
        );

        gate.signal(Severity::RedrawOnly);
        assert_eq!(
            gate.wait_and_drain(&mut cancel).await.unwrap(),
            Severity::RedrawOnly
        );
    }

    #[tokio::test]
    async fn test_cancel_while_suspended() {
        let gate = Arc::new(InvalidationGate::new());
        let (tx, mut cancel) = cancel_channel();

        let waiting = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_and_drain(&mut cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        let outcome = waiting.await.unwrap();
        assert!(matches!(outcome, Err(RenderError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_already_requested_on_entry() {
        let gate = InvalidationGate::new();
        let (tx, mut cancel) = cancel_channel();
        tx.send(true).unwrap();

        gate.signal(Severity::RedrawOnly);
        let outcome = gate.wait_and_drain(&mut cancel).await;
        assert!(matches!(outcome, Err(RenderError::Cancelled)));
        // The pending signal is left untouched for a future consumer.
        assert_eq!(gate.pending(), 1);
    }

    #[tokio::test]
    async fn test_dropped_cancel_scope_counts_as_cancelled() {
        let gate = InvalidationGate::new();
        let (tx, mut cancel) = cancel_channel();
        drop(tx);

        let outcome = gate.wait_and_drain(&mut cancel).await;
        assert!(matches!(outcome, Err(RenderError::Cancelled)));
    }

    #[tokio::test]
    async fn test_signals_from_many_tasks_coalesce() {
        let gate = Arc::new(InvalidationGate::new());
        let (_tx, mut cancel) = cancel_channel();

        let mut senders = Vec::new();
        for i in 0..32 {
            let gate = gate.clone();
            senders.push(tokio::spawn(async move {
                let severity = if i == 17 {
                    Severity::RedrawAndUpdateData
                } else {
                    Severity::RedrawOnly
                };
                gate.signal(severity);
            }));
        }
        for sender in senders {
            sender.await.unwrap();
        }

        assert_eq!(gate.pending(), 32);
        let severity = gate.wait_and_drain(&mut cancel).await.unwrap();
        assert_eq!(severity, Severity::RedrawAndUpdateData);
        assert_eq!(gate.pending(), 0);
    }
}
