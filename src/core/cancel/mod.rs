//! # Cancellation Module
//!
//! Cooperative early termination of a pipeline run.
//!
//! A [`CancellationToken`] is cloned into every stage of a run. Once
//! signalled, workers stop claiming new items (finishing the item they
//! are on) and unwind; channel disconnection then propagates the
//! shutdown to any stage blocked on a send. The run surfaces
//! [`StageError::Cancelled`](crate::error::StageError::Cancelled) to the
//! caller instead of a result.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

/// Signals all clones of itself that the run should stop.
///
/// Signalling works by dropping the single shared sender of an otherwise
/// silent channel: every clone's receiver observes the disconnect, which
/// makes cancellation a level-triggered, wait-free check and also lets
/// blocked receive loops wake up via `select`.
#[derive(Clone)]
pub struct CancellationToken {
    guard: Arc<Mutex<Option<Sender<()>>>>,
    watch: Receiver<()>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        let (sender, watch) = bounded(1);
        Self {
            guard: Arc::new(Mutex::new(Some(sender))),
            watch,
        }
    }

    /// Signal cancellation. Idempotent; affects all clones.
    pub fn cancel(&self) {
        if let Ok(mut guard) = self.guard.lock() {
            guard.take();
        }
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.watch.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Receiver that disconnects when the token is cancelled; used to
    /// wake blocked receive loops.
    pub(crate) fn watch(&self) -> &Receiver<()> {
        &self.watch
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
