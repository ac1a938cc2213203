//! # Stage Module
//!
//! The unit of pipeline work: consume items from an input stream, produce
//! items onto an output stream, stop when the input is exhausted.
//!
//! ## Stream termination
//! A stage signals end-of-stream by returning from [`Stage::run`], which
//! drops its [`StageOutput`] and closes the channel. The downstream
//! stage's read loop observes the close after all in-flight items have
//! been delivered. Closing is the only termination signal; a drained,
//! closed stream is normal loop exit, never an error.
//!
//! ## Typing
//! Each stage boundary is a strongly typed channel, so an item of the
//! wrong type cannot enter a stage in the first place - the runtime
//! type-mismatch failure mode is ruled out at compile time.
//!
//! ## Stages
//! - `two_part` - per-item two-part fingerprint, quota-gated slow half
//! - `multi_part` - per-item fixed-width fan-out fingerprint
//! - `aggregate` - terminal sort-and-join

mod aggregate;
mod multi_part;
mod two_part;

pub use aggregate::SortedJoin;
pub use multi_part::MultiPartDigest;
pub use two_part::TwoPartDigest;

use crate::core::cancel::CancellationToken;
use crate::error::StageError;
use crossbeam_channel::{Receiver, Sender};

/// Default worker-pool size for the item-level pools of both digest stages.
pub const DEFAULT_WORKERS: usize = 7;

/// Default number of sub-digests per item in the multi-part stage.
pub const DEFAULT_PARTS: usize = 6;

/// A pipeline stage.
///
/// `run` consumes the stage by value: a stage instance drives exactly one
/// run. Workers inside a stage share the input; the channel arbitrates so
/// each item is claimed by exactly one worker.
pub trait Stage {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Stable name used in thread names, errors and events.
    fn name(&self) -> &'static str;

    /// Process items until the input is exhausted.
    fn run(
        self,
        input: StageInput<Self::Input>,
        output: StageOutput<Self::Output>,
    ) -> Result<(), StageError>;
}

/// The consuming end of a stage boundary.
///
/// Clonable so a worker pool can share one input stream.
#[derive(Clone)]
pub struct StageInput<T> {
    receiver: Receiver<T>,
}

impl<T> StageInput<T> {
    pub(crate) fn new(receiver: Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Iterate over items until the upstream closes and the stream drains.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, T> {
        self.receiver.iter()
    }

    /// Claim the next item, or `None` once the stream is exhausted or the
    /// token is cancelled. Callers disambiguate the two via
    /// [`CancellationToken::is_cancelled`].
    pub fn recv(&self, cancel: &CancellationToken) -> Option<T> {
        if cancel.is_cancelled() {
            return None;
        }
        crossbeam_channel::select! {
            recv(self.receiver) -> msg => msg.ok(),
            recv(cancel.watch()) -> _ => None,
        }
    }
}

/// The producing end of a stage boundary.
///
/// Dropping the last clone closes the stream for the downstream stage.
#[derive(Clone)]
pub struct StageOutput<T> {
    stage: &'static str,
    sender: Sender<T>,
}

impl<T> StageOutput<T> {
    pub(crate) fn new(stage: &'static str, sender: Sender<T>) -> Self {
        Self { stage, sender }
    }

    /// Hand an item to the downstream stage, blocking until it is taken.
    pub fn send(&self, item: T) -> Result<(), StageError> {
        self.sender
            .send(item)
            .map_err(|_| StageError::OutputClosed { stage: self.stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    #[test]
    fn input_iteration_ends_when_sender_drops() {
        let (tx, rx) = bounded(0);
        let input = StageInput::new(rx);

        let producer = thread::spawn(move || {
            for i in 0..3 {
                tx.send(i).unwrap();
            }
            // tx dropped here: stream closes
        });

        let received: Vec<i32> = input.iter().collect();
        producer.join().unwrap();
        assert_eq!(received, vec![0, 1, 2]);
    }

    #[test]
    fn shared_input_delivers_each_item_once() {
        let (tx, rx) = bounded(0);
        let input = StageInput::new(rx);
        let second = input.clone();

        let producer = thread::spawn(move || {
            for i in 0..100 {
                tx.send(i).unwrap();
            }
        });

        let (a, b) = thread::scope(|scope| {
            let a = scope.spawn(|| input.iter().collect::<Vec<i32>>());
            let b = scope.spawn(|| second.iter().collect::<Vec<i32>>());
            (a.join().unwrap(), b.join().unwrap())
        });
        producer.join().unwrap();

        let mut all: Vec<i32> = a.into_iter().chain(b).collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<i32>>());
    }

    #[test]
    fn recv_returns_items_until_close() {
        let (tx, rx) = bounded(1);
        let input = StageInput::new(rx);
        let token = CancellationToken::new();

        tx.send(7).unwrap();
        drop(tx);

        assert_eq!(input.recv(&token), Some(7));
        assert_eq!(input.recv(&token), None);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn recv_ends_on_cancellation_even_while_blocked() {
        let (tx, rx) = bounded::<i32>(0);
        let input = StageInput::new(rx);
        let token = CancellationToken::new();
        let trigger = token.clone();

        let canceller = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(5));
            trigger.cancel();
        });

        // No sender ever delivers; only cancellation can end this call.
        assert_eq!(input.recv(&token), None);
        assert!(token.is_cancelled());
        canceller.join().unwrap();
        drop(tx);
    }

    #[test]
    fn send_after_receiver_drop_reports_closed_output() {
        let (tx, rx) = bounded::<u32>(0);
        drop(rx);

        let output = StageOutput::new("test-stage", tx);
        match output.send(1) {
            Err(StageError::OutputClosed { stage }) => assert_eq!(stage, "test-stage"),
            other => panic!("expected OutputClosed, got {other:?}"),
        }
    }
}
