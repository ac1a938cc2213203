//! Stage 1: the two-part fingerprint.

use super::{Stage, StageInput, StageOutput, DEFAULT_WORKERS};
use crate::core::cancel::CancellationToken;
use crate::core::digest::Digester;
use crate::core::quota::Quota;
use crate::error::StageError;
use crate::events::{Event, EventSender, StageEvent, StageId, null_sender};
use std::sync::Arc;
use std::thread;

const STAGE_NAME: &str = "two-part-digest";

/// Converts each integer item into `fast(item) ~ fast(slow(item))`.
///
/// A pool of worker threads shares the input. For each item the worker
/// computes the `fast(item)` half in parallel (via [`rayon::join`]) with
/// the quota-gated chain `slow(item)` then `fast(slow(item))`. The two
/// halves always appear in that fixed order - left half from `fast`,
/// right half derived from `slow` - never in completion order. Downstream
/// consumers and the final fingerprint depend on that ordering.
///
/// The quota is held only around the `slow` call itself, never while
/// waiting on the other half.
pub struct TwoPartDigest {
    digester: Arc<dyn Digester>,
    quota: Quota,
    workers: usize,
    events: EventSender,
    cancel: CancellationToken,
}

impl TwoPartDigest {
    pub fn new(digester: Arc<dyn Digester>, quota: Quota) -> Self {
        Self {
            digester,
            quota,
            workers: DEFAULT_WORKERS,
            events: null_sender(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the worker-pool size (default 7).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Report per-item progress through the given sender.
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Stop claiming new items once the token is signalled.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Stage for TwoPartDigest {
    type Input = i64;
    type Output = String;

    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn run(
        self,
        input: StageInput<Self::Input>,
        output: StageOutput<Self::Output>,
    ) -> Result<(), StageError> {
        let Self {
            digester,
            quota,
            workers,
            events,
            cancel,
        } = self;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let input = input.clone();
                let output = output.clone();
                let digester = Arc::clone(&digester);
                let quota = quota.clone();
                let events = events.clone();
                let cancel = cancel.clone();

                handles.push(scope.spawn(move || {
                    worker(&input, &output, digester.as_ref(), &quota, &events, &cancel)
                }));
            }

            join_workers(STAGE_NAME, handles)
        })
    }
}

fn worker(
    input: &StageInput<i64>,
    output: &StageOutput<String>,
    digester: &dyn Digester,
    quota: &Quota,
    events: &EventSender,
    cancel: &CancellationToken,
) -> Result<(), StageError> {
    while let Some(value) = input.recv(cancel) {
        let data = value.to_string();

        // The gated chain runs on this thread (it blocks on the quota);
        // the plain half is free to be stolen by a rayon worker.
        let (gated, plain) = rayon::join(
            || {
                let slow = {
                    let _permit = quota.acquire();
                    digester.slow(&data)
                };
                digester.fast(&slow)
            },
            || digester.fast(&data),
        );

        output.send(format!("{plain}~{gated}"))?;
        events.send(Event::Stage(StageEvent::ItemDigested {
            stage: StageId::TwoPartDigest,
        }));
    }

    if cancel.is_cancelled() {
        return Err(StageError::Cancelled { stage: STAGE_NAME });
    }
    Ok(())
}

/// Join a stage's worker pool, keeping the first failure.
///
/// A worker panic outranks an ordinary stage error: it usually is the
/// root cause of any `OutputClosed` seen by its siblings.
pub(super) fn join_workers(
    stage: &'static str,
    handles: Vec<thread::ScopedJoinHandle<'_, Result<(), StageError>>>,
) -> Result<(), StageError> {
    let mut result = Ok(());
    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if result.is_ok() {
                    result = Err(e);
                }
            }
            Err(_) => {
                result = Err(StageError::WorkerPanicked { stage });
            }
        }
    }
    result
}
