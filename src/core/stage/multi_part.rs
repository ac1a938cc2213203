//! Stage 2: the multi-part fingerprint.

use super::two_part::join_workers;
use super::{Stage, StageInput, StageOutput, DEFAULT_PARTS, DEFAULT_WORKERS};
use crate::core::cancel::CancellationToken;
use crate::core::digest::Digester;
use crate::error::StageError;
use crate::events::{Event, EventSender, StageEvent, StageId, null_sender};
use rayon::prelude::*;
use std::sync::Arc;
use std::thread;

const STAGE_NAME: &str = "multi-part-digest";

/// Converts each string item into the concatenation of `parts` sub-digests,
/// part *k* being `fast(k_as_decimal + item)`.
///
/// The sub-digests of one item are computed concurrently but always
/// reassembled in ascending index order; completion order never leaks into
/// the output. No quota applies here - only the unrestricted primitive is
/// used.
pub struct MultiPartDigest {
    digester: Arc<dyn Digester>,
    workers: usize,
    parts: usize,
    events: EventSender,
    cancel: CancellationToken,
}

impl MultiPartDigest {
    pub fn new(digester: Arc<dyn Digester>) -> Self {
        Self {
            digester,
            workers: DEFAULT_WORKERS,
            parts: DEFAULT_PARTS,
            events: null_sender(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the worker-pool size (default 7).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the number of sub-digests per item (default 6).
    pub fn parts(mut self, parts: usize) -> Self {
        self.parts = parts;
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

impl Stage for MultiPartDigest {
    type Input = String;
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
            workers,
            parts,
            events,
            cancel,
        } = self;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let input = input.clone();
                let output = output.clone();
                let digester = Arc::clone(&digester);
                let events = events.clone();
                let cancel = cancel.clone();

                handles.push(scope.spawn(move || {
                    while let Some(item) = input.recv(&cancel) {
                        // collect() reassembles in index order no matter
                        // which sub-digest finishes first.
                        let sub_digests: Vec<String> = (0..parts)
                            .into_par_iter()
                            .map(|k| digester.fast(&format!("{k}{item}")))
                            .collect();

                        output.send(sub_digests.concat())?;
                        events.send(Event::Stage(StageEvent::ItemDigested {
                            stage: StageId::MultiPartDigest,
                        }));
                    }

                    if cancel.is_cancelled() {
                        return Err(StageError::Cancelled { stage: STAGE_NAME });
                    }
                    Ok(())
                }));
            }

            join_workers(STAGE_NAME, handles)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::IdentityDigester;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    fn run_stage(stage: MultiPartDigest, items: Vec<&str>) -> Vec<String> {
        let items: Vec<String> = items.into_iter().map(String::from).collect();
        let (in_tx, in_rx) = bounded(0);
        let (out_tx, out_rx) = bounded(0);

        thread::scope(|scope| {
            scope.spawn(move || {
                for item in items {
                    in_tx.send(item).unwrap();
                }
            });
            scope.spawn(move || {
                stage
                    .run(StageInput::new(in_rx), StageOutput::new("test", out_tx))
                    .unwrap();
            });
            out_rx.iter().collect()
        })
    }

    #[test]
    fn identity_digester_prefixes_each_index() {
        let stage = MultiPartDigest::new(Arc::new(IdentityDigester));
        let outputs = run_stage(stage, vec!["ab"]);
        assert_eq!(outputs, vec!["0ab1ab2ab3ab4ab5ab".to_string()]);
    }

    #[test]
    fn part_count_is_configurable() {
        let stage = MultiPartDigest::new(Arc::new(IdentityDigester)).parts(3);
        let outputs = run_stage(stage, vec!["x"]);
        assert_eq!(outputs, vec!["0x1x2x".to_string()]);
    }

    /// Identity digester that finishes high-index parts first, to prove
    /// assembly order does not follow completion order.
    struct ReverseSkewDigester;

    impl Digester for ReverseSkewDigester {
        fn fast(&self, data: &str) -> String {
            let index = data
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0);
            // Lower indices sleep longer, so part 5 lands well before part 0.
            thread::sleep(Duration::from_millis(u64::from(6 - index.min(6)) * 3));
            data.to_string()
        }

        fn slow(&self, data: &str) -> String {
            data.to_string()
        }
    }

    #[test]
    fn parts_are_assembled_in_index_order_not_completion_order() {
        let stage = MultiPartDigest::new(Arc::new(ReverseSkewDigester));
        let outputs = run_stage(stage, vec!["Q"]);
        assert_eq!(outputs, vec!["0Q1Q2Q3Q4Q5Q".to_string()]);
    }
}
