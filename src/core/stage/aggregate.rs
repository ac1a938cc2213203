//! Terminal stage: sort and join.

use super::{Stage, StageInput, StageOutput};
use crate::core::cancel::CancellationToken;
use crate::error::StageError;
use crate::events::{Event, EventSender, StageEvent, null_sender};

const STAGE_NAME: &str = "sorted-join";

/// Collects every upstream item, sorts lexicographically and joins with
/// `_`, emitting exactly one result string.
///
/// The sort is what makes the whole pipeline deterministic: upstream
/// workers race, so items arrive here in arbitrary order, and sorting
/// erases that order before the final string is assembled. An empty
/// stream yields the empty string.
pub struct SortedJoin {
    events: EventSender,
    cancel: CancellationToken,
}

impl Default for SortedJoin {
    fn default() -> Self {
        Self::new()
    }
}

const SEPARATOR: &str = "_";

impl SortedJoin {
    pub fn new() -> Self {
        Self {
            events: null_sender(),
            cancel: CancellationToken::new(),
        }
    }

    /// Report progress through the given sender.
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Abandon collection once the token is signalled.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Stage for SortedJoin {
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
        let mut items = Vec::new();
        while let Some(item) = input.recv(&self.cancel) {
            items.push(item);
        }
        if self.cancel.is_cancelled() {
            return Err(StageError::Cancelled { stage: STAGE_NAME });
        }
        items.sort();

        self.events.send(Event::Stage(StageEvent::Aggregated {
            items: items.len(),
        }));

        output.send(items.join(SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    fn run_stage(items: Vec<&str>) -> String {
        let items: Vec<String> = items.into_iter().map(String::from).collect();
        let (in_tx, in_rx) = bounded(0);
        let (out_tx, out_rx) = bounded(1);

        thread::scope(|scope| {
            scope.spawn(move || {
                for item in items {
                    in_tx.send(item).unwrap();
                }
            });
            scope.spawn(move || {
                SortedJoin::new()
                    .run(StageInput::new(in_rx), StageOutput::new("test", out_tx))
                    .unwrap();
            });
            out_rx.recv().unwrap()
        })
    }

    #[test]
    fn sorts_before_joining() {
        assert_eq!(run_stage(vec!["b", "a", "c"]), "a_b_c");
    }

    #[test]
    fn arrival_order_does_not_matter() {
        assert_eq!(
            run_stage(vec!["3", "1", "2"]),
            run_stage(vec!["1", "2", "3"])
        );
    }

    #[test]
    fn empty_stream_yields_empty_string() {
        assert_eq!(run_stage(vec![]), "");
    }

    #[test]
    fn single_item_passes_through() {
        assert_eq!(run_stage(vec!["only"]), "only");
    }
}
