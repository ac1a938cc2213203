//! Event channel plumbing on top of crossbeam-channel.
//!
//! Stages and the orchestrator publish [`Event`]s through an
//! [`EventSender`]; any front end (CLI, GUI, tests) subscribes through the
//! matching [`EventReceiver`]. Progress reporting is always optional: a
//! sender whose receiver is gone silently drops events.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Publishing side of the event stream.
///
/// Cheap to clone; every stage of a run holds its own clone.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Publish an event.
    ///
    /// If no receiver is listening the event is discarded - a run never
    /// fails or blocks because nobody wants progress updates.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Subscribing side of the event stream.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once all senders are gone.
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate over events until all senders are gone.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Create a connected sender/receiver pair.
///
/// Unbounded: events are small and must never apply back-pressure to the
/// stages emitting them.
pub fn channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = unbounded();
    (
        EventSender { inner: sender },
        EventReceiver { inner: receiver },
    )
}

/// A sender with no receiver attached.
///
/// The default for runs that do not want progress reporting (and for
/// tests).
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = channel();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, StageEvent, StageId};
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = channel();

        let producer = thread::spawn(move || {
            sender.send(Event::Stage(StageEvent::ItemDigested {
                stage: StageId::TwoPartDigest,
            }));
        });
        producer.join().unwrap();

        match receiver.recv() {
            Some(Event::Stage(StageEvent::ItemDigested { stage })) => {
                assert_eq!(stage, StageId::TwoPartDigest);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn receiver_drains_then_ends_after_senders_drop() {
        let (sender, receiver) = channel();
        sender.send(Event::Pipeline(PipelineEvent::Started { items: 3 }));
        drop(sender);

        assert!(receiver.recv().is_some());
        assert!(receiver.recv().is_none());
    }

    #[test]
    fn null_sender_discards_quietly() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started { items: 0 }));
    }
}
