//! Generic stage-chaining executor.

use crate::core::stage::{Stage, StageInput, StageOutput};
use crate::error::{FingerprintError, Result, StageError};
use crossbeam_channel::{bounded, Receiver};
use std::thread;

type StageThread = Box<dyn FnOnce() -> std::result::Result<(), StageError> + Send + 'static>;

/// A typed chain of pipeline stages.
///
/// Built front to back with [`Pipeline::source`] and [`Pipeline::then`];
/// `T` is the item type flowing out of the current tail. Adjacent stages
/// are connected by dedicated rendezvous channels, so an item is handed
/// over only when the downstream stage is ready to take it.
///
/// Nothing runs until [`run`](Pipeline::run) or
/// [`collect`](Pipeline::collect) is called. Execution spawns one OS
/// thread per stage and blocks the caller until every stage has finished.
/// A chain of fewer than two stages is a no-op: no threads, no channels
/// touched.
pub struct Pipeline<T: Send + 'static> {
    stages: Vec<(&'static str, StageThread)>,
    tail: Receiver<T>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Start a chain with a source stage feeding the given items.
    pub fn source<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Send + 'static,
    {
        let (sender, receiver) = bounded(0);
        let thread: StageThread = Box::new(move || {
            let output = StageOutput::new("source", sender);
            for item in items {
                output.send(item)?;
            }
            Ok(())
        });

        Self {
            stages: vec![("source", thread)],
            tail: receiver,
        }
    }

    /// Append a stage, connecting it to the current tail.
    pub fn then<S>(mut self, stage: S) -> Pipeline<S::Output>
    where
        S: Stage<Input = T> + Send + 'static,
    {
        let (sender, receiver) = bounded(0);
        let name = stage.name();
        let input = StageInput::new(self.tail);
        let thread: StageThread =
            Box::new(move || stage.run(input, StageOutput::new(name, sender)));
        self.stages.push((name, thread));

        Pipeline {
            stages: self.stages,
            tail: receiver,
        }
    }

    /// Number of stages in the chain, the source included.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the chain to completion, discarding whatever reaches the tail.
    pub fn run(self) -> Result<()> {
        self.collect().map(|_| ())
    }

    /// Run the chain to completion, draining the tail on the calling
    /// thread and returning the collected items in arrival order.
    pub fn collect(self) -> Result<Vec<T>> {
        if self.stages.len() < 2 {
            return Ok(Vec::new());
        }

        let mut handles = Vec::with_capacity(self.stages.len());
        for (name, stage_thread) in self.stages {
            let handle = thread::Builder::new()
                .name(format!("stage-{name}"))
                .spawn(stage_thread)
                .map_err(|source| FingerprintError::Spawn { stage: name, source })?;
            handles.push((name, handle));
        }

        // The caller acts as the sink: drain until the last stage drops
        // its sender. Must happen before joining, or the rendezvous sends
        // of the final stage would never complete.
        let items: Vec<T> = self.tail.iter().collect();

        let mut failure: Option<FingerprintError> = None;
        for (name, handle) in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    let error = FingerprintError::Stage {
                        stage: name,
                        source,
                    };
                    keep_root_cause(&mut failure, error);
                }
                Err(_) => {
                    keep_root_cause(&mut failure, FingerprintError::Panicked { stage: name });
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(items),
        }
    }
}

/// Prefer the failure most likely to be the root cause.
///
/// When a stage dies, its upstream neighbour fails with `OutputClosed` as
/// a mere symptom; a panic or any other stage error outranks it.
fn keep_root_cause(slot: &mut Option<FingerprintError>, candidate: FingerprintError) {
    let symptom = |e: &FingerprintError| {
        matches!(
            e,
            FingerprintError::Stage {
                source: StageError::OutputClosed { .. },
                ..
            }
        )
    };

    let replace = match slot {
        None => true,
        Some(current) => symptom(current) && !symptom(&candidate),
    };
    if replace {
        *slot = Some(candidate);
    }
}
