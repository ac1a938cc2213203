//! # Quota Module
//!
//! A small counting semaphore gating the rate-limited digest primitive.
//!
//! The quota is constructor-injected into stage 1 rather than held in
//! process-global state, so independent pipelines (and tests) never
//! interfere with each other. Cloning a [`Quota`] shares the underlying
//! permit pool.

use crossbeam_channel::{bounded, Receiver, Sender};

/// A counting semaphore with a fixed number of permits.
///
/// Built on a bounded channel used as a slot pool: acquiring sends a token
/// (blocking while the channel is full), releasing receives one back.
#[derive(Clone)]
pub struct Quota {
    slots: Sender<()>,
    releases: Receiver<()>,
    permits: usize,
}

impl Quota {
    /// Create a quota with the given number of permits.
    ///
    /// # Panics
    /// Panics if `permits` is zero; a zero-permit quota could never be
    /// acquired. Callers going through the builder get a config error
    /// before reaching this point.
    pub fn new(permits: usize) -> Self {
        assert!(permits >= 1, "quota requires at least one permit");
        let (slots, releases) = bounded(permits);
        Self {
            slots,
            releases,
            permits,
        }
    }

    /// Block until a permit is available, then take it.
    ///
    /// The permit is returned to the pool when the guard is dropped.
    pub fn acquire(&self) -> QuotaPermit {
        // Cannot fail: `self` holds a receiver, so the channel is open.
        let _ = self.slots.send(());
        QuotaPermit {
            releases: self.releases.clone(),
        }
    }

    /// The total number of permits this quota was created with.
    pub fn permits(&self) -> usize {
        self.permits
    }
}

impl std::fmt::Debug for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quota")
            .field("permits", &self.permits)
            .finish()
    }
}

/// RAII guard for one quota permit.
pub struct QuotaPermit {
    releases: Receiver<()>,
}

impl Drop for QuotaPermit {
    fn drop(&mut self) {
        // One token per outstanding permit, so this never blocks.
        let _ = self.releases.recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn max_observed_concurrency(quota: &Quota, threads: usize) -> usize {
        let current = AtomicUsize::new(0);
        let max = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for _ in 0..5 {
                        let _permit = quota.acquire();
                        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                        max.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(1));
                        current.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });

        max.load(Ordering::SeqCst)
    }

    #[test]
    fn single_permit_is_mutually_exclusive() {
        let quota = Quota::new(1);
        assert_eq!(max_observed_concurrency(&quota, 8), 1);
    }

    #[test]
    fn multiple_permits_allow_that_many_holders() {
        let quota = Quota::new(3);
        assert!(max_observed_concurrency(&quota, 8) <= 3);
    }

    #[test]
    fn clones_share_the_permit_pool() {
        let quota = Quota::new(1);
        let clone = quota.clone();

        let _held = quota.acquire();
        // The clone must see the pool as exhausted.
        assert!(clone.slots.try_send(()).is_err());
    }

    #[test]
    #[should_panic(expected = "at least one permit")]
    fn zero_permits_is_rejected() {
        let _ = Quota::new(0);
    }
}
