//! Synchronization primitives for search control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe stop flag for cooperative search cancellation.
///
/// Clones share the same flag; the search thread polls it and exits
/// promptly once it is set.
#[derive(Clone, Debug)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a new stop flag (initially not stopped).
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Check if the stop flag is set.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Set the stop flag. Setting it again is a no-op.
    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stop_is_idempotent() {
        let flag = StopFlag::default();
        assert!(!flag.is_stopped());
        flag.stop();
        flag.stop();
        assert!(flag.is_stopped());
    }

    #[test]
    fn test_stop_seen_by_other_thread() {
        let flag = StopFlag::new();
        let watcher = {
            let flag = flag.clone();
            thread::spawn(move || {
                while !flag.is_stopped() {
                    thread::yield_now();
                }
            })
        };
        flag.stop();
        watcher.join().unwrap();
    }
}
