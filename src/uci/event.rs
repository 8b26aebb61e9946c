//! Events and the multi-producer, single-consumer queue that carries them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::search::SearchResult;

/// A unit of work for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One raw input line
    Command(String),
    /// Outcome of a finished search
    SearchResult(SearchResult),
    /// The input stream is exhausted or unreadable
    EndOfInput,
}

/// Unbounded FIFO mailbox shared by any number of producers and one consumer.
///
/// `put` never blocks; `take` blocks until an item is available. Items are
/// delivered in arrival order, each exactly once.
pub struct EventQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> EventQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        EventQueue {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Enqueue from any thread and wake the consumer.
    pub fn put(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Dequeue the oldest item, blocking until one arrives.
    pub fn take(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.available.wait(&mut items);
        }
    }

    /// Like [`take`](Self::take) but gives up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            if self.available.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Dequeue the oldest item if there is one.
    pub fn try_take(&self) -> Option<T> {
        self.items.lock().pop_front()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        queue.put(1);
        queue.put(2);
        queue.put(3);
        assert_eq!(queue.take(), 1);
        assert_eq!(queue.take(), 2);
        assert_eq!(queue.take(), 3);
        assert_eq!(queue.try_take(), None);
    }

    #[test]
    fn test_take_blocks_until_put() {
        let queue = Arc::new(EventQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.put(Event::Command("isready".to_string()));
            })
        };
        assert_eq!(queue.take(), Event::Command("isready".to_string()));
        producer.join().unwrap();
    }

    #[test]
    fn test_take_timeout_expires() {
        let queue: EventQueue<u32> = EventQueue::new();
        let started = Instant::now();
        assert_eq!(queue.take_timeout(Duration::from_millis(20)), None);
        assert!(started.elapsed() >= Duration::from_millis(20));
        queue.put(7);
        assert_eq!(queue.take_timeout(Duration::from_millis(20)), Some(7));
    }

    #[test]
    fn test_two_producers_deliver_everything_once() {
        let queue = Arc::new(EventQueue::new());
        let producers: Vec<_> = (0..2u32)
            .map(|id| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for n in 0..500u32 {
                        queue.put((id, n));
                    }
                })
            })
            .collect();

        let mut next = [0u32; 2];
        for _ in 0..1000 {
            let (id, n) = queue.take();
            assert_eq!(n, next[id as usize], "producer {id} delivered out of order");
            next[id as usize] += 1;
        }
        for producer in producers {
            producer.join().unwrap();
        }
        assert_eq!(next, [500, 500]);
        assert_eq!(queue.try_take(), None);
    }

    proptest! {
        /// Property: a single producer's items come out exactly as they went in.
        #[test]
        fn prop_single_producer_order(items in proptest::collection::vec(any::<u16>(), 0..200)) {
            let queue = EventQueue::new();
            for &item in &items {
                queue.put(item);
            }
            let drained: Vec<u16> = std::iter::from_fn(|| queue.try_take()).collect();
            prop_assert_eq!(drained, items);
        }
    }
}
