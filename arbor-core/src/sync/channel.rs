//! Blocking FIFO channel.
//!
//! One `parking_lot::Mutex` guards the queue; `not_empty` wakes consumers and
//! `not_full` wakes producers. There is no fairness guarantee beyond what the
//! underlying primitives give. Shutdown is an explicit `close()`: producers
//! blocked on a full channel are released and further pushes are refused,
//! while consumers drain what is already queued.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::{Condvar, Mutex};

/// Returned by `Channel::push` after the channel was closed; carries the rejected item.
#[derive(PartialEq, Eq)]
pub struct Closed<T>(pub T);

impl<T> Closed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closed(..)")
    }
}

impl<T> fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("push on a closed channel")
    }
}

impl<T> std::error::Error for Closed<T> {}

struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// Thread-safe FIFO; `capacity == 0` means unbounded.
pub struct Channel<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> Channel<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::with_capacity(0)
    }

    /// Enqueues `item`, blocking while the channel is full.
    pub fn push(&self, item: T) -> Result<(), Closed<T>> {
        let mut state = self.state.lock();
        while !state.closed && self.is_full(&state) {
            self.not_full.wait(&mut state);
        }
        if state.closed {
            return Err(Closed(item));
        }
        state.queue.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeues the front item, blocking while the channel is empty.
    ///
    /// Returns `None` once the channel is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.queue.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Non-blocking `pop`.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.state.lock().queue.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Closes the channel and wakes every waiter.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    /// Configured bound; 0 for unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_full(&self, state: &State<T>) -> bool {
        self.capacity != 0 && state.queue.len() >= self.capacity
    }
}

impl<T: Clone> Channel<T> {
    /// Returns a copy of the front item without removing it, blocking while empty.
    ///
    /// Returns `None` once the channel is closed and drained.
    pub fn peek(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(front) = state.queue.front() {
                return Some(front.clone());
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("capacity", &self.capacity)
            .field("len", &state.queue.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn maintains_fifo_order() {
        let channel = Channel::with_capacity(4);
        channel.push(1).unwrap();
        channel.push(2).unwrap();
        assert_eq!(channel.peek(), Some(1));
        assert_eq!(channel.pop(), Some(1));
        assert_eq!(channel.pop(), Some(2));
        assert!(channel.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let channel = Channel::unbounded();
        channel.push("front").unwrap();
        assert_eq!(channel.peek(), Some("front"));
        assert_eq!(channel.peek(), Some("front"));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn push_blocks_until_consumer_makes_room() {
        let channel = Arc::new(Channel::with_capacity(2));
        channel.push(0).unwrap();
        channel.push(1).unwrap();

        let producer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.push(2))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(channel.len(), 2, "producer must wait while full");

        assert_eq!(channel.pop(), Some(0));
        producer.join().unwrap().unwrap();
        assert_eq!(channel.pop(), Some(1));
        assert_eq!(channel.pop(), Some(2));
    }

    #[test]
    fn pop_blocks_until_producer_sends() {
        let channel = Arc::new(Channel::<u32>::unbounded());
        let consumer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.pop())
        };
        thread::sleep(Duration::from_millis(20));
        channel.push(42).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn close_releases_blocked_producer() {
        let channel = Arc::new(Channel::with_capacity(1));
        channel.push(1).unwrap();

        let producer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.push(2))
        };
        thread::sleep(Duration::from_millis(20));
        channel.close();

        let rejected = producer.join().unwrap().unwrap_err();
        assert_eq!(rejected.into_inner(), 2);
    }

    #[test]
    fn close_drains_then_ends() {
        let channel = Channel::unbounded();
        channel.push('a').unwrap();
        channel.close();
        assert!(channel.push('b').is_err());
        assert_eq!(channel.peek(), Some('a'));
        assert_eq!(channel.pop(), Some('a'));
        assert_eq!(channel.pop(), None);
        assert_eq!(channel.peek(), None);
    }

    #[test]
    fn many_producers_one_consumer() {
        let channel = Arc::new(Channel::with_capacity(8));
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let channel = Arc::clone(&channel);
                thread::spawn(move || {
                    for i in 0..250 {
                        channel.push(p * 1000 + i).unwrap();
                    }
                })
            })
            .collect();

        let mut received = Vec::with_capacity(1000);
        for _ in 0..1000 {
            received.push(channel.pop().unwrap());
        }
        for producer in producers {
            producer.join().unwrap();
        }

        // Per-producer order is preserved.
        for p in 0..4 {
            let mine: Vec<_> = received.iter().filter(|v| **v / 1000 == p).collect();
            assert_eq!(mine.len(), 250);
            assert!(mine.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
