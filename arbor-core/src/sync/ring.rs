//! Lock-free single-producer single-consumer ring buffer.
//!
//! A fixed array of slots with an atomic read index (`head`) and write index
//! (`tail`). The producer publishes a written slot with a `Release` store of
//! `tail`; the consumer observes it with an `Acquire` load, so a slot is never
//! read half-written. The consumer hands a slot back the same way through
//! `head`.
//!
//! The buffer is split into exactly one `Producer` and one `Consumer`; neither
//! handle is `Clone`, which turns the SPSC contract into a type-level rule.
//! One slot is kept free to tell "full" from "empty", so a buffer created with
//! capacity `n` holds at most `n - 1` items. Full and empty are transient
//! conditions, not errors: callers retry.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::utils::CachePadded;

use crate::error::QueueError;

struct Inner<T> {
    slots: Box<[UnsafeCell<Option<T>>]>,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    mask: usize,
}

// SAFETY: slot access is partitioned by the head/tail protocol between exactly
// one producer and one consumer handle.
unsafe impl<T: Send> Send for Inner<T> {}
unsafe impl<T: Send> Sync for Inner<T> {}

impl<T> Inner<T> {
    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) & self.mask
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head) & self.mask
    }
}

/// An SPSC ring buffer before it is split into its two ends.
pub struct RingBuffer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> RingBuffer<T> {
    /// Creates a ring with `capacity` slots.
    ///
    /// `capacity` must be a power of two and at least 2.
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(QueueError::InvalidCapacity(capacity));
        }

        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            inner: Arc::new(Inner {
                slots,
                head: CachePadded::new(AtomicUsize::new(0)),
                tail: CachePadded::new(AtomicUsize::new(0)),
                mask: capacity - 1,
            }),
        })
    }

    /// Splits the ring into its producer and consumer ends.
    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        (
            Producer {
                inner: Arc::clone(&self.inner),
            },
            Consumer { inner: self.inner },
        )
    }

    /// Number of items the ring can hold at once.
    pub fn capacity(&self) -> usize {
        self.inner.slots.len() - 1
    }
}

/// Writing end of a `RingBuffer`.
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Producer<T> {
    /// Attempts to enqueue `item`; hands it back if the ring is full.
    #[inline]
    pub fn push(&mut self, item: T) -> Result<(), T> {
        let tail = self.inner.tail.load(Ordering::Relaxed);
        let next = self.inner.next(tail);
        if next == self.inner.head.load(Ordering::Acquire) {
            return Err(item);
        }

        // SAFETY: the consumer never touches slot `tail` until it observes the
        // Release store below.
        unsafe { *self.inner.slots[tail].get() = Some(item) };

        self.inner.tail.store(next, Ordering::Release);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        let tail = self.inner.tail.load(Ordering::Relaxed);
        self.inner.next(tail) == self.inner.head.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.inner.slots.len() - 1
    }
}

/// Reading end of a `RingBuffer`.
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Consumer<T> {
    /// Attempts to dequeue the front item; `None` if the ring is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let head = self.inner.head.load(Ordering::Relaxed);
        if head == self.inner.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the Acquire load above makes the producer's write to slot
        // `head` visible, and the producer will not reuse it until `head` moves.
        let item = unsafe { (*self.inner.slots[head].get()).take() };

        self.inner.head.store(self.inner.next(head), Ordering::Release);
        item
    }

    /// Borrows the front item without removing it; `None` if the ring is empty.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        let head = self.inner.head.load(Ordering::Relaxed);
        if head == self.inner.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: as in `pop`; the borrow ends before `pop` can move `head`
        // because `pop` takes `&mut self`.
        unsafe { (*self.inner.slots[head].get()).as_ref() }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.head.load(Ordering::Relaxed) == self.inner.tail.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("len", &self.inner.len())
            .finish()
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn rejects_invalid_capacity() {
        for capacity in [0, 1, 3, 12] {
            assert!(matches!(
                RingBuffer::<u8>::with_capacity(capacity),
                Err(QueueError::InvalidCapacity(c)) if c == capacity
            ));
        }
    }

    #[test]
    fn handles_single_element() {
        let (mut tx, mut rx) = RingBuffer::with_capacity(2).unwrap().split();
        tx.push(1).unwrap();
        assert_eq!(rx.peek(), Some(&1));
        assert_eq!(rx.pop(), Some(1));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn signals_full_and_returns_item() {
        let ring = RingBuffer::with_capacity(4).unwrap();
        assert_eq!(ring.capacity(), 3);
        let (mut tx, mut rx) = ring.split();
        for i in 0..3 {
            tx.push(i).unwrap();
        }
        assert!(tx.is_full());
        assert_eq!(tx.push(99), Err(99));

        assert_eq!(rx.pop(), Some(0));
        tx.push(3).unwrap();
        assert_eq!(rx.len(), 3);
    }

    #[test]
    fn wraps_buffer_correctly() {
        let (mut tx, mut rx) = RingBuffer::with_capacity(4).unwrap().split();
        for cycle in 0..5 {
            for i in 0..3 {
                tx.push(cycle * 3 + i).unwrap();
            }
            for i in 0..3 {
                assert_eq!(rx.pop(), Some(cycle * 3 + i));
            }
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn drops_unconsumed_items() {
        let marker = Arc::new(());
        {
            let (mut tx, _rx) = RingBuffer::with_capacity(8).unwrap().split();
            tx.push(Arc::clone(&marker)).unwrap();
            tx.push(Arc::clone(&marker)).unwrap();
            assert_eq!(Arc::strong_count(&marker), 3);
        }
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn transfers_across_threads_in_order() {
        const COUNT: u64 = 100_000;
        let (mut tx, mut rx) = RingBuffer::with_capacity(64).unwrap().split();

        let producer = thread::spawn(move || {
            for i in 0..COUNT {
                let mut item = i;
                while let Err(back) = tx.push(item) {
                    item = back;
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0;
        while expected < COUNT {
            match rx.pop() {
                Some(value) => {
                    assert_eq!(value, expected);
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }
        producer.join().unwrap();
        assert!(rx.is_empty());
    }

    proptest! {
        #[test]
        fn pops_follow_push_order(ops in prop::collection::vec(any::<bool>(), 0..256)) {
            let (mut tx, mut rx) = RingBuffer::with_capacity(8).unwrap().split();
            let mut model = std::collections::VecDeque::new();
            let mut next = 0u32;

            for is_push in ops {
                if is_push {
                    let accepted = tx.push(next).is_ok();
                    // A push succeeds exactly when fewer than capacity items are queued.
                    prop_assert_eq!(accepted, model.len() < 7);
                    if accepted {
                        model.push_back(next);
                    }
                    next += 1;
                } else {
                    prop_assert_eq!(rx.pop(), model.pop_front());
                }
            }
        }
    }
}
