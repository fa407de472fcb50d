// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed-capacity, blocking FIFO used to hand tasks to the workers
//! and finished tiles to the drain.
//!
//! The queue is a ring of `capacity` slots guarded by one mutex, with
//! one condition variable for each direction of waiting.  Whether the
//! ring is full or empty is decided by an explicit count of resident
//! items; when `head == tail` the count is the only thing that tells
//! the two states apart.  Callers never see the lock or the condition
//! variables.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::errors::RenderError;

struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn insert(&mut self, item: T) {
        debug_assert!(!self.is_full());
        debug_assert!(self.slots[self.tail].is_none());
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
    }

    fn remove(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        item
    }
}

/// A bounded, thread-safe FIFO.  Share it between threads by
/// reference (inside a scoped thread) or behind an `Arc`.
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.  A
    /// capacity of zero is refused, since no push could ever complete.
    pub fn new(capacity: usize) -> Result<Self, RenderError> {
        if capacity == 0 {
            return Err(RenderError::ZeroCapacity);
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(BoundedQueue {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                tail: 0,
                len: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    // The ring's invariants hold between every pair of statements that
    // can panic, so a poisoned lock still guards a consistent ring.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item` at the tail, blocking while the queue is full.
    /// Wakes one thread waiting in `pop`.
    pub fn push(&self, item: T) {
        let mut ring = self
            .not_full
            .wait_while(self.lock(), |ring| ring.is_full())
            .unwrap_or_else(PoisonError::into_inner);
        ring.insert(item);
        drop(ring);
        self.not_empty.notify_one();
    }

    /// Appends `item` if there is room, otherwise hands it back.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let mut ring = self.lock();
        if ring.is_full() {
            return Err(item);
        }
        ring.insert(item);
        drop(ring);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the head item, blocking while the queue is empty.
    /// Wakes one thread waiting in `push`.
    pub fn pop(&self) -> T {
        let mut ring = self
            .not_empty
            .wait_while(self.lock(), |ring| ring.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        let item = ring.remove();
        drop(ring);
        self.not_full.notify_one();
        // wait_while only returns once the ring holds an item
        match item {
            Some(item) => item,
            None => unreachable!("woke on a non-empty ring but found no item"),
        }
    }

    /// Removes the head item if there is one, without blocking.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.lock().remove();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// The fixed number of slots.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Number of resident items at the moment of the call.
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Whether the queue held no items at the moment of the call.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether the queue was at capacity at the moment of the call.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn zero_capacity_is_refused() {
        assert_eq!(
            BoundedQueue::<u8>::new(0).err(),
            Some(RenderError::ZeroCapacity)
        );
    }

    #[test]
    fn empty_and_full_are_distinguished_when_indices_meet() {
        let q = BoundedQueue::new(3).unwrap();
        assert!(q.is_empty() && !q.is_full());
        for i in 0..3 {
            q.push(i);
        }
        // head == tail again, but now the ring is full
        assert!(q.is_full() && !q.is_empty());
        assert_eq!(q.len(), 3);
        assert_eq!(q.try_push(9), Err(9));
        for i in 0..3 {
            assert_eq!(q.pop(), i);
        }
        assert!(q.is_empty());
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn order_survives_wrapping_around_the_ring() {
        let q = BoundedQueue::new(2).unwrap();
        let mut seen = vec![];
        for i in 0..7 {
            q.push(i);
            if q.is_full() {
                seen.push(q.pop());
            }
        }
        while let Some(i) = q.try_pop() {
            seen.push(i);
        }
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn third_push_waits_for_a_pop() {
        let q = BoundedQueue::new(2).unwrap();
        q.push('A');
        q.push('B');
        assert!(q.is_full());

        let pushed = AtomicBool::new(false);
        crossbeam::scope(|s| {
            s.spawn(|_| {
                q.push('C');
                pushed.store(true, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(100));
            assert!(!pushed.load(Ordering::SeqCst));
            assert_eq!(q.pop(), 'A');
        })
        .unwrap();

        assert!(pushed.load(Ordering::SeqCst));
        assert!(q.is_full());
        assert_eq!(q.pop(), 'B');
        assert_eq!(q.pop(), 'C');
    }

    #[test]
    fn pop_waits_for_a_push() {
        let q = BoundedQueue::new(1).unwrap();
        crossbeam::scope(|s| {
            let handle = s.spawn(|_| q.pop());
            thread::sleep(Duration::from_millis(50));
            q.push(42u32);
            assert_eq!(handle.join().unwrap(), 42);
        })
        .unwrap();
    }

    #[test]
    fn many_producers_never_exceed_capacity_or_lose_items() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: usize = 500;
        let q = BoundedQueue::new(3).unwrap();
        let high_water = AtomicUsize::new(0);

        let mut received: Vec<(usize, usize)> = vec![];
        crossbeam::scope(|s| {
            for p in 0..PRODUCERS {
                let q = &q;
                let high_water = &high_water;
                s.spawn(move |_| {
                    for i in 0..PER_PRODUCER {
                        q.push((p, i));
                        high_water.fetch_max(q.len(), Ordering::SeqCst);
                    }
                });
            }
            for _ in 0..PRODUCERS * PER_PRODUCER {
                received.push(q.pop());
            }
        })
        .unwrap();

        assert!(high_water.load(Ordering::SeqCst) <= 3);
        assert!(q.is_empty());
        // every item exactly once, each producer's items in push order
        for p in 0..PRODUCERS {
            let mine: Vec<usize> = received
                .iter()
                .filter(|(from, _)| *from == p)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(mine, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }
}
