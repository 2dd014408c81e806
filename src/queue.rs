//! Priority Queue ADT
//!
//! Ordered container keyed by a caller-supplied comparator. Insertion is
//! stable: a new element lands after every element that compares greater
//! than or equal to it, so equal keys keep their insertion order. `pop` and
//! `peek` therefore always return the maximum-key, earliest-inserted element.
//!
//! Backed by a `VecDeque` with a linear-scan insert. O(n), which is fine at
//! the unit counts the scheduler handles; any replacement must preserve the
//! FIFO-among-equals contract exactly.

use std::cmp::Ordering;
use std::collections::VecDeque;

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send>;

/// Stable priority queue ordered by a caller-supplied comparator.
pub struct PrioQueue<T> {
    items: VecDeque<T>,
    cmp: Comparator<T>,
}

impl<T> PrioQueue<T> {
    /// Create an empty queue ordered by `cmp` (greater compares first out).
    pub fn new(cmp: impl Fn(&T, &T) -> Ordering + Send + 'static) -> Self {
        Self {
            items: VecDeque::new(),
            cmp: Box::new(cmp),
        }
    }

    /// Insert `item` after all elements comparing greater than or equal to it.
    pub fn push(&mut self, item: T) {
        let at = self
            .items
            .iter()
            .position(|held| (self.cmp)(held, &item) == Ordering::Less)
            .unwrap_or(self.items.len());
        self.items.insert(at, item);
    }

    /// Remove and return the front element, if any.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Peek at the front element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
