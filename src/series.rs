// Capacity-bounded point sequence feeding one chart line.

use std::collections::VecDeque;

/// Default number of points kept per series.
pub const DEFAULT_CAPACITY: usize = 600;

/// Append-only sequence of `(index, value)` points. Oldest points are dropped
/// from the head once the capacity is exceeded; order is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: VecDeque<(u64, f64)>,
    capacity: usize,
}

impl Default for Series {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Series {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append at the tail without trimming.
    pub fn append(&mut self, index: u64, value: f64) {
        self.points.push_back((index, value));
    }

    /// Drop points from the head until at most `cap` remain.
    pub fn enforce_capacity(&mut self, cap: usize) {
        while self.points.len() > cap {
            self.points.pop_front();
        }
    }

    /// Append, then trim to the configured capacity.
    pub fn push(&mut self, index: u64, value: f64) {
        self.append(index, value);
        self.enforce_capacity(self.capacity);
    }

    /// Largest value retained, 0 when empty.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    pub fn last(&self) -> Option<(u64, f64)> {
        self.points.back().copied()
    }

    pub fn first(&self) -> Option<(u64, f64)> {
        self.points.front().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u64, f64)> {
        self.points.iter()
    }

    pub fn points(&self) -> Vec<(u64, f64)> {
        self.points.iter().copied().collect()
    }
}
