use std::cmp::Ordering;
use std::fmt;

use crate::order::HeapOrd;

/// Errors returned by [`PriorityQueue`] accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `pop` or `peek` on a queue with no elements.
    EmptyQueue,
    /// Raw index access past the end of the backing store.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQueue => write!(f, "priority queue is empty"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "heap index {index} out of range for queue of length {len}")
            }
        }
    }
}

impl std::error::Error for QueueError {}

// ---------------------------------------------------------------------------
// Heap helpers (0-based: children 2i+1 / 2i+2, parent (i-1)/2)
// ---------------------------------------------------------------------------

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
fn left(i: usize) -> usize {
    2 * i + 1
}

/// Move `data[i]` toward the root while it is strictly less than its parent.
fn sift_up<T: HeapOrd>(data: &mut [T], mut i: usize) {
    while i > 0 {
        let p = parent(i);
        if data[i].heap_cmp(&data[p]) != Ordering::Less {
            break;
        }
        data.swap(i, p);
        i = p;
    }
}

/// Move `data[i]` toward the leaves while it is strictly greater than its
/// smaller child. The right child wins only when strictly less than the left.
fn sift_down<T: HeapOrd>(data: &mut [T], mut i: usize) {
    let len = data.len();
    loop {
        let l = left(i);
        if l >= len {
            break;
        }
        let r = l + 1;
        let child = if r < len && data[r].heap_cmp(&data[l]) == Ordering::Less {
            r
        } else {
            l
        };
        if data[i].heap_cmp(&data[child]) != Ordering::Greater {
            break;
        }
        data.swap(i, child);
        i = child;
    }
}

// ---------------------------------------------------------------------------
// PriorityQueue
// ---------------------------------------------------------------------------

/// A binary min-heap ordered by [`HeapOrd`].
///
/// The smallest element sits at index 0 and is returned first by
/// [`pop`](Self::pop). Elements that compare `Equal` come out in an
/// unspecified order; the queue is not stable, and pushing the same logical
/// item twice stores it twice.
///
/// Iteration walks the backing store in raw heap order, not sorted order.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    heap: Vec<T>,
}

impl<T: HeapOrd> PriorityQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    /// Create an empty queue with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    /// Take ownership of `data` and heapify it in place in O(n).
    pub fn from_vec(mut data: Vec<T>) -> Self {
        Self::min_heapify(&mut data);
        Self { heap: data }
    }

    /// Restore min-heap order over an arbitrary slice in O(n).
    ///
    /// Parents are sifted down from the last internal node back to the root.
    pub fn min_heapify(data: &mut [T]) {
        for i in (0..data.len() / 2).rev() {
            sift_down(data, i);
        }
    }

    /// Insert `item`. O(log n).
    pub fn push(&mut self, item: T) {
        self.heap.push(item);
        let last = self.heap.len() - 1;
        sift_up(&mut self.heap, last);
    }

    /// Insert `item` if present; `None` is ignored.
    pub fn push_opt(&mut self, item: Option<T>) {
        if let Some(item) = item {
            self.push(item);
        }
    }

    /// Remove and return the minimum element. O(log n).
    pub fn pop(&mut self) -> Result<T, QueueError> {
        if self.heap.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        // Last element takes the root slot, then sinks.
        let min = self.heap.swap_remove(0);
        sift_down(&mut self.heap, 0);
        Ok(min)
    }
}

impl<T> PriorityQueue<T> {
    /// The minimum element, without removing it.
    pub fn peek(&self) -> Result<&T, QueueError> {
        self.heap.first().ok_or(QueueError::EmptyQueue)
    }

    /// Element at raw heap index `index` (0 is the minimum).
    pub fn at(&self, index: usize) -> Result<&T, QueueError> {
        self.heap.get(index).ok_or(QueueError::IndexOutOfRange {
            index,
            len: self.heap.len(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Drop every element, keeping the allocation.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Iterate in raw heap order.
    ///
    /// The iterator borrows the queue, so it cannot be modified while one is
    /// alive; a fresh call starts over from the root. Beyond "index 0 is the
    /// minimum", the visiting order is unspecified.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.heap.iter()
    }

    /// The backing store in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.heap
    }

    /// Give back the backing store in heap order.
    pub fn into_vec(self) -> Vec<T> {
        self.heap
    }
}

impl<T: HeapOrd> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HeapOrd> From<Vec<T>> for PriorityQueue<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

impl<T: HeapOrd> FromIterator<T> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: HeapOrd> Extend<T> for PriorityQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.heap.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a PriorityQueue<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.heap.iter()
    }
}

impl<T> IntoIterator for PriorityQueue<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    /// Consume the queue, yielding elements in raw heap order.
    fn into_iter(self) -> Self::IntoIter {
        self.heap.into_iter()
    }
}
