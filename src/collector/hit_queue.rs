use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{DocId, Score};

/// Compares the values stored in two slots.
///
/// `Ordering::Greater` means that the document stored in `lhs` ranks first.
pub trait SlotCompare {
    /// Compares the sort values stored in two slots.
    fn compare_slots(&self, lhs: usize, rhs: usize) -> Ordering;
}

/// A candidate held by the [`HitQueue`].
///
/// The sort values of the candidate are not stored in the entry, but in the slot
/// `slot` of the comparators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Slot of the comparators holding the sort values of this candidate.
    pub slot: usize,
    /// Global doc id.
    pub doc: DocId,
    /// Relevance score, if scoring is enabled.
    pub score: Option<Score>,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(slot: usize, doc: DocId, score: Option<Score>) -> Entry {
        Entry { slot, doc, score }
    }
}

/// Bounded priority queue of candidates.
///
/// The queue is a binary heap whose root is the worst candidate (the "bottom"),
/// so that it can be inspected in O(1) and replaced in O(log k).
///
/// Candidates that are equal on every sort criterion are ranked by ascending doc id.
#[derive(Debug, Clone)]
pub struct HitQueue {
    heap: Vec<Entry>,
    capacity: usize,
}

impl HitQueue {
    /// Creates an empty queue holding up to `capacity` candidates.
    pub fn with_capacity(capacity: usize) -> HitQueue {
        HitQueue {
            heap: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of candidates.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of candidates in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the queue holds no candidate.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true once the queue holds `capacity` candidates.
    ///
    /// A full queue never becomes non-full again, except through [`HitQueue::pop`].
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Returns the worst candidate.
    pub fn bottom(&self) -> Option<&Entry> {
        self.heap.first()
    }

    /// Adds a candidate to a queue that is not full yet.
    ///
    /// # Panics
    ///
    /// Panics if the queue is full.
    pub fn push(&mut self, entry: Entry, slots: &impl SlotCompare) {
        assert!(!self.is_full(), "push on a full hit queue");
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1, slots);
    }

    /// Adds a candidate, evicting the worst candidate if the queue is full.
    ///
    /// Returns the candidate that did not make it in the queue, if any: either the
    /// evicted bottom, or `entry` itself if it is not better than the bottom.
    pub fn insert_with_overflow(&mut self, entry: Entry, slots: &impl SlotCompare) -> Option<Entry> {
        if !self.is_full() {
            self.push(entry, slots);
            return None;
        }
        match self.heap.first() {
            Some(bottom) if is_worse(bottom, &entry, slots) => {
                let evicted = std::mem::replace(&mut self.heap[0], entry);
                self.sift_down(0, slots);
                Some(evicted)
            }
            _ => Some(entry),
        }
    }

    /// Replaces the doc id and score of the bottom candidate, and restores the heap.
    ///
    /// The caller is expected to have overwritten the bottom's slot with the values of
    /// the new document beforehand. Returns the new bottom.
    pub fn update_bottom(
        &mut self,
        doc: DocId,
        score: Option<Score>,
        slots: &impl SlotCompare,
    ) -> Option<&Entry> {
        let bottom = self.heap.first_mut()?;
        bottom.doc = doc;
        bottom.score = score;
        self.sift_down(0, slots);
        self.heap.first()
    }

    /// Removes and returns the worst candidate.
    pub fn pop(&mut self, slots: &impl SlotCompare) -> Option<Entry> {
        if self.heap.is_empty() {
            return None;
        }
        let bottom = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0, slots);
        }
        Some(bottom)
    }

    /// Returns the candidates, best first.
    pub fn into_sorted_vec(mut self, slots: &impl SlotCompare) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(self.heap.len());
        while let Some(entry) = self.pop(slots) {
            entries.push(entry);
        }
        entries.reverse();
        entries
    }

    fn sift_up(&mut self, mut pos: usize, slots: &impl SlotCompare) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !is_worse(&self.heap[pos], &self.heap[parent], slots) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize, slots: &impl SlotCompare) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let worst_child = if right < len && is_worse(&self.heap[right], &self.heap[left], slots)
            {
                right
            } else {
                left
            };
            if !is_worse(&self.heap[worst_child], &self.heap[pos], slots) {
                break;
            }
            self.heap.swap(pos, worst_child);
            pos = worst_child;
        }
    }
}

/// Returns true if `lhs` ranks after `rhs`.
#[inline]
fn is_worse(lhs: &Entry, rhs: &Entry, slots: &impl SlotCompare) -> bool {
    match slots.compare_slots(lhs.slot, rhs.slot) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => lhs.doc > rhs.doc,
    }
}
