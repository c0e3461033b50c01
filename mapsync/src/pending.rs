//! Creation requests received before the map exists.
//!
//! The queue only lives inside the controller's `Uninitialized` phase, so it
//! cannot be appended to after readiness. [`PendingQueue::drain_into`]
//! consumes it, which makes "drained exactly once" a property of ownership.

#[cfg(test)]
#[path = "pending_test.rs"]
mod pending_test;

use std::collections::VecDeque;

use frames::LatLng;

use crate::lifecycle::MarkerElement;
use crate::registry::MarkerKey;

/// A buffered creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// Element state as of the last notification for it.
    pub element: MarkerElement,
    /// Host timestamp of the original creation notification.
    pub received_ms: f64,
}

/// FIFO buffer of creation requests.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a creation request.
    pub fn enqueue(&mut self, element: MarkerElement, received_ms: f64) {
        self.entries.push_back(PendingEntry { element, received_ms });
    }

    /// Replace the coordinates of every queued entry for `key`. Returns
    /// whether any entry matched.
    pub fn relocate(&mut self, key: &MarkerKey, to: LatLng) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| &e.element.key() == key) {
            entry.element.lat_lng = to;
            found = true;
        }
        found
    }

    /// Drop every queued entry for `key`. Returns whether any entry matched.
    pub fn discard(&mut self, key: &MarkerKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.element.key() != key);
        self.entries.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every entry to `consume` in arrival order, consuming the queue.
    pub fn drain_into<F>(self, mut consume: F)
    where
        F: FnMut(PendingEntry),
    {
        for entry in self.entries {
            consume(entry);
        }
    }
}
