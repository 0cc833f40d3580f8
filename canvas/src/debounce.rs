//! Per-card pending-write slots for debounced position persistence.
//!
//! Each card has at most one pending write. Scheduling a card that already has
//! one replaces it: the old deadline is cancelled and the newest position wins.
//! Nothing here owns a timer; the engine passes the current time in and asks
//! which slots are due.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::collections::HashMap;

use crate::doc::{IdeaId, PositionUpdate};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingWrite {
    x: f64,
    y: f64,
    due_ms: f64,
    /// Monotonic schedule sequence, used to emit batches in scheduling order.
    seq: u64,
}

/// Debounced position writes keyed by card id.
#[derive(Debug, Clone)]
pub struct PendingWrites {
    delay_ms: f64,
    slots: HashMap<IdeaId, PendingWrite>,
    next_seq: u64,
}

impl PendingWrites {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, slots: HashMap::new(), next_seq: 0 }
    }

    /// Schedule (or reschedule) a write for `id`, due `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, id: IdeaId, x: f64, y: f64, now_ms: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(id, PendingWrite { x, y, due_ms: now_ms + self.delay_ms, seq });
    }

    /// Drop the pending write for `id`. Returns `true` if one existed.
    pub fn cancel(&mut self, id: &IdeaId) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Remove and return every write whose quiet period has elapsed.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<PositionUpdate> {
        let due: Vec<IdeaId> = self
            .slots
            .iter()
            .filter(|(_, w)| w.due_ms <= now_ms)
            .map(|(id, _)| *id)
            .collect();
        self.take_ids(&due)
    }

    /// Remove and return the writes for `ids` immediately, ignoring deadlines.
    /// Ids with nothing pending are skipped.
    pub fn take_ids(&mut self, ids: &[IdeaId]) -> Vec<PositionUpdate> {
        let mut taken: Vec<(u64, PositionUpdate)> = ids
            .iter()
            .filter_map(|id| {
                self.slots
                    .remove(id)
                    .map(|w| (w.seq, PositionUpdate { id: *id, x: w.x, y: w.y }))
            })
            .collect();
        taken.sort_by_key(|(seq, _)| *seq);
        taken.into_iter().map(|(_, update)| update).collect()
    }

    /// Remove and return every pending write.
    pub fn take_all(&mut self) -> Vec<PositionUpdate> {
        let ids: Vec<IdeaId> = self.slots.keys().copied().collect();
        self.take_ids(&ids)
    }

    /// Position waiting to be written for `id`, if any.
    #[must_use]
    pub fn peek(&self, id: &IdeaId) -> Option<(f64, f64)> {
        self.slots.get(id).map(|w| (w.x, w.y))
    }

    /// Keep only the slots whose id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&IdeaId) -> bool) {
        self.slots.retain(|id, _| keep(id));
    }

    /// Earliest deadline among pending writes, for hosts that arm a real timer.
    #[must_use]
    pub fn next_due_ms(&self) -> Option<f64> {
        self.slots.values().map(|w| w.due_ms).reduce(f64::min)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
