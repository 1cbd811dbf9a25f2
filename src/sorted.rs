//! Bounded, newest-first id sets used by the zap index and the notification feed.

use nostr_sdk::{EventId, Timestamp};
use std::collections::HashSet;

/// A set of event ids ordered by `created_at` descending, bounded by capacity.
/// When full, the oldest entry is evicted.
#[derive(Debug)]
pub struct SortedIdSet {
    entries: Vec<(Timestamp, EventId)>,
    ids: HashSet<EventId>,
    capacity: usize,
}

impl SortedIdSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            ids: HashSet::new(),
            capacity,
        }
    }

    /// Insert an id. Returns false if it was already present or immediately
    /// evicted as older than everything in a full set.
    pub fn insert(&mut self, id: EventId, created_at: Timestamp) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        // Descending by timestamp, ties broken by id so order is stable.
        let pos = self
            .entries
            .partition_point(|(t, e)| (*t, *e) > (created_at, id));
        self.entries.insert(pos, (created_at, id));
        self.ids.insert(id);
        if self.entries.len() > self.capacity {
            if let Some((_, evicted)) = self.entries.pop() {
                self.ids.remove(&evicted);
                return evicted != id;
            }
        }
        true
    }

    pub fn remove(&mut self, id: &EventId) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.entries.retain(|(_, e)| e != id);
        true
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventId> {
        self.entries.iter().map(|(_, id)| id)
    }

    /// Timestamped entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &(Timestamp, EventId)> {
        self.entries.iter()
    }

    /// Newest entry.
    pub fn first(&self) -> Option<&EventId> {
        self.entries.first().map(|(_, id)| id)
    }
}
