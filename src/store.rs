//! Canonical deduplicated event store.
//!
//! Owns the only full copy of every handled event; all relation indices hold
//! bare ids pointing back here. Insertion is idempotent and removal never
//! cascades — dangling index entries just stop resolving.

use nostr_sdk::{Event, EventId, Filter};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EventStore {
    events: HashMap<EventId, Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. Duplicate ids are a silent no-op, never an error.
    pub fn insert(&mut self, event: Event) -> bool {
        match self.events.entry(event.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(event);
                true
            }
        }
    }

    pub fn by_id(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    pub fn remove(&mut self, id: &EventId) -> Option<Event> {
        self.events.remove(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events matching the filter, newest first, truncated to `filter.limit`.
    pub fn query(&self, filter: &Filter) -> Vec<Event> {
        let mut matched: Vec<Event> = self
            .events
            .values()
            .filter(|event| matches_filter(filter, event))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn matches_filter(filter: &Filter, event: &Event) -> bool {
    if let Some(ids) = &filter.ids {
        if !ids.contains(&event.id) {
            return false;
        }
    }
    if let Some(authors) = &filter.authors {
        if !authors.contains(&event.pubkey) {
            return false;
        }
    }
    if let Some(kinds) = &filter.kinds {
        if !kinds.contains(&event.kind) {
            return false;
        }
    }
    if let Some(since) = filter.since {
        if event.created_at < since {
            return false;
        }
    }
    if let Some(until) = filter.until {
        if event.created_at > until {
            return false;
        }
    }
    for (letter, values) in filter.generic_tags.iter() {
        let letter = letter.to_string();
        let hit = event.tags.iter().any(|tag| {
            let slice = tag.as_slice();
            slice.first().map(String::as_str) == Some(letter.as_str())
                && slice
                    .get(1)
                    .map(|value| values.contains(value))
                    .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }
    true
}
