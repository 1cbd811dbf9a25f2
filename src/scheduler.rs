//! Future-event buffering and the single replay timer.
//!
//! Events timestamped ahead of the local clock wait here instead of being
//! dispatched. The buffer is bounded: when full, the oldest *arrival* is
//! dropped, not the entry with the greatest timestamp. Replay ordering is by
//! `created_at`, earliest first.

use nostr_sdk::{Event, EventId, Timestamp};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct FutureBuffer {
    capacity: usize,
    events: HashMap<EventId, Event>,
    due: BTreeSet<(Timestamp, EventId)>,
    arrivals: VecDeque<EventId>,
}

impl FutureBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: HashMap::new(),
            due: BTreeSet::new(),
            arrivals: VecDeque::new(),
        }
    }

    /// Buffer an event. Duplicates are ignored; a full buffer drops its
    /// oldest arrival to make room.
    pub fn insert(&mut self, event: Event) -> bool {
        if self.events.contains_key(&event.id) {
            return false;
        }
        if self.events.len() >= self.capacity {
            if let Some(oldest) = self.arrivals.pop_front() {
                if let Some(dropped) = self.events.remove(&oldest) {
                    self.due.remove(&(dropped.created_at, dropped.id));
                }
            }
        }
        self.due.insert((event.created_at, event.id));
        self.arrivals.push_back(event.id);
        self.events.insert(event.id, event);
        true
    }

    /// Due time of the earliest buffered entry.
    pub fn earliest_due(&self) -> Option<Timestamp> {
        self.due.first().map(|(at, _)| *at)
    }

    /// Remove and return the earliest buffered entry.
    pub fn pop_earliest(&mut self) -> Option<Event> {
        let (_, id) = self.due.pop_first()?;
        self.arrivals.retain(|queued| queued != &id);
        self.events.remove(&id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Generation token for the single outstanding timer. A timer task captures
/// the token handed out by [`TimerSlot::arm`] and checks it when it fires;
/// rearming bumps the generation, which silently cancels every earlier task.
#[derive(Debug, Default)]
pub struct TimerSlot {
    generation: AtomicU64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the timer, cancelling any previously armed task.
    pub fn arm(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a token still owns the timer.
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}
