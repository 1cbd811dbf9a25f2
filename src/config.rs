//! Engine construction options and runtime-tunable filter settings.

use nostr_sdk::{EventId, Timestamp};
use std::collections::HashSet;
use std::time::Duration;

/// Fixed options chosen at engine construction.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Admission retries after a rejection (trust state converges async).
    pub admission_retries: u32,
    /// Delay between admission retries.
    pub retry_delay: Duration,
    /// Future-event buffer capacity; oldest arrival evicted when full.
    pub future_capacity: usize,
    /// Notification feed capacity.
    pub notification_capacity: usize,
    /// Decrypted DM plaintext cache capacity.
    pub decrypted_cache_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            admission_retries: 2,
            retry_delay: Duration::from_secs(3),
            future_capacity: 100,
            notification_capacity: 500,
            decrypted_cache_capacity: 1000,
        }
    }
}

/// Runtime-tunable admission and notification settings. The embedding client
/// updates these from its settings store.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    /// Maximum accepted follow distance. Zero disables admission filtering.
    pub max_follow_distance: u32,
    /// Follower floor for authors exactly at the maximum distance.
    pub min_followers_at_max_distance: usize,
    /// Muted note ids; mutes propagate to events referencing them.
    pub muted_notes: HashSet<EventId>,
    /// Persisted "last seen notifications" cursor. None until first set;
    /// the unseen count is not recomputed before that.
    pub notifications_seen_at: Option<Timestamp>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            max_follow_distance: 3,
            min_followers_at_max_distance: 5,
            muted_notes: HashSet::new(),
            notifications_seen_at: None,
        }
    }
}
