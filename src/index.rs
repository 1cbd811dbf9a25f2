//! Derived relation indices over the event store.
//!
//! Every map here holds bare ids or pubkeys referencing events owned by
//! [`crate::store::EventStore`]. Entries are append-only per key; replaceable
//! records (profiles, follow lists, key-value registers) track the latest
//! event with its timestamp so strictly-newer-wins checks can be re-evaluated
//! at the point of mutation.

use crate::sorted::SortedIdSet;
use nostr_sdk::{Event, EventId, PublicKey, Timestamp};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Zap receipts retained per note; oldest are evicted beyond this.
pub const MAX_ZAPS_PER_NOTE: usize = 1000;

/// Latest profile metadata for an author, parsed from a kind 0 event.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub event_id: EventId,
    pub created_at: Timestamp,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub deleted: bool,
}

impl ProfileRecord {
    /// Parse profile content JSON. Returns None on unparsable payloads.
    pub fn parse(event: &Event) -> Option<Self> {
        let value: Value = serde_json::from_str(&event.content).ok()?;
        let map = value.as_object()?;
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            event_id: event.id,
            created_at: event.created_at,
            name: text("name"),
            display_name: text("display_name"),
            deleted: map.get("deleted").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

#[derive(Debug, Default)]
pub struct RelationIndices {
    direct_replies: HashMap<EventId, HashSet<EventId>>,
    thread_replies: HashMap<EventId, HashSet<EventId>>,
    likes: HashMap<EventId, HashSet<PublicKey>>,
    reposts: HashMap<EventId, HashSet<PublicKey>>,
    zaps: HashMap<EventId, SortedIdSet>,
    /// Last-write-wins register keyed by the event's `d` tag (self-authored only).
    key_values: HashMap<String, (EventId, Timestamp)>,
    profiles: HashMap<PublicKey, ProfileRecord>,
    /// Lowercased profile names for prefix search.
    names: BTreeMap<String, PublicKey>,
    /// Latest follow list per author.
    follow_lists: HashMap<PublicKey, (EventId, Timestamp)>,
}

impl RelationIndices {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Replies ──────────────────────────────────────────────────

    pub fn add_direct_reply(&mut self, parent: EventId, reply: EventId) -> bool {
        self.direct_replies.entry(parent).or_default().insert(reply)
    }

    pub fn add_thread_reply(&mut self, ancestor: EventId, reply: EventId) -> bool {
        self.thread_replies
            .entry(ancestor)
            .or_default()
            .insert(reply)
    }

    pub fn direct_replies(&self, id: &EventId) -> HashSet<EventId> {
        self.direct_replies.get(id).cloned().unwrap_or_default()
    }

    pub fn thread_reply_count(&self, id: &EventId) -> usize {
        self.thread_replies.get(id).map(HashSet::len).unwrap_or(0)
    }

    // ── Likes / reposts / zaps ───────────────────────────────────

    pub fn add_like(&mut self, target: EventId, author: PublicKey) -> bool {
        self.likes.entry(target).or_default().insert(author)
    }

    /// Record a repost. At most one per (target, author); returns whether
    /// this author was newly recorded.
    pub fn add_repost(&mut self, target: EventId, author: PublicKey) -> bool {
        self.reposts.entry(target).or_default().insert(author)
    }

    pub fn add_zap(&mut self, target: EventId, receipt: EventId, created_at: Timestamp) -> bool {
        self.zaps
            .entry(target)
            .or_insert_with(|| SortedIdSet::new(MAX_ZAPS_PER_NOTE))
            .insert(receipt, created_at)
    }

    pub fn likes(&self, id: &EventId) -> HashSet<PublicKey> {
        self.likes.get(id).cloned().unwrap_or_default()
    }

    pub fn reposts(&self, id: &EventId) -> HashSet<PublicKey> {
        self.reposts.get(id).cloned().unwrap_or_default()
    }

    /// Zap receipt ids for a note, newest first.
    pub fn zaps(&self, id: &EventId) -> Vec<EventId> {
        self.zaps
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether the target carries any positive signal (like or repost).
    /// Consulted by admission for authors at unknown follow distance.
    pub fn has_positive_signal(&self, id: &EventId) -> bool {
        self.likes.get(id).map(|s| !s.is_empty()).unwrap_or(false)
            || self.reposts.get(id).map(|s| !s.is_empty()).unwrap_or(false)
    }

    // ── Key-value registers ──────────────────────────────────────

    /// Record a key-value event if strictly newer than the current entry.
    /// Returns the replaced event id when the register advanced.
    pub fn put_key_value(
        &mut self,
        key: String,
        event_id: EventId,
        created_at: Timestamp,
    ) -> Option<Option<EventId>> {
        match self.key_values.get(&key) {
            Some((_, existing)) if *existing >= created_at => None,
            Some((old, _)) => {
                let old = *old;
                self.key_values.insert(key, (event_id, created_at));
                Some(Some(old))
            }
            None => {
                self.key_values.insert(key, (event_id, created_at));
                Some(None)
            }
        }
    }

    pub fn key_value(&self, key: &str) -> Option<EventId> {
        self.key_values.get(key).map(|(id, _)| *id)
    }

    // ── Profiles ─────────────────────────────────────────────────

    /// Record a profile if strictly newer than the stored one. Returns the
    /// replaced record when the profile advanced.
    pub fn put_profile(
        &mut self,
        author: PublicKey,
        record: ProfileRecord,
    ) -> Option<Option<ProfileRecord>> {
        if let Some(existing) = self.profiles.get(&author) {
            if existing.created_at >= record.created_at {
                return None;
            }
        }
        for name in [&record.name, &record.display_name].into_iter().flatten() {
            self.names.insert(name.to_lowercase(), author);
        }
        Some(self.profiles.insert(author, record))
    }

    pub fn profile(&self, author: &PublicKey) -> Option<&ProfileRecord> {
        self.profiles.get(author)
    }

    /// Prefix search over profile names and display names.
    pub fn search_names(&self, query: &str) -> Vec<PublicKey> {
        let prefix = query.to_lowercase();
        self.names
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .map(|(_, pk)| *pk)
            .collect()
    }

    // ── Follow lists ─────────────────────────────────────────────

    /// Record a follow list if strictly newer. Returns the replaced event id
    /// when the list advanced.
    pub fn put_follow_list(
        &mut self,
        author: PublicKey,
        event_id: EventId,
        created_at: Timestamp,
    ) -> Option<Option<EventId>> {
        match self.follow_lists.get(&author) {
            Some((_, existing)) if *existing >= created_at => None,
            Some((old, _)) => {
                let old = *old;
                self.follow_lists.insert(author, (event_id, created_at));
                Some(Some(old))
            }
            None => {
                self.follow_lists.insert(author, (event_id, created_at));
                Some(None)
            }
        }
    }

    pub fn follow_list(&self, author: &PublicKey) -> Option<EventId> {
        self.follow_lists.get(author).map(|(id, _)| *id)
    }

    /// Forget index entries pointing at a removed event. Only replaceable
    /// registers need eager cleanup; plain back-references may dangle.
    pub fn forget_event(&mut self, id: &EventId) {
        self.key_values.retain(|_, (event, _)| event != id);
        self.follow_lists.retain(|_, (event, _)| event != id);
    }
}
