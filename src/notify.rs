//! Notification aggregation: one live entry per (kind, target), bounded feed,
//! unseen-count recomputation.

use crate::kind::EventKind;
use crate::sorted::SortedIdSet;
use crate::tags;
use crate::traits::TrustGraph;
use nostr_sdk::{Event, EventId, PublicKey, Timestamp};
use std::collections::{HashMap, HashSet};

/// Mass-mentions beyond this many recipient tags never notify.
pub const MAX_NOTIFIED_RECIPIENTS: usize = 10;

/// Whether an event qualifies for a notification at all. Must be evaluated
/// *before* the follow handler mutates the trust graph, so a first-time
/// follow is still observable as such.
pub fn eligible(
    event: &Event,
    local: PublicKey,
    muted_notes: &HashSet<EventId>,
    trust: &dyn TrustGraph,
) -> bool {
    let recipients = tags::recipients(event);
    if recipients.len() > MAX_NOTIFIED_RECIPIENTS {
        return false;
    }
    if event.pubkey == local || !recipients.contains(&local) {
        return false;
    }
    if EventKind::from(event.kind) == EventKind::FollowList {
        // Re-sent follow lists from someone already following us don't renotify.
        if let Some(follows) = trust.followed_by(&event.pubkey) {
            if follows.contains(&local) {
                return false;
            }
        }
    }
    !is_muted(event, muted_notes)
}

/// Muted directly, or via any referenced ancestor.
pub fn is_muted(event: &Event, muted_notes: &HashSet<EventId>) -> bool {
    if muted_notes.contains(&event.id) {
        return true;
    }
    tags::referenced_events(event)
        .iter()
        .any(|id| muted_notes.contains(id))
}

/// Aggregation target: explicit thread root, else nearest reply parent, else
/// the event itself.
pub fn target(event: &Event) -> EventId {
    tags::thread_root(event)
        .or_else(|| tags::reply_parent(event))
        .unwrap_or(event.id)
}

/// The bounded notification feed with per-(kind, target) dedup.
pub struct NotificationFeed {
    feed: SortedIdSet,
    latest_by_key: HashMap<(u16, EventId), (EventId, Timestamp)>,
}

impl NotificationFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            feed: SortedIdSet::new(capacity),
            latest_by_key: HashMap::new(),
        }
    }

    /// Record a qualifying event. The live entry for (kind, target) is
    /// replaced only when the incoming event is strictly newer; the
    /// superseded entry leaves the feed before the new one is inserted.
    /// Returns whether the feed changed.
    pub fn add(&mut self, event: &Event) -> bool {
        let key = (event.kind.as_u16(), target(event));
        if let Some((existing, existing_at)) = self.latest_by_key.get(&key) {
            if *existing_at >= event.created_at {
                return false;
            }
            let superseded = *existing;
            self.feed.remove(&superseded);
        }
        self.latest_by_key
            .insert(key, (event.id, event.created_at));
        self.feed.insert(event.id, event.created_at);
        true
    }

    /// Notification ids, newest first.
    pub fn snapshot(&self) -> Vec<EventId> {
        self.feed.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.feed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feed.is_empty()
    }

    /// Count entries newer than the seen cursor. The feed is time-ordered,
    /// so the scan stops at the first entry that is not newer.
    pub fn unseen_count(&self, seen_at: Timestamp) -> usize {
        let mut count = 0;
        for (created_at, _) in self.feed.entries() {
            if *created_at > seen_at {
                count += 1;
            } else {
                break;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr_sdk::prelude::*;

    fn mention(author: &Keys, local: &PublicKey, root: Option<EventId>, created_at: u64) -> Event {
        let mut tags = vec![Tag::custom(TagKind::custom("p"), vec![local.to_hex()])];
        if let Some(root) = root {
            tags.push(Tag::custom(
                TagKind::custom("e"),
                vec![root.to_hex(), String::new(), "root".to_string()],
            ));
        }
        EventBuilder::new(Kind::Custom(1), "mention")
            .tags(tags)
            .custom_created_at(Timestamp::from(created_at))
            .sign_with_keys(author)
            .unwrap()
    }

    fn root_id() -> EventId {
        EventId::from_hex(&"ab".repeat(32)).unwrap()
    }

    #[test]
    fn dedups_per_kind_and_target_keeping_latest() {
        let author = Keys::generate();
        let local = Keys::generate().public_key();
        let root = root_id();
        let older = mention(&author, &local, Some(root), 100);
        let newer = mention(&author, &local, Some(root), 200);

        let mut feed = NotificationFeed::new(500);
        assert!(feed.add(&older));
        assert!(feed.add(&newer));
        // stale arrival does not resurrect
        assert!(!feed.add(&older));
        assert_eq!(feed.snapshot(), vec![newer.id]);
    }

    #[test]
    fn different_targets_keep_separate_entries() {
        let author = Keys::generate();
        let local = Keys::generate().public_key();
        let a = mention(&author, &local, Some(root_id()), 100);
        let b = mention(&author, &local, None, 200);

        let mut feed = NotificationFeed::new(500);
        feed.add(&a);
        feed.add(&b);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn unseen_count_stops_at_cursor() {
        let author = Keys::generate();
        let local = Keys::generate().public_key();
        let mut feed = NotificationFeed::new(500);
        for at in [100u64, 200, 300] {
            feed.add(&mention(&author, &local, None, at));
        }
        assert_eq!(feed.unseen_count(Timestamp::from(150)), 2);
        assert_eq!(feed.unseen_count(Timestamp::from(300)), 0);
        assert_eq!(feed.unseen_count(Timestamp::from(0)), 3);
    }

    #[test]
    fn target_resolution_order() {
        let author = Keys::generate();
        let local = Keys::generate().public_key();
        let root = root_id();
        let with_root = mention(&author, &local, Some(root), 100);
        assert_eq!(target(&with_root), root);
        let bare = mention(&author, &local, None, 100);
        assert_eq!(target(&bare), bare.id);
    }
}
