//! Shared test doubles and an engine harness for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use undertow::{
    DurableCache, EngineOptions, Identity, IngestEngine, LocalKeys, ReactiveState, Transport,
    TrustGraph,
};

#[derive(Default)]
pub struct FakeTrust {
    pub distances: RwLock<HashMap<PublicKey, u32>>,
    pub follower_counts: RwLock<HashMap<PublicKey, usize>>,
    /// follower -> set of followees, mutated through the trait.
    pub follows: RwLock<HashMap<PublicKey, HashSet<PublicKey>>>,
    pub blocked: RwLock<HashSet<PublicKey>>,
    pub flagged: RwLock<HashSet<PublicKey>>,
}

impl TrustGraph for FakeTrust {
    fn is_following(&self, follower: &PublicKey, followee: &PublicKey) -> bool {
        self.follows
            .read()
            .get(follower)
            .map(|set| set.contains(followee))
            .unwrap_or(false)
    }

    fn follow_distance(&self, key: &PublicKey) -> Option<u32> {
        self.distances.read().get(key).copied()
    }

    fn follower_count(&self, key: &PublicKey) -> usize {
        self.follower_counts.read().get(key).copied().unwrap_or(0)
    }

    fn add_follower(&self, followee: &PublicKey, follower: &PublicKey) {
        self.follows
            .write()
            .entry(*follower)
            .or_default()
            .insert(*followee);
    }

    fn remove_follower(&self, followee: &PublicKey, follower: &PublicKey) {
        if let Some(set) = self.follows.write().get_mut(follower) {
            set.remove(followee);
        }
    }

    fn followed_by(&self, author: &PublicKey) -> Option<HashSet<PublicKey>> {
        self.follows.read().get(author).cloned()
    }

    fn is_blocked(&self, key: &PublicKey) -> bool {
        self.blocked.read().contains(key)
    }

    fn replace_blocked(&self, keys: HashSet<PublicKey>) {
        *self.blocked.write() = keys;
    }

    fn replace_flagged(&self, keys: HashSet<PublicKey>) {
        *self.flagged.write() = keys;
    }
}

#[derive(Default)]
pub struct FakeTransport {
    pub published: Mutex<Vec<Event>>,
    pub subscribed_authors: RwLock<HashSet<PublicKey>>,
    pub subscribed_events: RwLock<HashSet<EventId>>,
    pub released: Mutex<Vec<EventId>>,
    pub relays: Mutex<Vec<String>>,
}

impl Transport for FakeTransport {
    fn publish(&self, event: Event) {
        self.published.lock().push(event);
    }

    fn is_subscribed_author(&self, key: &PublicKey) -> bool {
        self.subscribed_authors.read().contains(key)
    }

    fn is_subscribed_event(&self, id: &EventId) -> bool {
        self.subscribed_events.read().contains(id)
    }

    fn release_event_subscription(&self, id: &EventId) {
        self.released.lock().push(*id);
    }

    fn replace_relays(&self, urls: Vec<String>) {
        *self.relays.lock() = urls;
    }
}

#[derive(Default)]
pub struct RecordingCache {
    pub saved: Mutex<Vec<EventId>>,
}

#[async_trait]
impl DurableCache for RecordingCache {
    async fn save_event(&self, event: &Event) {
        self.saved.lock().push(event.id);
    }
}

#[derive(Default)]
pub struct RecordingState {
    pub puts: Mutex<Vec<(Vec<String>, serde_json::Value)>>,
}

impl ReactiveState for RecordingState {
    fn put(&self, path: &[&str], value: serde_json::Value) {
        let path = path.iter().map(|s| s.to_string()).collect();
        self.puts.lock().push((path, value));
    }
}

/// Identity port of an unauthenticated session.
pub struct AnonymousIdentity;

#[async_trait]
impl Identity for AnonymousIdentity {
    fn public_key(&self) -> Option<PublicKey> {
        None
    }

    async fn sign(&self, _unsigned: UnsignedEvent) -> anyhow::Result<Event> {
        anyhow::bail!("not signed in")
    }

    async fn decrypt(&self, _counterpart: &PublicKey, _ciphertext: &str) -> anyhow::Result<String> {
        anyhow::bail!("not signed in")
    }

    fn end_session(&self) {}
}

pub struct Harness {
    pub engine: IngestEngine,
    pub keys: Keys,
    pub trust: Arc<FakeTrust>,
    pub transport: Arc<FakeTransport>,
    pub cache: Arc<RecordingCache>,
    pub state: Arc<RecordingState>,
}

impl Harness {
    pub fn local(&self) -> PublicKey {
        self.keys.public_key()
    }

    /// Register an author at the given trust distance.
    pub fn at_distance(&self, key: PublicKey, distance: u32) {
        self.trust.distances.write().insert(key, distance);
    }
}

pub fn harness() -> Harness {
    harness_with(EngineOptions::default())
}

pub fn harness_with(options: EngineOptions) -> Harness {
    let keys = Keys::generate();
    let trust = Arc::new(FakeTrust::default());
    let transport = Arc::new(FakeTransport::default());
    let cache = Arc::new(RecordingCache::default());
    let state = Arc::new(RecordingState::default());
    trust.distances.write().insert(keys.public_key(), 0);
    let identity: Arc<dyn Identity> = Arc::new(LocalKeys::new(keys.clone()));
    let engine = IngestEngine::new(
        identity,
        trust.clone(),
        transport.clone(),
        cache.clone(),
        state.clone(),
        options,
    );
    Harness {
        engine,
        keys,
        trust,
        transport,
        cache,
        state,
    }
}

// ── Event builders ───────────────────────────────────────────────

pub fn note(author: &Keys, content: &str, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(1), content)
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn reply(author: &Keys, parent: &EventId, content: &str, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(1), content)
        .tags(vec![Tag::custom(
            TagKind::custom("e"),
            vec![parent.to_hex()],
        )])
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn profile(author: &Keys, name: &str, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(0), format!(r#"{{"name":"{name}"}}"#))
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn follow_list(author: &Keys, followees: &[PublicKey], created_at: u64) -> Event {
    let tags: Vec<Tag> = followees
        .iter()
        .map(|pk| Tag::custom(TagKind::custom("p"), vec![pk.to_hex()]))
        .collect();
    EventBuilder::new(Kind::Custom(3), "")
        .tags(tags)
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn mention(author: &Keys, target: &PublicKey, content: &str, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(1), content)
        .tags(vec![Tag::custom(
            TagKind::custom("p"),
            vec![target.to_hex()],
        )])
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn reaction(author: &Keys, target: &EventId, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(7), "+")
        .tags(vec![Tag::custom(
            TagKind::custom("e"),
            vec![target.to_hex()],
        )])
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn repost(author: &Keys, target: &EventId, created_at: u64) -> Event {
    EventBuilder::new(Kind::Custom(6), "")
        .tags(vec![Tag::custom(
            TagKind::custom("e"),
            vec![target.to_hex()],
        )])
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn nip04_dm(
    author: &Keys,
    recipient: &PublicKey,
    plaintext: &str,
    created_at: u64,
) -> Event {
    let cipher = nostr_sdk::nips::nip04::encrypt(author.secret_key(), recipient, plaintext).unwrap();
    EventBuilder::new(Kind::Custom(4), cipher)
        .tags(vec![Tag::custom(
            TagKind::custom("p"),
            vec![recipient.to_hex()],
        )])
        .custom_created_at(Timestamp::from(created_at))
        .sign_with_keys(author)
        .unwrap()
}

pub fn past(seconds_ago: u64) -> u64 {
    Timestamp::now().as_secs().saturating_sub(seconds_ago)
}
