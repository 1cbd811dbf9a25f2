//! Collaborator ports consumed by the engine.
//!
//! The engine owns no cryptography, no trust-graph traversal and no network
//! transport; it talks to those subsystems through the traits below. Async
//! methods mark the only suspension points in the pipeline: signing,
//! decryption (which may resolve the counterpart's key remotely) and durable
//! cache writes.

use async_trait::async_trait;
use nostr_sdk::nips::nip04;
use nostr_sdk::{Event, EventId, Keys, PublicKey, UnsignedEvent};
use std::collections::HashSet;

/// Identity and signing collaborator.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Local identity, or None in an unauthenticated context (admission
    /// filtering is disabled entirely without one).
    fn public_key(&self) -> Option<PublicKey>;

    /// Sign a finalized event body.
    async fn sign(&self, unsigned: UnsignedEvent) -> anyhow::Result<Event>;

    /// Decrypt a NIP-04 payload exchanged with `counterpart`.
    async fn decrypt(&self, counterpart: &PublicKey, ciphertext: &str) -> anyhow::Result<String>;

    /// Invoked when the local profile arrives marked deleted.
    fn end_session(&self);
}

/// Social-graph queries and follower-edge mutation.
pub trait TrustGraph: Send + Sync {
    fn is_following(&self, follower: &PublicKey, followee: &PublicKey) -> bool;

    /// Follow distance from local identity, None if unknown.
    fn follow_distance(&self, key: &PublicKey) -> Option<u32>;

    fn follower_count(&self, key: &PublicKey) -> usize;

    fn add_follower(&self, followee: &PublicKey, follower: &PublicKey);

    fn remove_follower(&self, followee: &PublicKey, follower: &PublicKey);

    /// Keys `author` follows, if any follow list has been applied for them.
    fn followed_by(&self, author: &PublicKey) -> Option<HashSet<PublicKey>>;

    fn is_blocked(&self, key: &PublicKey) -> bool;

    /// Wholesale-replace the blocked set from a decrypted block list.
    fn replace_blocked(&self, keys: HashSet<PublicKey>);

    /// Wholesale-replace the flagged set from a flag list.
    fn replace_flagged(&self, keys: HashSet<PublicKey>);
}

/// Outward transport. Also exposes the explicit subscriptions the admission
/// filter honours as bypasses.
pub trait Transport: Send + Sync {
    fn publish(&self, event: Event);

    fn is_subscribed_author(&self, key: &PublicKey) -> bool;

    fn is_subscribed_event(&self, id: &EventId) -> bool;

    /// Release the one-shot subscription for an id once the event is handled.
    fn release_event_subscription(&self, id: &EventId);

    /// Replace the relay set from a self-authored follow list payload.
    fn replace_relays(&self, urls: Vec<String>);
}

/// Best-effort write-behind durable cache.
#[async_trait]
pub trait DurableCache: Send + Sync {
    async fn save_event(&self, event: &Event);
}

/// Path-addressable reactive local state. The engine externalizes chat
/// latest-message pointers, covert chat invites and the unseen-notification
/// count through it.
pub trait ReactiveState: Send + Sync {
    fn put(&self, path: &[&str], value: serde_json::Value);
}

/// [`Identity`] backed by an in-process keypair.
pub struct LocalKeys {
    keys: Keys,
}

impl LocalKeys {
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }
}

#[async_trait]
impl Identity for LocalKeys {
    fn public_key(&self) -> Option<PublicKey> {
        Some(self.keys.public_key())
    }

    async fn sign(&self, unsigned: UnsignedEvent) -> anyhow::Result<Event> {
        unsigned
            .sign_with_keys(&self.keys)
            .map_err(anyhow::Error::from)
    }

    async fn decrypt(&self, counterpart: &PublicKey, ciphertext: &str) -> anyhow::Result<String> {
        nip04::decrypt(self.keys.secret_key(), counterpart, ciphertext)
            .map_err(anyhow::Error::from)
    }

    fn end_session(&self) {}
}
