//! Admission filter: accept or reject an inbound event before any side effect.
//!
//! Trust-graph state converges asynchronously, so a rejection here is
//! transient from the caller's point of view — the engine retries a bounded
//! number of times before dropping the event for good.

use crate::config::FilterSettings;
use crate::index::RelationIndices;
use crate::kind::EventKind;
use crate::traits::{Transport, TrustGraph};
use nostr_sdk::{Event, PublicKey};

/// Decide whether `event` may enter the store and indices.
pub fn accept(
    event: &Event,
    settings: &FilterSettings,
    local: Option<PublicKey>,
    trust: &dyn TrustGraph,
    transport: &dyn Transport,
    indices: &RelationIndices,
) -> bool {
    // Filtering is disabled entirely when unauthenticated or unconfigured.
    if settings.max_follow_distance == 0 || local.is_none() {
        return true;
    }

    // DMs always pass here: anonymous covert-chat invites must reach the
    // direct-message pipeline, which does its own validation.
    if EventKind::from(event.kind) == EventKind::DirectMessage {
        return true;
    }

    // Explicit subscriptions bypass distance checks.
    if transport.is_subscribed_author(&event.pubkey) || transport.is_subscribed_event(&event.id) {
        return true;
    }

    match trust.follow_distance(&event.pubkey) {
        Some(0) => true,
        Some(distance) if distance > settings.max_follow_distance => false,
        Some(distance) if distance == settings.max_follow_distance => {
            trust.follower_count(&event.pubkey) >= settings.min_followers_at_max_distance
        }
        Some(_) => true,
        // Unknown distance: notes already carrying a positive signal (a like
        // or repost from someone we admitted) get through, the rest don't.
        None => {
            EventKind::from(event.kind) == EventKind::Note
                && indices.has_positive_signal(&event.id)
        }
    }
}
