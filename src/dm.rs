//! Direct-message pipeline: chat routing, covert-chat invites and the
//! per-chat latest-message projection.
//!
//! Decryption is asynchronous and happens in the engine before any state
//! here is touched; everything in this module is synchronous so the
//! "existing value is older" check cannot race a suspension point.

use lru::LruCache;
use nostr_sdk::{Event, EventId, JsonUtil, Keys, PublicKey, Timestamp};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::LazyLock;

use crate::tags;

/// Covert chat invites carry a bech32 secret key inside the inner event.
static NSEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)nsec1[023456789acdefghjklmnpqrstuvwxyz]{6,}").expect("static regex")
});

/// Where a direct message belongs, resolved before decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmRoute {
    /// The chat this message files under.
    pub chat: PublicKey,
    /// The other party of the NIP-04 exchange (for key resolution).
    pub counterpart: PublicKey,
    /// The message is self-addressed by its sender: possibly an anonymous
    /// covert-chat invite, to be confirmed after decryption.
    pub maybe_secret_invite: bool,
}

/// Resolve the chat identity for a direct message, or None to drop it.
pub fn resolve_route(event: &Event, local: PublicKey) -> Option<DmRoute> {
    if event.pubkey == local {
        // Self-authored: the chat is the tagged recipient.
        let recipient = tags::recipients(event).into_iter().next()?;
        return Some(DmRoute {
            chat: recipient,
            counterpart: recipient,
            maybe_secret_invite: false,
        });
    }
    let recipients = tags::recipients(event);
    if recipients.contains(&local) {
        return Some(DmRoute {
            chat: event.pubkey,
            counterpart: event.pubkey,
            maybe_secret_invite: false,
        });
    }
    // Not for us. A message whose only recipient tag is its own sender may
    // be an anonymous covert-chat invite.
    let self_addressed = event.tags.len() == 1 && recipients == vec![event.pubkey];
    if self_addressed {
        return Some(DmRoute {
            chat: event.pubkey,
            counterpart: event.pubkey,
            maybe_secret_invite: true,
        });
    }
    None
}

/// A validated covert-chat invite carried inside a decrypted DM.
pub struct ChatInvite {
    /// Author of the signed inner event.
    pub inviter: PublicKey,
    /// The shared chat secret embedded in the invite.
    pub secret: Keys,
}

/// Inspect a decrypted payload for an embedded, signature-valid inner event
/// carrying a chat secret.
pub fn detect_invite(plaintext: &str) -> Option<ChatInvite> {
    let start = plaintext.find('{')?;
    let inner = Event::from_json(&plaintext[start..]).ok()?;
    inner.verify().ok()?;
    let nsec = NSEC_RE.find(&inner.content)?.as_str();
    let secret = Keys::parse(nsec).ok()?;
    Some(ChatInvite {
        inviter: inner.pubkey,
        secret,
    })
}

/// Latest-message pointer of a chat; monotonic by `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestMessage {
    pub id: EventId,
    pub created_at: Timestamp,
    pub text: String,
}

#[derive(Debug, Default)]
struct ChatRecord {
    latest: Option<LatestMessage>,
    messages: HashSet<EventId>,
}

/// Mutable DM-pipeline state: chats, invites, decrypted plaintext cache.
pub struct DmState {
    chats: HashMap<PublicKey, ChatRecord>,
    /// Inviter pubkey → chat secret pubkey of recorded covert chats.
    invites: HashMap<PublicKey, PublicKey>,
    decrypted: LruCache<EventId, String>,
}

impl DmState {
    pub fn new(decrypted_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(decrypted_capacity.max(1)).expect("nonzero");
        Self {
            chats: HashMap::new(),
            invites: HashMap::new(),
            decrypted: LruCache::new(capacity),
        }
    }

    /// Create or join the chat referenced by an invite. Returns false when
    /// the invite was already recorded.
    pub fn record_invite(&mut self, invite: &ChatInvite) -> bool {
        let chat_key = invite.secret.public_key();
        self.chats.entry(chat_key).or_default();
        self.invites.insert(invite.inviter, chat_key) != Some(chat_key)
    }

    pub fn invite_chat(&self, inviter: &PublicKey) -> Option<PublicKey> {
        self.invites.get(inviter).copied()
    }

    /// File a decrypted message under its chat. The latest-message pointer
    /// advances only on a strictly greater timestamp; ties keep the
    /// existing value.
    pub fn apply_message(
        &mut self,
        chat: PublicKey,
        id: EventId,
        created_at: Timestamp,
        text: String,
    ) -> bool {
        let record = self.chats.entry(chat).or_default();
        record.messages.insert(id);
        let newer = match &record.latest {
            Some(latest) => created_at > latest.created_at,
            None => true,
        };
        if newer {
            record.latest = Some(LatestMessage {
                id,
                created_at,
                text,
            });
        }
        newer
    }

    pub fn latest(&self, chat: &PublicKey) -> Option<&LatestMessage> {
        self.chats.get(chat).and_then(|record| record.latest.as_ref())
    }

    pub fn message_count(&self, chat: &PublicKey) -> usize {
        self.chats.get(chat).map(|r| r.messages.len()).unwrap_or(0)
    }

    pub fn cache_plaintext(&mut self, id: EventId, text: String) {
        self.decrypted.put(id, text);
    }

    pub fn plaintext(&mut self, id: &EventId) -> Option<String> {
        self.decrypted.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr_sdk::prelude::*;

    fn dm(author: &Keys, recipients: &[PublicKey]) -> Event {
        let tags: Vec<Tag> = recipients
            .iter()
            .map(|pk| Tag::custom(TagKind::custom("p"), vec![pk.to_hex()]))
            .collect();
        // the builder strips author-matching p tags by default, which would
        // erase the self-addressed shape under test
        EventBuilder::new(Kind::Custom(4), "cipher")
            .tags(tags)
            .allow_self_tagging()
            .sign_with_keys(author)
            .unwrap()
    }

    #[test]
    fn inbound_dm_files_under_sender() {
        let local = Keys::generate();
        let sender = Keys::generate();
        let event = dm(&sender, &[local.public_key()]);
        let route = resolve_route(&event, local.public_key()).unwrap();
        assert_eq!(route.chat, sender.public_key());
        assert!(!route.maybe_secret_invite);
    }

    #[test]
    fn own_dm_files_under_recipient() {
        let local = Keys::generate();
        let peer = Keys::generate();
        let event = dm(&local, &[peer.public_key()]);
        let route = resolve_route(&event, local.public_key()).unwrap();
        assert_eq!(route.chat, peer.public_key());
        assert_eq!(route.counterpart, peer.public_key());
    }

    #[test]
    fn self_addressed_dm_is_possible_invite() {
        let local = Keys::generate();
        let sender = Keys::generate();
        let event = dm(&sender, &[sender.public_key()]);
        let route = resolve_route(&event, local.public_key()).unwrap();
        assert!(route.maybe_secret_invite);
    }

    #[test]
    fn unrelated_dm_is_dropped() {
        let local = Keys::generate();
        let sender = Keys::generate();
        let other = Keys::generate();
        let event = dm(&sender, &[other.public_key()]);
        assert!(resolve_route(&event, local.public_key()).is_none());
    }

    #[test]
    fn invite_detected_from_embedded_event() {
        let inviter = Keys::generate();
        let secret = Keys::generate();
        let nsec = secret.secret_key().to_bech32().unwrap();
        let inner = EventBuilder::new(Kind::Custom(4), format!("join me: {nsec}"))
            .sign_with_keys(&inviter)
            .unwrap();
        let plaintext = format!("invitation {}", inner.as_json());

        let invite = detect_invite(&plaintext).expect("invite detected");
        assert_eq!(invite.inviter, inviter.public_key());
        assert_eq!(invite.secret.public_key(), secret.public_key());
    }

    #[test]
    fn tampered_inner_event_is_ignored() {
        let inviter = Keys::generate();
        let secret = Keys::generate();
        let nsec = secret.secret_key().to_bech32().unwrap();
        let inner = EventBuilder::new(Kind::Custom(4), format!("join me: {nsec}"))
            .sign_with_keys(&inviter)
            .unwrap();
        let tampered = inner.as_json().replace("join me", "join us");
        assert!(detect_invite(&tampered).is_none());
    }

    #[test]
    fn plain_message_is_not_an_invite() {
        assert!(detect_invite("just saying hello {not json}").is_none());
    }

    #[test]
    fn latest_pointer_is_monotonic_with_ties_kept() {
        let mut state = DmState::new(16);
        let chat = Keys::generate().public_key();
        let first = EventId::from_hex(&"aa".repeat(32)).unwrap();
        let second = EventId::from_hex(&"bb".repeat(32)).unwrap();
        let third = EventId::from_hex(&"cc".repeat(32)).unwrap();

        assert!(state.apply_message(chat, first, Timestamp::from(100), "one".into()));
        // strictly newer advances
        assert!(state.apply_message(chat, second, Timestamp::from(200), "two".into()));
        // a tie keeps the existing value
        assert!(!state.apply_message(chat, third, Timestamp::from(200), "three".into()));
        let latest = state.latest(&chat).unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(state.message_count(&chat), 3);
    }
}
