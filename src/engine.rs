//! The ingestion engine: admission, kind dispatch, index mutation, future
//! replay, notifications and the publish pipeline.
//!
//! All index state lives behind `parking_lot` locks that are never held
//! across an `.await`; the only suspension points are signing, decryption and
//! durable-cache writes. Handlers gather their async inputs first and apply
//! the resulting mutation as one uninterrupted step, re-checking any
//! "existing value is older" condition at that point.

use nostr_sdk::{Event, EventBuilder, EventId, Filter, PublicKey, Timestamp};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::admission;
use crate::config::{EngineOptions, FilterSettings};
use crate::dm::{self, DmState, LatestMessage};
use crate::error::PublishError;
use crate::index::{ProfileRecord, RelationIndices};
use crate::kind::EventKind;
use crate::notify::{self, NotificationFeed};
use crate::scheduler::{FutureBuffer, TimerSlot};
use crate::store::EventStore;
use crate::tags;
use crate::traits::{DurableCache, Identity, ReactiveState, Transport, TrustGraph};

/// Ancestors re-announced after publishing an event that references them.
const MAX_GOSSIPED_ANCESTORS: usize = 10;

/// Referenced ancestors indexed as thread parents per reply.
const MAX_THREAD_ANCESTORS: usize = 2;

/// A change to a derived index, emitted on the live-update stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Replies(EventId),
    ThreadReplies(EventId),
    Likes(EventId),
    Reposts(EventId),
    Zaps(EventId),
    Notifications,
    ChatLatest(PublicKey),
}

/// Per-call handling options.
#[derive(Debug, Clone, Copy)]
pub struct HandleOptions {
    /// Bypass the dedup gate and the admission filter (future-event replay
    /// and publish self-delivery).
    pub force: bool,
    /// Consider the event for the tiered durable cache.
    pub persist: bool,
    /// Remaining admission retries.
    pub retries: u32,
}

struct Moderation {
    block_at: Option<Timestamp>,
    flag_at: Option<Timestamp>,
}

struct Inner {
    options: EngineOptions,
    settings: RwLock<FilterSettings>,
    identity: Arc<dyn Identity>,
    trust: Arc<dyn TrustGraph>,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn DurableCache>,
    state: Arc<dyn ReactiveState>,
    store: RwLock<EventStore>,
    indices: RwLock<RelationIndices>,
    seen: Mutex<HashSet<EventId>>,
    deleted: Mutex<HashSet<EventId>>,
    future: Mutex<FutureBuffer>,
    future_timer: TimerSlot,
    dm: Mutex<DmState>,
    notifications: Mutex<NotificationFeed>,
    moderation: Mutex<Moderation>,
    changes: broadcast::Sender<IndexChange>,
    unseen_tx: watch::Sender<usize>,
    unseen_rx: watch::Receiver<usize>,
    unseen_pending: AtomicBool,
}

/// Cheaply cloneable handle to the engine; all state is shared.
#[derive(Clone)]
pub struct IngestEngine {
    inner: Arc<Inner>,
}

impl IngestEngine {
    pub fn new(
        identity: Arc<dyn Identity>,
        trust: Arc<dyn TrustGraph>,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn DurableCache>,
        state: Arc<dyn ReactiveState>,
        options: EngineOptions,
    ) -> Self {
        let (changes, _) = broadcast::channel(256);
        let (unseen_tx, unseen_rx) = watch::channel(0);
        let inner = Inner {
            settings: RwLock::new(FilterSettings::default()),
            identity,
            trust,
            transport,
            cache,
            state,
            store: RwLock::new(EventStore::new()),
            indices: RwLock::new(RelationIndices::new()),
            seen: Mutex::new(HashSet::new()),
            deleted: Mutex::new(HashSet::new()),
            future: Mutex::new(FutureBuffer::new(options.future_capacity)),
            future_timer: TimerSlot::new(),
            dm: Mutex::new(DmState::new(options.decrypted_cache_capacity)),
            notifications: Mutex::new(NotificationFeed::new(options.notification_capacity)),
            moderation: Mutex::new(Moderation {
                block_at: None,
                flag_at: None,
            }),
            changes,
            unseen_tx,
            unseen_rx,
            unseen_pending: AtomicBool::new(false),
            options,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // ── Inbound path ─────────────────────────────────────────────

    /// Handle an inbound event with default options. Returns whether the
    /// event was admitted and fully processed.
    pub async fn handle(&self, event: Event) -> bool {
        let retries = self.inner.options.admission_retries;
        self.handle_with(
            event,
            HandleOptions {
                force: false,
                persist: true,
                retries,
            },
        )
        .await
    }

    /// Handle an inbound event with explicit options.
    pub async fn handle_with(&self, event: Event, opts: HandleOptions) -> bool {
        let id = event.id;

        if !opts.force && self.inner.seen.lock().contains(&id) {
            return false;
        }
        if event.verify().is_err() {
            debug!(id = %id, "event failed id/signature validation, dropped");
            return false;
        }
        if !opts.force && !self.accept(&event) {
            if opts.retries > 0 {
                self.schedule_retry(event, opts);
            } else {
                debug!(id = %id, "event dropped after exhausting admission retries");
            }
            return false;
        }
        // Profiles from blocked authors still pass so names keep resolving.
        if self.inner.trust.is_blocked(&event.pubkey)
            && EventKind::from(event.kind) != EventKind::Profile
        {
            return false;
        }
        if self.inner.deleted.lock().contains(&id) {
            return false;
        }
        if event.created_at > Timestamp::now() {
            self.inner.future.lock().insert(event);
            self.schedule_future_replay();
            return false;
        }

        self.inner.seen.lock().insert(id);
        self.inner.transport.release_event_subscription(&id);

        let applied = self.dispatch(&event).await;
        if !applied {
            return false;
        }
        if opts.persist {
            self.persist_tiered(&event).await;
        }
        true
    }

    fn accept(&self, event: &Event) -> bool {
        let settings = self.inner.settings.read();
        let indices = self.inner.indices.read();
        admission::accept(
            event,
            &settings,
            self.inner.identity.public_key(),
            self.inner.trust.as_ref(),
            self.inner.transport.as_ref(),
            &indices,
        )
    }

    fn schedule_retry(&self, event: Event, opts: HandleOptions) {
        let engine = self.clone();
        let delay = self.inner.options.retry_delay;
        let opts = HandleOptions {
            retries: opts.retries - 1,
            ..opts
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.handle_with(event, opts).await;
        });
    }

    // ── Kind dispatch ────────────────────────────────────────────

    async fn dispatch(&self, event: &Event) -> bool {
        match EventKind::from(event.kind) {
            EventKind::Profile => self.handle_profile(event),
            EventKind::Note => {
                self.maybe_notify(event);
                if tags::is_repost(event) {
                    self.handle_repost(event)
                } else {
                    self.handle_note(event)
                }
            }
            EventKind::FollowList => self.handle_follow_list(event),
            EventKind::DirectMessage => self.handle_direct_message(event).await,
            EventKind::Deletion => self.handle_deletion(event),
            EventKind::Repost => {
                self.maybe_notify(event);
                self.handle_repost(event)
            }
            EventKind::Reaction => {
                self.maybe_notify(event);
                self.handle_reaction(event)
            }
            EventKind::ZapReceipt => {
                self.maybe_notify(event);
                self.handle_zap(event)
            }
            EventKind::BlockList => self.handle_block_list(event).await,
            EventKind::FlagList => self.handle_flag_list(event),
            EventKind::KeyValue => self.handle_key_value(event),
            EventKind::Other(kind) => {
                debug!(kind, id = %event.id, "stored event of unindexed kind");
                self.inner.store.write().insert(event.clone());
                true
            }
        }
    }

    fn handle_profile(&self, event: &Event) -> bool {
        let Some(record) = ProfileRecord::parse(event) else {
            debug!(id = %event.id, "unparsable profile payload dropped");
            return false;
        };
        let deleted = record.deleted;
        let replaced = {
            let mut indices = self.inner.indices.write();
            match indices.put_profile(event.pubkey, record) {
                Some(replaced) => replaced,
                None => return false,
            }
        };
        {
            let mut store = self.inner.store.write();
            if let Some(old) = replaced {
                store.remove(&old.event_id);
            }
            store.insert(event.clone());
        }
        if deleted && self.inner.identity.public_key() == Some(event.pubkey) {
            info!("local profile marked deleted, ending session");
            self.inner.identity.end_session();
        }
        true
    }

    fn handle_note(&self, event: &Event) -> bool {
        self.inner.store.write().insert(event.clone());
        let Some(parent) = tags::reply_parent(event) else {
            return true;
        };
        let ancestors: Vec<EventId> = tags::referenced_events(event)
            .into_iter()
            .take(MAX_THREAD_ANCESTORS)
            .collect();
        {
            let mut indices = self.inner.indices.write();
            indices.add_direct_reply(parent, event.id);
            for ancestor in &ancestors {
                indices.add_thread_reply(*ancestor, event.id);
            }
        }
        self.emit(IndexChange::Replies(parent));
        for ancestor in ancestors {
            self.emit(IndexChange::ThreadReplies(ancestor));
        }
        true
    }

    fn handle_repost(&self, event: &Event) -> bool {
        let Some(original) = tags::reposted_event_id(event) else {
            return true;
        };
        let newly_recorded = self
            .inner
            .indices
            .write()
            .add_repost(original, event.pubkey);
        if newly_recorded {
            self.inner.store.write().insert(event.clone());
            self.emit(IndexChange::Reposts(original));
        }
        true
    }

    fn handle_reaction(&self, event: &Event) -> bool {
        let Some(liked) = tags::referenced_events(event).last().copied() else {
            return true;
        };
        self.inner.indices.write().add_like(liked, event.pubkey);
        self.inner.store.write().insert(event.clone());
        self.emit(IndexChange::Likes(liked));
        true
    }

    fn handle_zap(&self, event: &Event) -> bool {
        self.inner.store.write().insert(event.clone());
        let Some(zapped) = tags::referenced_events(event).first().copied() else {
            return true;
        };
        self.inner
            .indices
            .write()
            .add_zap(zapped, event.id, event.created_at);
        self.emit(IndexChange::Zaps(zapped));
        true
    }

    fn handle_follow_list(&self, event: &Event) -> bool {
        // Snapshot the author's previous follow set before any mutation so
        // first-follow notifications and edge diffing see the old state.
        let previous = self.inner.trust.followed_by(&event.pubkey);

        let replaced = {
            let mut indices = self.inner.indices.write();
            match indices.put_follow_list(event.pubkey, event.id, event.created_at) {
                Some(replaced) => replaced,
                None => return false,
            }
        };
        self.maybe_notify(event);
        {
            let mut store = self.inner.store.write();
            if let Some(old) = replaced {
                store.remove(&old);
            }
            store.insert(event.clone());
        }

        let now_followed: HashSet<PublicKey> = tags::recipients(event).into_iter().collect();
        for followee in &now_followed {
            self.inner.trust.add_follower(followee, &event.pubkey);
        }
        if let Some(previous) = previous {
            for dropped in previous.difference(&now_followed) {
                self.inner.trust.remove_follower(dropped, &event.pubkey);
            }
        }

        // A self-authored follow list may carry the relay set in its content.
        if self.inner.identity.public_key() == Some(event.pubkey) && !event.content.is_empty() {
            match serde_json::from_str::<Value>(&event.content) {
                Ok(Value::Object(relays)) => {
                    let urls: Vec<String> = relays.keys().cloned().collect();
                    if !urls.is_empty() {
                        info!(count = urls.len(), "replacing relay set from follow list");
                        self.inner.transport.replace_relays(urls);
                    }
                }
                _ => debug!(id = %event.id, "follow list content is not a relay object"),
            }
        }
        true
    }

    fn handle_deletion(&self, event: &Event) -> bool {
        let Some(target) = tags::referenced_events(event).first().copied() else {
            return true;
        };
        let victim_author = {
            let store = self.inner.store.read();
            store.by_id(&target).map(|victim| victim.pubkey)
        };
        let Some(victim_author) = victim_author else {
            return true;
        };
        // Only the original author or the local identity may delete.
        let authorized = victim_author == event.pubkey
            || self.inner.identity.public_key() == Some(victim_author);
        if !authorized {
            debug!(id = %event.id, "unauthorized deletion ignored");
            return true;
        }
        self.inner.store.write().remove(&target);
        self.inner.indices.write().forget_event(&target);
        self.inner.deleted.lock().insert(target);
        true
    }

    async fn handle_block_list(&self, event: &Event) -> bool {
        if self.inner.identity.public_key() != Some(event.pubkey) {
            return false;
        }
        if let Some(existing) = self.inner.moderation.lock().block_at {
            if existing > event.created_at {
                return false;
            }
        }
        // Decrypt before taking any lock; re-check ordering afterwards.
        let plaintext = match self
            .inner
            .identity
            .decrypt(&event.pubkey, &event.content)
            .await
        {
            Ok(plaintext) => plaintext,
            Err(error) => {
                debug!(%error, "failed to decrypt block list");
                return false;
            }
        };
        let Some(blocked) = parse_key_list(&plaintext) else {
            debug!(id = %event.id, "unparsable block list dropped");
            return false;
        };
        {
            let mut moderation = self.inner.moderation.lock();
            if let Some(existing) = moderation.block_at {
                if existing > event.created_at {
                    return false;
                }
            }
            moderation.block_at = Some(event.created_at);
        }
        self.inner.trust.replace_blocked(blocked);
        self.inner.store.write().insert(event.clone());
        true
    }

    fn handle_flag_list(&self, event: &Event) -> bool {
        if self.inner.identity.public_key() != Some(event.pubkey) {
            return false;
        }
        // Parse before advancing the register, so a malformed list never
        // shadows a later valid one.
        let Some(flagged) = parse_key_list(&event.content) else {
            debug!(id = %event.id, "unparsable flag list dropped");
            return false;
        };
        {
            let mut moderation = self.inner.moderation.lock();
            if let Some(existing) = moderation.flag_at {
                if existing > event.created_at {
                    return false;
                }
            }
            moderation.flag_at = Some(event.created_at);
        }
        self.inner.trust.replace_flagged(flagged);
        self.inner.store.write().insert(event.clone());
        true
    }

    fn handle_key_value(&self, event: &Event) -> bool {
        if self.inner.identity.public_key() != Some(event.pubkey) {
            return false;
        }
        let Some(key) = tags::d_tag(event) else {
            return false;
        };
        let replaced = {
            let mut indices = self.inner.indices.write();
            match indices.put_key_value(key, event.id, event.created_at) {
                Some(replaced) => replaced,
                None => return false,
            }
        };
        let mut store = self.inner.store.write();
        if let Some(old) = replaced {
            store.remove(&old);
        }
        store.insert(event.clone());
        true
    }

    async fn handle_direct_message(&self, event: &Event) -> bool {
        let Some(local) = self.inner.identity.public_key() else {
            return false;
        };
        let Some(route) = dm::resolve_route(event, local) else {
            return false;
        };
        // Key resolution and decryption are the suspension points; no state
        // is touched until they finish.
        let plaintext = match self
            .inner
            .identity
            .decrypt(&route.counterpart, &event.content)
            .await
        {
            Ok(plaintext) => plaintext,
            Err(error) => {
                debug!(id = %event.id, %error, "direct message decryption failed, skipping");
                return false;
            }
        };

        if let Some(invite) = dm::detect_invite(&plaintext) {
            self.inner.dm.lock().record_invite(&invite);
            let secret = invite
                .secret
                .secret_key()
                .to_secret_hex();
            self.inner.state.put(
                &["chat_invites", &invite.inviter.to_hex()],
                json!({
                    "chat": invite.secret.public_key().to_hex(),
                    "secret": secret,
                }),
            );
            info!(inviter = %invite.inviter, "joined covert chat from invite");
            return true;
        }

        self.inner.store.write().insert(event.clone());
        let advanced = {
            let mut dm_state = self.inner.dm.lock();
            dm_state.cache_plaintext(event.id, plaintext.clone());
            if route.maybe_secret_invite {
                // Self-addressed but not a valid invite: keep the message,
                // never surface it as conversation content.
                false
            } else {
                dm_state.apply_message(route.chat, event.id, event.created_at, plaintext.clone())
            }
        };
        if advanced {
            self.inner.state.put(
                &["chats", &route.chat.to_hex(), "latest"],
                json!({
                    "id": event.id.to_hex(),
                    "created_at": event.created_at.as_secs(),
                    "text": plaintext,
                }),
            );
            self.emit(IndexChange::ChatLatest(route.chat));
        }
        true
    }

    // ── Notifications ────────────────────────────────────────────

    fn maybe_notify(&self, event: &Event) {
        let Some(local) = self.inner.identity.public_key() else {
            return;
        };
        let eligible = {
            let settings = self.inner.settings.read();
            notify::eligible(event, local, &settings.muted_notes, self.inner.trust.as_ref())
        };
        if !eligible {
            return;
        }
        self.inner.store.write().insert(event.clone());
        if self.inner.notifications.lock().add(event) {
            self.emit(IndexChange::Notifications);
            self.refresh_unseen_count();
        }
    }

    /// Recompute the unseen count, debounced to at most once per second.
    fn refresh_unseen_count(&self) {
        if self.inner.unseen_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            engine.inner.unseen_pending.store(false, Ordering::SeqCst);
            engine.recompute_unseen();
        });
    }

    fn recompute_unseen(&self) {
        let Some(seen_at) = self.inner.settings.read().notifications_seen_at else {
            return;
        };
        let count = self.inner.notifications.lock().unseen_count(seen_at);
        let _ = self.inner.unseen_tx.send(count);
        self.inner
            .state
            .put(&["unseen_notification_count"], json!(count));
    }

    // ── Future-event replay ──────────────────────────────────────

    /// (Re)arm the single replay timer for the earliest buffered entry.
    /// Arming invalidates any previously outstanding timer task.
    fn schedule_future_replay(&self) {
        let token = self.inner.future_timer.arm();
        let Some(due) = self.inner.future.lock().earliest_due() else {
            return;
        };
        let engine = self.clone();
        tokio::spawn(async move {
            let wait = due.as_secs().saturating_sub(Timestamp::now().as_secs());
            tokio::time::sleep(Duration::from_secs(wait)).await;
            if !engine.inner.future_timer.is_current(token) {
                return;
            }
            let next = engine.inner.future.lock().pop_earliest();
            if let Some(event) = next {
                debug!(id = %event.id, "replaying future event");
                engine
                    .handle_with(
                        event,
                        HandleOptions {
                            force: true,
                            persist: true,
                            retries: 0,
                        },
                    )
                    .await;
            }
            engine.schedule_future_replay();
        });
    }

    // ── Persistence tiering ──────────────────────────────────────

    async fn persist_tiered(&self, event: &Event) {
        let Some(distance) = self.inner.trust.follow_distance(&event.pubkey) else {
            return;
        };
        let replay_critical = matches!(
            EventKind::from(event.kind),
            EventKind::Profile | EventKind::FollowList | EventKind::DirectMessage
        );
        if distance <= 1 || (distance <= 4 && replay_critical) {
            self.inner.cache.save_event(event).await;
        }
    }

    // ── Publish pipeline ─────────────────────────────────────────

    /// Finalize and publish a locally authored event: fill in author and
    /// timestamp, hash, sign, announce, self-deliver locally (bypassing the
    /// dedup gate exactly once) and re-announce referenced ancestors.
    pub async fn publish(&self, builder: EventBuilder) -> Result<Event, PublishError> {
        let author = self
            .inner
            .identity
            .public_key()
            .ok_or(PublishError::NotSignedIn)?;
        // keep caller-supplied self-mention p tags intact (covert-chat
        // invites are self-addressed by construction)
        let unsigned = builder.allow_self_tagging().build(author);
        let event = self
            .inner
            .identity
            .sign(unsigned)
            .await
            .map_err(PublishError::Signing)?;
        if event.verify().is_err() {
            return Err(PublishError::InvalidEvent);
        }

        self.inner.transport.publish(event.clone());
        self.handle_with(
            event.clone(),
            HandleOptions {
                force: true,
                persist: true,
                retries: 0,
            },
        )
        .await;

        // Re-announce known ancestors, most recently tagged first, so
        // receivers get thread context.
        let ancestors: Vec<EventId> = tags::referenced_events(&event)
            .into_iter()
            .rev()
            .take(MAX_GOSSIPED_ANCESTORS)
            .collect();
        for id in ancestors {
            let known = self.inner.store.read().by_id(&id).cloned();
            if let Some(ancestor) = known {
                self.inner.transport.publish(ancestor);
            }
        }
        Ok(event)
    }

    // ── Settings ─────────────────────────────────────────────────

    /// Mutate the runtime filter settings.
    pub fn update_settings(&self, apply: impl FnOnce(&mut FilterSettings)) {
        let mut settings = self.inner.settings.write();
        apply(&mut settings);
    }

    /// Advance the "last seen notifications" cursor and recompute the unseen
    /// count immediately.
    pub fn set_notifications_seen(&self, at: Timestamp) {
        self.inner.settings.write().notifications_seen_at = Some(at);
        self.recompute_unseen();
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn event(&self, id: &EventId) -> Option<Event> {
        self.inner.store.read().by_id(id).cloned()
    }

    pub fn seen(&self, id: &EventId) -> bool {
        self.inner.seen.lock().contains(id)
    }

    pub fn query(&self, filter: &Filter) -> Vec<Event> {
        self.inner.store.read().query(filter)
    }

    pub fn replies(&self, id: &EventId) -> HashSet<EventId> {
        self.inner.indices.read().direct_replies(id)
    }

    pub fn thread_reply_count(&self, id: &EventId) -> usize {
        self.inner.indices.read().thread_reply_count(id)
    }

    pub fn likes(&self, id: &EventId) -> HashSet<PublicKey> {
        self.inner.indices.read().likes(id)
    }

    pub fn reposts(&self, id: &EventId) -> HashSet<PublicKey> {
        self.inner.indices.read().reposts(id)
    }

    /// Zap receipt ids for a note, newest first.
    pub fn zaps(&self, id: &EventId) -> Vec<EventId> {
        self.inner.indices.read().zaps(id)
    }

    pub fn profile(&self, author: &PublicKey) -> Option<ProfileRecord> {
        self.inner.indices.read().profile(author).cloned()
    }

    pub fn search_profiles(&self, query: &str) -> Vec<PublicKey> {
        self.inner.indices.read().search_names(query)
    }

    pub fn key_value(&self, key: &str) -> Option<Event> {
        let id = self.inner.indices.read().key_value(key)?;
        self.event(&id)
    }

    /// Notification ids, newest first.
    pub fn notifications(&self) -> Vec<EventId> {
        self.inner.notifications.lock().snapshot()
    }

    pub fn chat_latest(&self, chat: &PublicKey) -> Option<LatestMessage> {
        self.inner.dm.lock().latest(chat).cloned()
    }

    /// Covert chat recorded for an inviter, if any.
    pub fn invite_chat(&self, inviter: &PublicKey) -> Option<PublicKey> {
        self.inner.dm.lock().invite_chat(inviter)
    }

    /// Cached decrypted plaintext for a direct message.
    pub fn decrypted(&self, id: &EventId) -> Option<String> {
        self.inner.dm.lock().plaintext(id)
    }

    /// Number of events buffered for future replay.
    pub fn buffered_future_events(&self) -> usize {
        self.inner.future.lock().len()
    }

    /// Live stream of index changes.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<IndexChange> {
        self.inner.changes.subscribe()
    }

    /// Live unseen-notification count.
    pub fn unseen_notifications(&self) -> watch::Receiver<usize> {
        self.inner.unseen_rx.clone()
    }

    fn emit(&self, change: IndexChange) {
        let _ = self.inner.changes.send(change);
    }
}

/// Parse a JSON array of hex pubkeys, ignoring entries that don't parse.
fn parse_key_list(payload: &str) -> Option<HashSet<PublicKey>> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|hex| PublicKey::from_hex(hex).ok())
            .collect(),
    )
}
