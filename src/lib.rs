//! Local event ingestion and indexing engine for Nostr clients.
//!
//! This crate takes the stream of events a client receives from its relays
//! and turns it into queryable local state: an in-memory event store,
//! relation indices (replies, likes, reposts, zaps, profiles, follow lists),
//! a trust-graph admission filter, a direct-message pipeline with covert
//! chat invites, a notification feed and the publish pipeline for locally
//! authored events.

pub mod admission;
pub mod config;
pub mod dm;
pub mod engine;
pub mod error;
pub mod index;
pub mod kind;
pub mod notify;
pub mod scheduler;
pub mod sorted;
pub mod store;
pub mod tags;
pub mod traits;

// Re-export commonly used types
pub use config::{EngineOptions, FilterSettings};
pub use dm::{ChatInvite, DmRoute, LatestMessage};
pub use engine::{HandleOptions, IndexChange, IngestEngine};
pub use error::PublishError;
pub use index::{ProfileRecord, RelationIndices};
pub use kind::EventKind;
pub use notify::NotificationFeed;
pub use store::EventStore;
pub use traits::{DurableCache, Identity, LocalKeys, ReactiveState, Transport, TrustGraph};
