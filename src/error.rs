//! Errors surfaced on the public API.

use thiserror::Error;

/// Failure finalizing a locally authored event. Every variant is fatal for
/// that publish call only; no shared state is touched before signing succeeds.
#[derive(Debug, Error)]
pub enum PublishError {
    /// No local identity available to author the event.
    #[error("no local identity to author the event")]
    NotSignedIn,
    /// The signing collaborator failed.
    #[error("signer failed: {0}")]
    Signing(#[source] anyhow::Error),
    /// The signer returned an event whose id or signature does not validate.
    #[error("finalized event failed id/signature validation")]
    InvalidEvent,
}
