//! Closed set of event kinds the dispatcher understands.

use nostr_sdk::Kind;

/// Event kinds with dedicated handling. Everything else falls to [`EventKind::Other`]
/// and is stored without touching any index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Kind 0 — profile metadata.
    Profile,
    /// Kind 1 — text note (or a single-mention repost in disguise).
    Note,
    /// Kind 3 — follow list.
    FollowList,
    /// Kind 4 — NIP-04 encrypted direct message.
    DirectMessage,
    /// Kind 5 — deletion request.
    Deletion,
    /// Kind 6 — repost.
    Repost,
    /// Kind 7 — reaction.
    Reaction,
    /// Kind 9735 — zap receipt.
    ZapReceipt,
    /// Kind 16462 — encrypted block list.
    BlockList,
    /// Kind 16463 — flag list.
    FlagList,
    /// Kind 30000 — key-value record, keyed by `d` tag.
    KeyValue,
    /// Anything else.
    Other(u16),
}

impl From<Kind> for EventKind {
    fn from(kind: Kind) -> Self {
        match kind.as_u16() {
            0 => Self::Profile,
            1 => Self::Note,
            3 => Self::FollowList,
            4 => Self::DirectMessage,
            5 => Self::Deletion,
            6 => Self::Repost,
            7 => Self::Reaction,
            9735 => Self::ZapReceipt,
            16462 => Self::BlockList,
            16463 => Self::FlagList,
            30000 => Self::KeyValue,
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_map() {
        assert_eq!(EventKind::from(Kind::Custom(0)), EventKind::Profile);
        assert_eq!(EventKind::from(Kind::Custom(4)), EventKind::DirectMessage);
        assert_eq!(EventKind::from(Kind::Custom(9735)), EventKind::ZapReceipt);
        assert_eq!(EventKind::from(Kind::Custom(30000)), EventKind::KeyValue);
    }

    #[test]
    fn unknown_kind_preserved() {
        assert_eq!(EventKind::from(Kind::Custom(12345)), EventKind::Other(12345));
    }
}
