//! Tag inspection helpers shared by the dispatcher, indices and pipelines.
//!
//! Everything here works on `tag.as_slice()` so the crate stays independent
//! of the typed tag standards in nostr-sdk: references are plain `["e", <id>,
//! <relay?>, <marker?>]` and `["p", <pubkey>]` tuples.

use nostr_sdk::{Event, EventId, PublicKey};

/// Parse the id of an `e` tag slice, if well-formed.
fn e_tag_id(slice: &[String]) -> Option<EventId> {
    if slice.first().map(String::as_str) != Some("e") {
        return None;
    }
    slice.get(1).and_then(|id| EventId::from_hex(id).ok())
}

fn marker(slice: &[String]) -> Option<&str> {
    slice.get(3).map(String::as_str)
}

/// All event ids referenced through `e` tags, in tag order.
pub fn referenced_events(event: &Event) -> Vec<EventId> {
    event
        .tags
        .iter()
        .filter_map(|tag| e_tag_id(tag.as_slice()))
        .collect()
}

/// All pubkeys referenced through `p` tags, in tag order.
pub fn recipients(event: &Event) -> Vec<PublicKey> {
    event
        .tags
        .iter()
        .filter_map(|tag| {
            let slice = tag.as_slice();
            if slice.first().map(String::as_str) != Some("p") {
                return None;
            }
            slice.get(1).and_then(|pk| PublicKey::from_hex(pk).ok())
        })
        .collect()
}

/// The event this one replies to, resolved from its `e` tags.
///
/// A single non-mention `e` tag wins; an explicit `reply` marker wins next;
/// with several unmarked references the second one is the parent by NIP-10
/// positional convention.
pub fn reply_parent(event: &Event) -> Option<EventId> {
    let reply_tags: Vec<&[String]> = event
        .tags
        .iter()
        .map(|tag| tag.as_slice())
        .filter(|slice| {
            slice.first().map(String::as_str) == Some("e") && marker(slice) != Some("mention")
        })
        .collect();

    if reply_tags.len() == 1 {
        return e_tag_id(reply_tags[0]);
    }
    if let Some(slice) = reply_tags.iter().find(|slice| marker(slice) == Some("reply")) {
        return e_tag_id(slice);
    }
    if reply_tags.len() > 1 {
        return e_tag_id(reply_tags[1]);
    }
    None
}

/// Thread root: explicit `root` marker, else the first `e` tag.
pub fn thread_root(event: &Event) -> Option<EventId> {
    let root = event
        .tags
        .iter()
        .map(|tag| tag.as_slice())
        .find(|slice| {
            slice.first().map(String::as_str) == Some("e") && marker(slice) == Some("root")
        })
        .and_then(e_tag_id);
    if root.is_some() {
        return root;
    }
    event.tags.iter().find_map(|tag| e_tag_id(tag.as_slice()))
}

/// The original post a repost points at: an explicit `mention` marker wins,
/// else the last `e` tag.
pub fn reposted_event_id(event: &Event) -> Option<EventId> {
    let mentioned = event
        .tags
        .iter()
        .map(|tag| tag.as_slice())
        .find(|slice| {
            slice.first().map(String::as_str) == Some("e") && marker(slice) == Some("mention")
        })
        .and_then(e_tag_id);
    if mentioned.is_some() {
        return mentioned;
    }
    event
        .tags
        .iter()
        .rev()
        .find_map(|tag| e_tag_id(tag.as_slice()))
}

/// Whether this event is a repost: kind 6, or a kind 1 note whose whole
/// content is a `#[i]` reference to its own `mention` tag.
pub fn is_repost(event: &Event) -> bool {
    if event.kind.as_u16() == 6 {
        return true;
    }
    if event.kind.as_u16() != 1 {
        return false;
    }
    let mention_index = event.tags.iter().position(|tag| {
        let slice = tag.as_slice();
        slice.first().map(String::as_str) == Some("e") && marker(slice) == Some("mention")
    });
    match mention_index {
        Some(i) => event.content == format!("#[{i}]"),
        None => false,
    }
}

/// The distinguishing `d` tag of a parameterized event.
pub fn d_tag(event: &Event) -> Option<String> {
    event.tags.iter().find_map(|tag| {
        let slice = tag.as_slice();
        if slice.first().map(String::as_str) == Some("d") {
            slice.get(1).cloned()
        } else {
            None
        }
    })
}
