// crates/roost-core/src/event.rs
//
// The event record handed to Roost by the networking layer.
//
// Events arrive already signature-checked and decoded. Roost never trusts
// `content` to be well-formed; handlers parse it through `parsed::parse_json`
// and skip the affected field-group on failure.

use serde::{Deserialize, Serialize};

use crate::traits::{Entity, Table};

/// Event kinds that Roost derives state from.
pub mod kinds {
    /// Profile metadata (JSON object in `content`).
    pub const METADATA: u32 = 0;
    /// Legacy single relay recommendation (relay URL in `content`).
    pub const RECOMMEND_RELAY: u32 = 2;
    /// Contact list: `p` tags are petnames, `content` may hold relay conditions.
    pub const CONTACTS: u32 = 3;
    /// Public chat room creation.
    pub const ROOM_CREATE: u32 = 40;
    /// Public chat room metadata update.
    pub const ROOM_METADATA: u32 = 41;
    /// Mute list.
    pub const MUTE_LIST: u32 = 10000;
    /// Deprecated relay list (tags of `[url, read, write]`).
    pub const LEGACY_RELAY_LIST: u32 = 10001;
    /// Relay list metadata (`r` tags with optional read/write marker).
    pub const RELAY_LIST: u32 = 10002;
}

/// A single tag: the first element names it, the rest carry data.
///
/// Stored verbatim so uncommon tags survive round trips, e.g.
/// `["p", "<hex pubkey>", "wss://relay.example", "alice"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Build a tag from string slices.
    pub fn new<S: AsRef<str>>(parts: &[S]) -> Self {
        Tag(parts.iter().map(|p| p.as_ref().to_string()).collect())
    }

    /// The tag name (first element), if any.
    pub fn name(&self) -> Option<&str> {
        self.get(0)
    }

    /// The first data element (second element), if any.
    pub fn value(&self) -> Option<&str> {
        self.get(1)
    }

    /// Element at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// An immutable, signed, timestamped record.
///
/// ```json
/// {
///   "id": "aa11",
///   "pubkey": "b0b0",
///   "kind": 10002,
///   "created_at": 1700000000,
///   "tags": [["r", "wss://relay.example", "write"]],
///   "content": "",
///   "sig": "deadbeef"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Event identifier (hex).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Kind number.
    pub kind: u32,
    /// Protocol timestamp, unix seconds.
    pub created_at: u64,
    /// Ordered tag list.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Free-form content; JSON for some kinds.
    #[serde(default)]
    pub content: String,
    /// Signature, kept only so archived events stay complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl Event {
    /// All tags whose name equals `name`, in order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name() == Some(name))
    }

    /// Value of the first tag named `name`.
    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.name() == Some(name))
            .find_map(Tag::value)
    }
}

/// Events published by the local user are archived verbatim, keyed by id.
impl Entity for Event {
    const TABLE: Table = Table::MyEvents;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn empty(key: &str) -> Self {
        Event {
            id: key.to_string(),
            pubkey: String::new(),
            kind: 0,
            created_at: 0,
            tags: Vec::new(),
            content: String::new(),
            sig: None,
        }
    }
}
