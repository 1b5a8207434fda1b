// crates/roost-core/src/room.rs
//
// Public chat rooms (kinds 40 and 41).
//
// Unlike identities, a room has a single monotonic guard: `updated_at` holds
// the `created_at` of the newest accepted metadata event for the room.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::traits::{Entity, Patch, Table};

/// Metadata keys a room event may set. Everything else in `content` is dropped.
pub const ROOM_ATTRIBUTES: [&str; 3] = ["name", "about", "picture"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Room {
    /// Creation event id.
    pub id: String,
    /// Public key of the room creator.
    #[serde(default)]
    pub pubkey: String,
    /// `created_at` of the newest accepted metadata event.
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl Entity for Room {
    const TABLE: Table = Table::Rooms;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn empty(key: &str) -> Self {
        Room {
            id: key.to_string(),
            ..Default::default()
        }
    }
}

/// Whitelisted room metadata extracted from an event's `content`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    pub pubkey: Option<String>,
    pub updated_at: Option<u64>,
    pub name: Option<String>,
    pub about: Option<String>,
    pub picture: Option<String>,
}

impl RoomPatch {
    /// Project a parsed content object onto [`ROOM_ATTRIBUTES`].
    ///
    /// Only string values are kept. Returns `None` unless a non-empty
    /// `name` survives the projection.
    pub fn from_content(content: &Map<String, Value>) -> Option<Self> {
        let pick = |key: &str| {
            content
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let name = pick("name").filter(|n| !n.is_empty())?;
        Some(RoomPatch {
            name: Some(name),
            about: pick("about"),
            picture: pick("picture"),
            ..Default::default()
        })
    }
}

impl Patch<Room> for RoomPatch {
    fn apply_to(self, room: &mut Room) {
        if let Some(v) = self.pubkey {
            room.pubkey = v;
        }
        if let Some(v) = self.updated_at {
            room.updated_at = v;
        }
        if let Some(v) = self.name {
            room.name = Some(v);
        }
        if let Some(v) = self.about {
            room.about = Some(v);
        }
        if let Some(v) = self.picture {
            room.picture = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_projection_drops_unknown_keys() {
        let patch =
            RoomPatch::from_content(&object(r#"{"name":"rust","about":"crabs","evil":"x"}"#))
                .unwrap();
        assert_eq!(patch.name.as_deref(), Some("rust"));
        assert_eq!(patch.about.as_deref(), Some("crabs"));
        assert!(patch.picture.is_none());
    }

    #[test]
    fn test_projection_requires_name() {
        let nameless = object(r#"{"about":"no name"}"#);
        assert!(RoomPatch::from_content(&nameless).is_none());
        assert!(RoomPatch::from_content(&object(r#"{"name":""}"#)).is_none());
        assert!(RoomPatch::from_content(&object(r#"{"name":7}"#)).is_none());
    }

    #[test]
    fn test_patch_keeps_missing_attributes() {
        let mut room = Room::empty("r1");
        room.about = Some("old about".to_string());
        RoomPatch {
            name: Some("new".to_string()),
            updated_at: Some(9),
            ..Default::default()
        }
        .apply_to(&mut room);
        assert_eq!(room.name.as_deref(), Some("new"));
        assert_eq!(room.about.as_deref(), Some("old about"));
        assert_eq!(room.updated_at, 9);
    }
}
