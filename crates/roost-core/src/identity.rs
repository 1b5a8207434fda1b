// crates/roost-core/src/identity.rs
//
// Identity and UserProfile projections.
//
// An Identity is the derived, mutable view of everything published by one
// public key. Each field-group carries its own `<field>_updated_at`
// protocol timestamp, which is the last-write-wins guard used by the merger.
// `updated_at` is the engine-local write time, not a protocol time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event::Tag;
use crate::traits::{Entity, Patch, Table};

/// Trimmed payment metadata for an identity that accepts zaps.
///
/// Only the four fields needed to build a zap request are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zapper {
    pub callback: Option<String>,
    pub max_sendable: Option<u64>,
    pub min_sendable: Option<u64>,
    pub nostr_pubkey: String,
}

/// Derived projection of one public key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Identity {
    /// Hex public key (primary key).
    pub pubkey: String,
    /// Engine-local time of the last write.
    #[serde(default)]
    pub updated_at: u64,
    /// Profile metadata, merged shallowly key by key.
    #[serde(default)]
    pub kind0: Option<Map<String, Value>>,
    #[serde(default)]
    pub kind0_updated_at: u64,
    /// `p` tags from the latest contact list.
    #[serde(default)]
    pub petnames: Option<Vec<Tag>>,
    #[serde(default)]
    pub petnames_updated_at: u64,
    /// Domain identifier, set only after a successful lookup.
    #[serde(default)]
    pub verified_as: Option<String>,
    /// Bech32 `lnurl1...` form of the payment metadata URL.
    #[serde(default)]
    pub lnurl: Option<String>,
    #[serde(default)]
    pub zapper: Option<Zapper>,
}

impl Entity for Identity {
    const TABLE: Table = Table::Identities;

    fn key(&self) -> String {
        self.pubkey.clone()
    }

    fn empty(key: &str) -> Self {
        Identity {
            pubkey: key.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update to an [`Identity`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityPatch {
    pub updated_at: Option<u64>,
    pub kind0: Option<Map<String, Value>>,
    pub kind0_updated_at: Option<u64>,
    pub petnames: Option<Vec<Tag>>,
    pub petnames_updated_at: Option<u64>,
    pub verified_as: Option<String>,
    pub lnurl: Option<String>,
    pub zapper: Option<Zapper>,
}

impl Patch<Identity> for IdentityPatch {
    fn apply_to(self, identity: &mut Identity) {
        if let Some(v) = self.updated_at {
            identity.updated_at = v;
        }
        if let Some(v) = self.kind0 {
            identity.kind0 = Some(v);
        }
        if let Some(v) = self.kind0_updated_at {
            identity.kind0_updated_at = v;
        }
        if let Some(v) = self.petnames {
            identity.petnames = Some(v);
        }
        if let Some(v) = self.petnames_updated_at {
            identity.petnames_updated_at = v;
        }
        if let Some(v) = self.verified_as {
            identity.verified_as = Some(v);
        }
        if let Some(v) = self.lnurl {
            identity.lnurl = Some(v);
        }
        if let Some(v) = self.zapper {
            identity.zapper = Some(v);
        }
    }
}

/// One entry of the local user's relay selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayPolicy {
    pub url: String,
    pub read: bool,
    pub write: bool,
}

/// The local user's own profile projection (singleton row).
///
/// Kept apart from the user's [`Identity`] because it also aggregates relay
/// lists, which are not tracked for other identities. The two may disagree
/// transiently; this one is authoritative for relay selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    /// Local user's public key.
    pub pubkey: String,
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default)]
    pub relays: Vec<RelayPolicy>,
    /// Last accepted `created_at` per relay-list source kind (2, 3, 10001,
    /// 10002). Each kind guards its own writes to the shared `relays`.
    #[serde(default)]
    pub relays_updated_at: BTreeMap<u32, u64>,
    #[serde(default)]
    pub mutes: Vec<Tag>,
    #[serde(default)]
    pub mutes_updated_at: u64,
    #[serde(default)]
    pub petnames: Vec<Tag>,
    #[serde(default)]
    pub petnames_updated_at: u64,
}

impl UserProfile {
    /// Singleton key under which the profile is stored.
    pub const KEY: &'static str = "me";

    /// Last accepted relay-list timestamp for a given source kind.
    pub fn relays_updated_at_for(&self, kind: u32) -> u64 {
        self.relays_updated_at.get(&kind).copied().unwrap_or(0)
    }
}

impl Entity for UserProfile {
    const TABLE: Table = Table::Profile;

    fn key(&self) -> String {
        Self::KEY.to_string()
    }

    fn empty(_key: &str) -> Self {
        UserProfile::default()
    }
}

/// Partial update to the [`UserProfile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfilePatch {
    pub pubkey: Option<String>,
    pub updated_at: Option<u64>,
    /// New relay list plus the (source kind, created_at) that produced it.
    pub relays: Option<(Vec<RelayPolicy>, u32, u64)>,
    pub mutes: Option<(Vec<Tag>, u64)>,
    pub petnames: Option<(Vec<Tag>, u64)>,
}

impl Patch<UserProfile> for UserProfilePatch {
    fn apply_to(self, profile: &mut UserProfile) {
        if let Some(v) = self.pubkey {
            profile.pubkey = v;
        }
        if let Some(v) = self.updated_at {
            profile.updated_at = v;
        }
        if let Some((relays, kind, at)) = self.relays {
            profile.relays = relays;
            profile.relays_updated_at.insert(kind, at);
        }
        if let Some((mutes, at)) = self.mutes {
            profile.mutes = mutes;
            profile.mutes_updated_at = at;
        }
        if let Some((petnames, at)) = self.petnames {
            profile.petnames = petnames;
            profile.petnames_updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_patch_leaves_unset_fields() {
        let mut identity = Identity::empty("pk");
        identity.verified_as = Some("bob@example.com".to_string());

        let mut kind0 = Map::new();
        kind0.insert("name".to_string(), Value::from("bob"));
        IdentityPatch {
            kind0: Some(kind0.clone()),
            kind0_updated_at: Some(42),
            updated_at: Some(1000),
            ..Default::default()
        }
        .apply_to(&mut identity);

        assert_eq!(identity.kind0, Some(kind0));
        assert_eq!(identity.kind0_updated_at, 42);
        assert_eq!(identity.updated_at, 1000);
        assert_eq!(identity.verified_as.as_deref(), Some("bob@example.com"));
        assert!(identity.petnames.is_none());
    }

    #[test]
    fn test_profile_relay_guards_are_per_kind() {
        let mut profile = UserProfile::default();
        let relays = vec![RelayPolicy {
            url: "wss://relay.example".to_string(),
            read: true,
            write: false,
        }];
        UserProfilePatch {
            relays: Some((relays.clone(), 10002, 500)),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.relays, relays);
        assert_eq!(profile.relays_updated_at_for(10002), 500);
        assert_eq!(profile.relays_updated_at_for(2), 0);
    }

    #[test]
    fn test_zapper_uses_camel_case_on_the_wire() {
        let zapper = Zapper {
            callback: Some("https://pay.example/cb".to_string()),
            max_sendable: Some(1000),
            min_sendable: Some(1),
            nostr_pubkey: "abc".to_string(),
        };
        let json = serde_json::to_value(&zapper).unwrap();
        assert_eq!(json["nostrPubkey"], "abc");
        assert_eq!(json["maxSendable"], 1000);
    }
}
