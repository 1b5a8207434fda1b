// crates/roost-ingest/src/relay_lists.rs
//
// Relay list extraction for the four relay-bearing kinds.
//
//   kind 2      content is a single relay URL
//   kind 3      content is `{ "<url>": { "read": bool, "write": bool } }`
//   kind 10001  tags are `[url, read, write]`, `"!"` negates
//   kind 10002  `["r", url]` or `["r", url, "read" | "write"]`
//
// Read/write default to true unless explicitly negated (`false`, `"false"`
// or `"!"`). Only URLs that look like relay endpoints are kept, in their
// canonical form, first occurrence wins.

use std::collections::HashSet;

use serde_json::{Map, Value};

use roost_core::event::{Event, Tag};
use roost_core::parsed::{parse_json, Parsed};
use roost_core::relay_url::{is_relay_url, normalize_relay_url};
use roost_core::route::RouteMode;
use roost_core::RelayPolicy;

/// Whether a read/write marker explicitly denies access.
pub fn is_negated(marker: Option<&Value>) -> bool {
    match marker {
        Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s == "!" || s == "false",
        _ => false,
    }
}

fn is_negated_str(marker: Option<&str>) -> bool {
    matches!(marker, Some("!") | Some("false"))
}

fn collect(policies: impl IntoIterator<Item = RelayPolicy>) -> Vec<RelayPolicy> {
    let mut seen = HashSet::new();
    policies
        .into_iter()
        .filter(|p| is_relay_url(&p.url))
        .filter_map(|p| {
            let url = normalize_relay_url(&p.url).ok()?;
            seen.insert(url.clone()).then_some(RelayPolicy { url, ..p })
        })
        .collect()
}

/// Kind 2: the content is one relay, readable and writable.
pub fn from_recommendation(event: &Event) -> Vec<RelayPolicy> {
    collect([RelayPolicy {
        url: event.content.trim().to_string(),
        read: true,
        write: true,
    }])
}

/// Kind 3: the content's relay-conditions object.
pub fn conditions(event: &Event) -> Parsed<Map<String, Value>> {
    parse_json(&event.content)
}

/// Kind 3 relay list from an already-parsed conditions object.
pub fn from_conditions(conditions: &Map<String, Value>) -> Vec<RelayPolicy> {
    collect(conditions.iter().map(|(url, cond)| RelayPolicy {
        url: url.clone(),
        read: !is_negated(cond.get("read")),
        write: !is_negated(cond.get("write")),
    }))
}

/// Kind 10001: tags of `[url, read, write]`.
pub fn from_legacy_tags(tags: &[Tag]) -> Vec<RelayPolicy> {
    collect(tags.iter().filter_map(|tag| {
        Some(RelayPolicy {
            url: tag.get(0)?.to_string(),
            read: !is_negated_str(tag.get(1)),
            write: !is_negated_str(tag.get(2)),
        })
    }))
}

/// Modes granted by a kind 10002 marker. A missing or unrecognized marker
/// grants both.
pub fn marker_modes(marker: Option<&str>) -> Vec<RouteMode> {
    match marker.and_then(RouteMode::from_marker) {
        Some(mode) => vec![mode],
        None => RouteMode::BOTH.to_vec(),
    }
}

/// Kind 10002: `r` tags as (raw url, modes).
pub fn relay_list_entries(event: &Event) -> impl Iterator<Item = (&str, Vec<RouteMode>)> + '_ {
    event
        .tags_named("r")
        .filter_map(|tag| Some((tag.value()?, marker_modes(tag.get(2)))))
}

/// Kind 10002 relay list.
pub fn from_relay_list(event: &Event) -> Vec<RelayPolicy> {
    collect(relay_list_entries(event).map(|(url, modes)| RelayPolicy {
        url: url.to_string(),
        read: modes.contains(&RouteMode::Read),
        write: modes.contains(&RouteMode::Write),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::kinds;

    fn event(kind: u32, content: &str, tags: Vec<Tag>) -> Event {
        Event {
            id: "id".to_string(),
            pubkey: "pk".to_string(),
            kind,
            created_at: 1,
            tags,
            content: content.to_string(),
            sig: None,
        }
    }

    fn policy(url: &str, read: bool, write: bool) -> RelayPolicy {
        RelayPolicy {
            url: url.to_string(),
            read,
            write,
        }
    }

    #[test]
    fn test_recommendation() {
        let relays = from_recommendation(&event(
            kinds::RECOMMEND_RELAY,
            " wss://relay.example/ ",
            vec![],
        ));
        assert_eq!(relays, vec![policy("wss://relay.example", true, true)]);
        let not_a_url = event(kinds::RECOMMEND_RELAY, "hello", vec![]);
        assert!(from_recommendation(&not_a_url).is_empty());
    }

    #[test]
    fn test_conditions_respect_negation() {
        let e = event(
            kinds::CONTACTS,
            r#"{"wss://a.example":{"read":true,"write":false},
                "wss://b.example":{},
                "https://c.example":{"read":true},
                "wss://d.example":{"read":"!"}}"#,
            vec![],
        );
        let mut relays = from_conditions(&conditions(&e).unwrap());
        relays.sort_by(|a, b| a.url.cmp(&b.url));
        assert_eq!(
            relays,
            vec![
                policy("wss://a.example", true, false),
                policy("wss://b.example", true, true),
                policy("wss://d.example", false, true),
            ]
        );
    }

    #[test]
    fn test_conditions_parse_failure() {
        for content in ["", "not json"] {
            let e = event(kinds::CONTACTS, content, vec![]);
            assert!(conditions(&e).is_err());
        }
    }

    #[test]
    fn test_legacy_tags() {
        let relays = from_legacy_tags(&[
            Tag::new(&["wss://a.example", "", "!"]),
            Tag::new(&["wss://b.example"]),
            Tag::new(&["nope"]),
        ]);
        assert_eq!(
            relays,
            vec![
                policy("wss://a.example", true, false),
                policy("wss://b.example", true, true),
            ]
        );
    }

    #[test]
    fn test_relay_list_markers_and_dedup() {
        let e = event(
            kinds::RELAY_LIST,
            "",
            vec![
                Tag::new(&["r", "wss://a.example", "read"]),
                Tag::new(&["r", "wss://b.example", "write"]),
                Tag::new(&["r", "wss://c.example"]),
                Tag::new(&["r", "wss://A.example/"]),
                Tag::new(&["p", "wss://not-a-relay-tag.example"]),
            ],
        );
        assert_eq!(
            from_relay_list(&e),
            vec![
                policy("wss://a.example", true, false),
                policy("wss://b.example", false, true),
                policy("wss://c.example", true, true),
            ]
        );
    }

    #[test]
    fn test_marker_modes() {
        assert_eq!(marker_modes(Some("read")), vec![RouteMode::Read]);
        assert_eq!(marker_modes(None), vec![RouteMode::Read, RouteMode::Write]);
        assert_eq!(
            marker_modes(Some("bogus")),
            vec![RouteMode::Read, RouteMode::Write]
        );
    }
}
