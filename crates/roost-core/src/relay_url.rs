// crates/roost-core/src/relay_url.rs
//
// Relay URL validation and canonicalization.
//
// Two levels of validity:
//   - `is_relay_url`: looks like a websocket endpoint. Used when filtering
//     the local user's own relay lists.
//   - `is_shareable_relay_url`: safe to record as route evidence for anyone.
//     Rejects explicit ports, raw IP hosts, and per-user virtual relay paths.

use url::{Host, Url};

use crate::error::RoostError;

fn strip_ws_scheme(raw: &str) -> Option<&str> {
    raw.strip_prefix("wss://")
        .or_else(|| raw.strip_prefix("ws://"))
        .filter(|rest| !rest.is_empty())
}

/// Loose check: a `ws://` or `wss://` URL with something after the scheme.
pub fn is_relay_url(raw: &str) -> bool {
    strip_ws_scheme(raw.trim()).is_some()
}

/// Strict check for URLs that may be shared as route evidence.
pub fn is_shareable_relay_url(raw: &str) -> bool {
    let raw = raw.trim();
    let Some(rest) = strip_ws_scheme(raw) else {
        return false;
    };

    // Explicit ports are rejected even when they equal the scheme default,
    // which `Url` would otherwise normalize away.
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    if authority.contains(':') {
        return false;
    }

    let Ok(parsed) = Url::parse(raw) else {
        return false;
    };

    match parsed.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => {}
        _ => return false,
    }

    !parsed.path().contains("/npub")
}

/// Canonical string form of a relay URL.
///
/// URLs without a websocket scheme get any existing scheme replaced by
/// `wss://`. The result is lowercased, without fragment or trailing slashes.
pub fn normalize_relay_url(raw: &str) -> Result<String, RoostError> {
    let raw = raw.trim();
    let candidate = if is_relay_url(raw) {
        raw.to_string()
    } else {
        let without_scheme = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
        format!("wss://{}", without_scheme)
    };

    let mut parsed =
        Url::parse(&candidate).map_err(|e| RoostError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(RoostError::InvalidUrl(format!("{}: missing host", raw)));
    }
    parsed.set_fragment(None);

    Ok(parsed.as_str().trim_end_matches('/').to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relay_url() {
        assert!(is_relay_url("wss://relay.example"));
        assert!(is_relay_url("ws://localhost:7000"));
        assert!(!is_relay_url("wss://"));
        assert!(!is_relay_url("https://relay.example"));
        assert!(!is_relay_url("not-a-url"));
    }

    #[test]
    fn test_shareable_rejects_ports_ips_and_virtual_relays() {
        assert!(is_shareable_relay_url("wss://relay.example"));
        assert!(is_shareable_relay_url("wss://relay.example/inbox"));
        assert!(!is_shareable_relay_url("wss://relay.example:443"));
        assert!(!is_shareable_relay_url("ws://10.0.0.1"));
        assert!(!is_shareable_relay_url("wss://[::1]"));
        assert!(!is_shareable_relay_url("wss://filter.example/npub1abc"));
        assert!(!is_shareable_relay_url("https://relay.example"));
        assert!(!is_shareable_relay_url("not-a-url"));
    }

    #[test]
    fn test_normalize_lowercases_and_strips_trailing_slash() {
        assert_eq!(
            normalize_relay_url("wss://Relay.Example/").unwrap(),
            "wss://relay.example"
        );
        assert_eq!(
            normalize_relay_url("wss://relay.example/Path/").unwrap(),
            "wss://relay.example/path"
        );
    }

    #[test]
    fn test_normalize_forces_websocket_scheme() {
        assert_eq!(
            normalize_relay_url("https://relay.example").unwrap(),
            "wss://relay.example"
        );
        assert_eq!(
            normalize_relay_url("relay.example").unwrap(),
            "wss://relay.example"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_relay_url("wss://").is_err());
        assert!(normalize_relay_url("").is_err());
    }
}
