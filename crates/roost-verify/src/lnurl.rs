// crates/roost-verify/src/lnurl.rs
//
// Payment endpoint resolution for zaps.
//
// A profile advertises payments either as a lud16 address (`name@domain`),
// served at `https://<domain>/.well-known/lnurlp/<name>`, or as a bech32
// `lnurl1...` string whose payload is the metadata URL itself. The metadata
// is accepted only when it declares `allowsNostr: true` and a non-empty
// `nostrPubkey`; only the fields needed to zap are kept.

use bech32::{Bech32, Hrp};
use serde_json::Value;

use roost_core::error::RoostError;
use roost_core::identity::Zapper;

const LNURL_HRP: &str = "lnurl";

/// Encode a URL as a lowercase bech32 `lnurl1...` string.
pub fn encode_lnurl(url: &str) -> Result<String, RoostError> {
    let hrp = Hrp::parse(LNURL_HRP).map_err(|e| RoostError::Serialization(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, url.as_bytes())
        .map_err(|e| RoostError::Serialization(format!("lnurl encode failed: {}", e)))
}

/// Decode a bech32 `lnurl1...` string back to its URL.
pub fn decode_lnurl(lnurl: &str) -> Result<String, RoostError> {
    let (hrp, data) = bech32::decode(&lnurl.to_lowercase())
        .map_err(|e| RoostError::Serialization(format!("lnurl decode failed: {}", e)))?;
    if hrp.to_lowercase() != LNURL_HRP {
        return Err(RoostError::Serialization(format!(
            "unexpected bech32 prefix {}",
            hrp
        )));
    }
    String::from_utf8(data)
        .map_err(|e| RoostError::Serialization(format!("lnurl payload is not utf-8: {}", e)))
}

/// Resolve a lud16 address or `lnurl1...` string to its metadata URL.
pub fn metadata_url(address: &str) -> Result<String, RoostError> {
    let address = address.trim().to_lowercase();
    if address.starts_with("lnurl1") {
        return decode_lnurl(&address);
    }

    match address.split_once('@') {
        Some((name, domain)) if !name.is_empty() && !domain.is_empty() && !domain.contains('/') => {
            Ok(format!("https://{}/.well-known/lnurlp/{}", domain, name))
        }
        _ => Err(RoostError::Verification(format!(
            "unrecognized payment address {:?}",
            address
        ))),
    }
}

/// Check payment metadata and trim it to a [`Zapper`].
pub fn accept_metadata(metadata: &Value) -> Result<Zapper, RoostError> {
    if metadata.get("allowsNostr").and_then(Value::as_bool) != Some(true) {
        return Err(RoostError::Verification(
            "payment endpoint does not allow nostr".to_string(),
        ));
    }

    let nostr_pubkey = metadata
        .get("nostrPubkey")
        .and_then(Value::as_str)
        .filter(|pk| !pk.is_empty())
        .ok_or_else(|| {
            RoostError::Verification("payment endpoint has no nostrPubkey".to_string())
        })?;

    Ok(Zapper {
        callback: metadata
            .get("callback")
            .and_then(Value::as_str)
            .map(str::to_string),
        max_sendable: metadata.get("maxSendable").and_then(Value::as_u64),
        min_sendable: metadata.get("minSendable").and_then(Value::as_u64),
        nostr_pubkey: nostr_pubkey.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lud16_metadata_url() {
        assert_eq!(
            metadata_url("Bob@Wallet.Example").unwrap(),
            "https://wallet.example/.well-known/lnurlp/bob"
        );
    }

    #[test]
    fn test_lnurl_roundtrip_through_metadata_url() {
        let url = "https://wallet.example/.well-known/lnurlp/bob";
        let encoded = encode_lnurl(url).unwrap();
        assert!(encoded.starts_with("lnurl1"));
        assert_eq!(metadata_url(&encoded.to_uppercase()).unwrap(), url);
    }

    #[test]
    fn test_bad_lnurl_fails() {
        assert!(metadata_url("lnurl1qqqqqq").is_err());
        assert!(metadata_url("not an address").is_err());
        assert!(metadata_url("@wallet.example").is_err());
    }

    #[test]
    fn test_accept_metadata_trims_fields() {
        let zapper = accept_metadata(&json!({
            "allowsNostr": true,
            "nostrPubkey": "z4p",
            "callback": "https://wallet.example/cb",
            "maxSendable": 100000,
            "minSendable": 1000,
            "metadata": "[[\"text/plain\",\"big blob\"]]",
            "tag": "payRequest"
        }))
        .unwrap();

        assert_eq!(
            zapper,
            Zapper {
                callback: Some("https://wallet.example/cb".to_string()),
                max_sendable: Some(100000),
                min_sendable: Some(1000),
                nostr_pubkey: "z4p".to_string(),
            }
        );
    }

    #[test]
    fn test_accept_metadata_requires_allows_nostr() {
        let metadata = json!({
            "nostrPubkey": "z4p",
            "callback": "https://wallet.example/cb",
            "maxSendable": 100000,
            "minSendable": 1000
        });
        assert!(accept_metadata(&metadata).is_err());

        let metadata = json!({ "allowsNostr": "true", "nostrPubkey": "z4p" });
        assert!(accept_metadata(&metadata).is_err());
    }

    #[test]
    fn test_accept_metadata_requires_pubkey() {
        let empty = json!({ "allowsNostr": true, "nostrPubkey": "" });
        assert!(accept_metadata(&empty).is_err());
        assert!(accept_metadata(&json!({ "allowsNostr": true })).is_err());
    }
}
