// crates/roost-verify/src/nip05.rs
//
// NIP-05 domain identifiers.
//
// `bob@example.com` is looked up at
// `https://example.com/.well-known/nostr.json?name=bob`, which returns
//
// ```json
// { "names": { "bob": "<hex pubkey>" },
//   "relays": { "<hex pubkey>": ["wss://relay.example"] } }
// ```
//
// A bare `example.com` is shorthand for `_@example.com`.

use serde_json::Value;
use url::Url;

use roost_core::error::RoostError;

use crate::client::LookupClient;

/// A parsed `name@domain` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nip05Address {
    pub name: String,
    pub domain: String,
}

impl Nip05Address {
    pub fn parse(identifier: &str) -> Result<Self, RoostError> {
        let identifier = identifier.trim();
        let (name, domain) = match identifier.rsplit_once('@') {
            Some((name, domain)) => (name, domain),
            None => ("_", identifier),
        };
        let name = if name.is_empty() { "_" } else { name };

        if domain.is_empty() || domain.contains(['/', '?', '#', ' ']) {
            return Err(RoostError::Verification(format!(
                "invalid nip05 identifier: {:?}",
                identifier
            )));
        }

        Ok(Self {
            name: name.to_lowercase(),
            domain: domain.to_lowercase(),
        })
    }

    /// The well-known document URL for this identifier.
    pub fn lookup_url(&self) -> Result<Url, RoostError> {
        let mut url = Url::parse(&format!("https://{}/.well-known/nostr.json", self.domain))
            .map_err(|e| {
                RoostError::Verification(format!("bad nip05 domain {}: {}", self.domain, e))
            })?;
        url.query_pairs_mut().append_pair("name", &self.name);
        Ok(url)
    }
}

/// What a domain says about one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nip05Profile {
    pub pubkey: String,
    pub relays: Vec<String>,
}

impl Nip05Profile {
    /// Extract the profile for `name` from a well-known document.
    pub fn from_document(document: &Value, name: &str) -> Result<Self, RoostError> {
        let names = document
            .get("names")
            .and_then(Value::as_object)
            .ok_or_else(|| RoostError::Verification("nip05 document has no names".to_string()))?;

        let pubkey = names
            .get(name)
            .or_else(|| {
                names
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .and_then(Value::as_str)
            .ok_or_else(|| RoostError::Verification(format!("nip05 name {} not found", name)))?
            .to_string();

        let relays = document
            .get("relays")
            .and_then(|r| r.get(&pubkey))
            .and_then(Value::as_array)
            .map(|urls| {
                urls.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { pubkey, relays })
    }
}

/// Resolve an identifier to the profile its domain advertises.
pub async fn query_profile(
    client: &dyn LookupClient,
    identifier: &str,
) -> Result<Nip05Profile, RoostError> {
    let address = Nip05Address::parse(identifier)?;
    let url = address.lookup_url()?;
    let document = client.get_json(url.as_str()).await?;
    Nip05Profile::from_document(&document, &address.name)
}
