// crates/roost-core/src/parsed.rs
//
// Explicit JSON parsing policy for event content.
//
// Content is untrusted. Handlers parse it into a `Parsed<T>` and, on
// `ParseFailure`, skip only the field-group that needed it.

use std::fmt;

use serde::de::DeserializeOwned;

/// Why event content could not be parsed into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub reason: String,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unparseable content: {}", self.reason)
    }
}

impl std::error::Error for ParseFailure {}

pub type Parsed<T> = Result<T, ParseFailure>;

/// Parse `content` as JSON of type `T`.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Parsed<T> {
    serde_json::from_str(content).map_err(|e| ParseFailure {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    #[test]
    fn test_parse_object() {
        let parsed: Parsed<Map<String, Value>> = parse_json(r#"{"name":"alice"}"#);
        assert_eq!(parsed.unwrap()["name"], "alice");
    }

    #[test]
    fn test_parse_failure_on_non_json() {
        let parsed: Parsed<Map<String, Value>> = parse_json("hello there");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_failure_on_wrong_shape() {
        let parsed: Parsed<Map<String, Value>> = parse_json("[1, 2, 3]");
        assert!(parsed.is_err());
    }
}
