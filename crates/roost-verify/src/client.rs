// crates/roost-verify/src/client.rs
//
// Outbound JSON lookups used by verification.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use roost_core::error::RoostError;

/// Fetches a JSON document over HTTPS.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, RoostError>;
}

/// reqwest-backed lookup client with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    client: reqwest::Client,
}

impl HttpLookupClient {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl LookupClient for HttpLookupClient {
    async fn get_json(&self, url: &str) -> Result<Value, RoostError> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RoostError::Lookup(format!("GET {} failed: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(RoostError::Lookup(format!(
                "GET {} returned status {}",
                url,
                resp.status()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| RoostError::Lookup(format!("GET {} returned invalid JSON: {}", url, e)))
    }
}

/// Lookup client answering from a fixed URL -> document table.
///
/// Used for offline runs and tests. Unknown URLs fail like a network error.
/// Every requested URL is recorded.
#[derive(Debug, Default)]
pub struct StaticLookupClient {
    responses: HashMap<String, Value>,
    requested: Mutex<Vec<String>>,
}

impl StaticLookupClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, document: Value) -> Self {
        self.responses.insert(url.to_string(), document);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LookupClient for StaticLookupClient {
    async fn get_json(&self, url: &str) -> Result<Value, RoostError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| RoostError::Lookup(format!("no response for {}", url)))
    }
}
