// crates/roost-ingest/src/context.rs
//
// HandlerContext: everything a handler may touch, built once at startup and
// shared by reference with every handler invocation.

use std::sync::Arc;

use roost_reputation::RouteEngine;
use roost_store::EntityStore;
use roost_verify::Verifier;

#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub store: Arc<EntityStore>,
    pub routes: Arc<RouteEngine>,
    /// Absent when verification is not wired up (e.g. replaying archives).
    pub verifier: Option<Arc<Verifier>>,
    /// Hex pubkey of the local user, if logged in.
    pub local_pubkey: Option<String>,
}

impl HandlerContext {
    pub fn new(store: Arc<EntityStore>, routes: Arc<RouteEngine>) -> Self {
        Self {
            store,
            routes,
            verifier: None,
            local_pubkey: None,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_local_pubkey(mut self, pubkey: Option<String>) -> Self {
        self.local_pubkey = pubkey;
        self
    }

    pub fn is_local_user(&self, pubkey: &str) -> bool {
        self.local_pubkey.as_deref() == Some(pubkey)
    }
}
