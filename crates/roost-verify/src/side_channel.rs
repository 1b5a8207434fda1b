// crates/roost-verify/src/side_channel.rs
//
// Verifier: fire-and-forget verification tasks.
//
// `spawn_*` starts a lookup on the tokio runtime and returns immediately.
// Lookups wait for a permit from a bounded semaphore, run under a timeout,
// and on success apply one atomic patch to the Identity. Nothing about the
// outcome reaches the caller; failures become debug log lines.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use roost_core::error::RoostError;
use roost_core::identity::{Identity, IdentityPatch};
use roost_core::route::RouteMode;
use roost_core::unix_now;
use roost_reputation::{EvidenceType, RouteEngine};
use roost_store::EntityStore;

use crate::client::LookupClient;
use crate::config::VerifyConfig;
use crate::lnurl;
use crate::nip05;

struct Inner {
    store: Arc<EntityStore>,
    routes: Arc<RouteEngine>,
    client: Arc<dyn LookupClient>,
    config: VerifyConfig,
}

impl Inner {
    async fn verify_nip05(&self, pubkey: &str, identifier: &str) -> Result<(), RoostError> {
        let profile = nip05::query_profile(self.client.as_ref(), identifier).await?;
        if profile.pubkey != pubkey {
            return Err(RoostError::Verification(format!(
                "{} resolves to {}, not {}",
                identifier, profile.pubkey, pubkey
            )));
        }

        let now = unix_now();
        self.store.patch::<Identity, _>(
            pubkey,
            IdentityPatch {
                verified_as: Some(identifier.to_string()),
                updated_at: Some(now),
                ..Default::default()
            },
        )?;

        for url in &profile.relays {
            for mode in RouteMode::BOTH {
                if let Err(e) = self
                    .routes
                    .add_route(pubkey, url, &EvidenceType::Nip05, mode, now)
                {
                    tracing::warn!("Failed to record nip05 route {} for {}: {}", url, pubkey, e);
                }
            }
        }

        tracing::debug!(
            "Verified {} as {} ({} relays advertised)",
            pubkey,
            identifier,
            profile.relays.len()
        );
        Ok(())
    }

    async fn verify_zapper(&self, pubkey: &str, address: &str) -> Result<(), RoostError> {
        let url = lnurl::metadata_url(address)?;
        let metadata = self.client.get_json(&url).await?;
        let zapper = lnurl::accept_metadata(&metadata)?;
        let lnurl = lnurl::encode_lnurl(&url)?;

        self.store.patch::<Identity, _>(
            pubkey,
            IdentityPatch {
                lnurl: Some(lnurl),
                zapper: Some(zapper),
                updated_at: Some(unix_now()),
                ..Default::default()
            },
        )?;

        tracing::debug!("Verified payment endpoint {} for {}", url, pubkey);
        Ok(())
    }
}

/// Spawns and tracks verification lookups.
pub struct Verifier {
    inner: Arc<Inner>,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
}

impl Verifier {
    pub fn new(
        store: Arc<EntityStore>,
        routes: Arc<RouteEngine>,
        client: Arc<dyn LookupClient>,
        config: VerifyConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            inner: Arc::new(Inner {
                store,
                routes,
                client,
                config,
            }),
            permits,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Check a domain identifier and, on success, mark the identity verified
    /// and record the advertised relays as route evidence.
    pub async fn verify_nip05(&self, pubkey: &str, identifier: &str) -> Result<(), RoostError> {
        self.inner.verify_nip05(pubkey, identifier).await
    }

    /// Check a payment address and, on success, store its lnurl and zapper.
    pub async fn verify_zapper(&self, pubkey: &str, address: &str) -> Result<(), RoostError> {
        self.inner.verify_zapper(pubkey, address).await
    }

    /// Start a background domain-identity lookup.
    pub fn spawn_nip05(&self, pubkey: &str, identifier: &str) {
        let (pubkey, identifier) = (pubkey.to_string(), identifier.to_string());
        self.spawn("nip05", move |inner| async move {
            inner.verify_nip05(&pubkey, &identifier).await
        });
    }

    /// Start a background payment-endpoint lookup.
    pub fn spawn_zapper(&self, pubkey: &str, address: &str) {
        let (pubkey, address) = (pubkey.to_string(), address.to_string());
        self.spawn("zapper", move |inner| async move {
            inner.verify_zapper(&pubkey, &address).await
        });
    }

    fn spawn<F, Fut>(&self, label: &'static str, lookup: F)
    where
        F: FnOnce(Arc<Inner>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), RoostError>> + Send + 'static,
    {
        if !self.inner.config.enabled {
            return;
        }

        let inner = self.inner.clone();
        let permits = self.permits.clone();
        let timeout = Duration::from_secs(inner.config.timeout_secs);

        let Ok(mut tasks) = self.tasks.lock() else {
            tracing::warn!("Verifier task set poisoned; dropping {} lookup", label);
            return;
        };
        // Reap finished lookups so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            match tokio::time::timeout(timeout, lookup(inner)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("{} lookup failed: {}", label, e),
                Err(_) => tracing::debug!("{} lookup timed out after {:?}", label, timeout),
            }
        });
    }

    /// Number of lookups spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Wait for every spawned lookup, including ones spawned while waiting.
    pub async fn drain(&self) {
        loop {
            let mut tasks = match self.tasks.lock() {
                Ok(mut guard) => std::mem::take(&mut *guard),
                Err(_) => return,
            };
            if tasks.is_empty() {
                return;
            }
            while tasks.join_next().await.is_some() {}
        }
    }

    /// Abandon every in-flight lookup.
    pub fn shutdown(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            let pending = tasks.len();
            tasks.abort_all();
            if pending > 0 {
                tracing::info!("Abandoned {} verification lookups", pending);
            }
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("config", &self.inner.config)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
