// crates/roost-reputation/src/engine.rs
//
// RouteEngine: folds route evidence into the Route table.
//
// For each observation:
//   1. Reject URLs that are not shareable relay endpoints.
//   2. Canonicalize the URL and derive the route id.
//   3. Score = weight(type) * (1 - age / window).
//   4. If score > 0, make sure the RelayEndpoint row exists and fold the
//      score into the route's running average. Otherwise leave the route
//      untouched: stale or untrusted evidence neither helps nor hurts.
//
// Folding is not idempotent. Re-delivering the same observation counts it
// again.

use std::cmp::Ordering;
use std::sync::Arc;

use roost_core::error::RoostError;
use roost_core::relay_url::{is_shareable_relay_url, normalize_relay_url};
use roost_core::route::{route_id, RelayEndpoint, Route, RouteMode};
use roost_core::unix_now;
use roost_store::EntityStore;

use crate::weights::{EvidenceType, ReputationConfig};

#[derive(Debug)]
pub struct RouteEngine {
    store: Arc<EntityStore>,
    config: ReputationConfig,
}

impl RouteEngine {
    pub fn new(store: Arc<EntityStore>, config: ReputationConfig) -> Self {
        Self { store, config }
    }

    /// Record one observation, using the current time as "now".
    ///
    /// Returns the updated route, or `None` when the observation was
    /// rejected or ignored.
    pub fn add_route(
        &self,
        pubkey: &str,
        raw_url: &str,
        evidence: &EvidenceType,
        mode: RouteMode,
        observed_at: u64,
    ) -> Result<Option<Route>, RoostError> {
        self.add_route_at(pubkey, raw_url, evidence, mode, observed_at, unix_now())
    }

    /// Record one observation against an explicit "now".
    pub fn add_route_at(
        &self,
        pubkey: &str,
        raw_url: &str,
        evidence: &EvidenceType,
        mode: RouteMode,
        observed_at: u64,
        now: u64,
    ) -> Result<Option<Route>, RoostError> {
        if !is_shareable_relay_url(raw_url) {
            tracing::trace!(
                "Ignoring unshareable relay url {:?} for {}",
                raw_url,
                pubkey
            );
            return Ok(None);
        }
        let url = normalize_relay_url(raw_url)?;

        let weight = self.config.weights.weight(evidence);
        let score = self.config.decay().score(weight, now, observed_at);
        if score <= 0.0 {
            tracing::debug!(
                "Discarding {} {} evidence for {} at {} (score {:.3})",
                evidence,
                mode,
                pubkey,
                url,
                score
            );
            return Ok(None);
        }

        self.store.insert_if_absent(&RelayEndpoint {
            url: url.clone(),
            first_seen: now,
        })?;

        let id = route_id(pubkey, &url, mode);
        let route = self.store.update::<Route, _>(&id, |route| {
            route.pubkey = pubkey.to_string();
            route.url = url.clone();
            route.mode = mode;

            let count = route.count as f64;
            route.score = (route.score * count + score) / (count + 1.0);
            route.count += 1;
            route.types.insert(evidence.label().to_string());
            route.last_seen = route.last_seen.max(observed_at);
            true
        })?;

        if let Some(route) = &route {
            tracing::debug!(
                "Route {} {} {} -> score {:.3} over {} observations",
                pubkey,
                route.url,
                mode,
                route.score,
                route.count
            );
        }
        Ok(route)
    }

    /// Fetch a route by its components, if it exists.
    pub fn get_route(
        &self,
        pubkey: &str,
        raw_url: &str,
        mode: RouteMode,
    ) -> Result<Option<Route>, RoostError> {
        let url = normalize_relay_url(raw_url)?;
        self.store.get(&route_id(pubkey, &url, mode))
    }

    /// Routes for `pubkey`, best first.
    ///
    /// Ordered by score, then evidence count, then recency, then URL.
    /// `mode` restricts to one direction; `limit` caps the result length.
    pub fn ranked_routes(
        &self,
        pubkey: &str,
        mode: Option<RouteMode>,
        limit: Option<usize>,
    ) -> Result<Vec<Route>, RoostError> {
        let mut routes: Vec<Route> = self
            .store
            .list::<Route>()?
            .into_iter()
            .filter(|r| r.pubkey == pubkey)
            .filter(|r| mode.map_or(true, |m| r.mode == m))
            .collect();

        routes.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| b.last_seen.cmp(&a.last_seen))
                .then_with(|| a.url.cmp(&b.url))
        });

        if let Some(limit) = limit {
            routes.truncate(limit);
        }
        Ok(routes)
    }
}
