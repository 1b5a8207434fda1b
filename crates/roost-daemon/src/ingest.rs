// crates/roost-daemon/src/ingest.rs
//
// The `ingest` subcommand: wire up the route engine, the verifier, and the
// dispatcher, then feed it one batch per input line.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use roost_ingest::{BatchReport, DispatchTable, Dispatcher, HandlerContext};
use roost_reputation::RouteEngine;
use roost_store::EntityStore;
use roost_verify::{HttpLookupClient, Verifier};

use crate::config::DaemonConfig;
use crate::input;

pub async fn run(
    config: &DaemonConfig,
    store: Arc<EntityStore>,
    file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let routes = Arc::new(RouteEngine::new(store.clone(), config.reputation.clone()));
    let client = Arc::new(HttpLookupClient::new(Duration::from_secs(
        config.verify.timeout_secs,
    )));
    let verifier = Arc::new(Verifier::new(
        store.clone(),
        routes.clone(),
        client,
        config.verify.clone(),
    ));
    let ctx = HandlerContext::new(store, routes)
        .with_verifier(verifier.clone())
        .with_local_pubkey(config.local_pubkey.clone());
    let dispatcher = Dispatcher::new(
        Arc::new(ctx),
        DispatchTable::standard(),
        config.ingest.clone(),
    );

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &file {
        Some(path) => {
            tracing::info!("Ingesting events from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => {
            tracing::info!("Ingesting events from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let totals = tokio::select! {
        result = feed(&dispatcher, reader) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping ingest");
            verifier.shutdown();
            return Ok(());
        }
    };

    tracing::info!(
        "Dispatched {} events in {} chunks ({} archived, {} handler failures)",
        totals.events,
        totals.chunks,
        totals.archived,
        totals.failures
    );

    let pending = verifier.in_flight();
    if pending > 0 {
        tracing::info!("Waiting for {} verification lookups", pending);
    }
    tokio::select! {
        _ = verifier.drain() => {}
        _ = tokio::signal::ctrl_c() => verifier.shutdown(),
    }

    Ok(())
}

/// Dispatch every line of `reader` as one batch. Undecodable lines are
/// logged and skipped.
async fn feed(
    dispatcher: &Dispatcher,
    reader: impl AsyncBufRead + Unpin,
) -> Result<BatchReport, std::io::Error> {
    let mut totals = BatchReport::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let batch = match input::parse_line(&line) {
            Ok(Some(batch)) => batch,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", line_no, e);
                continue;
            }
        };

        let report = dispatcher.process_events(batch).await;
        totals.events += report.events;
        totals.chunks += report.chunks;
        totals.archived += report.archived;
        totals.failures += report.failures;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::identity::Identity;
    use roost_ingest::IngestConfig;

    #[tokio::test]
    async fn test_feed_dispatches_each_line() {
        let store = Arc::new(EntityStore::in_memory());
        let routes = Arc::new(RouteEngine::new(store.clone(), Default::default()));
        let ctx = HandlerContext::new(store.clone(), routes);
        let dispatcher = Dispatcher::new(
            Arc::new(ctx),
            DispatchTable::standard(),
            IngestConfig {
                chunk_size: 100,
                chunk_delay_ms: 0,
            },
        );

        let input = concat!(
            r#"{"id":"e1","pubkey":"pk","kind":0,"created_at":10,"tags":[],"content":"{\"name\":\"a\"}"}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"[{"id":"e2","pubkey":"pk","kind":0,"created_at":20,"tags":[],"content":"{\"about\":\"b\"}"}]"#,
            "\n",
        );

        let totals = feed(&dispatcher, input.as_bytes()).await.unwrap();
        assert_eq!(totals.events, 2);

        let identity = store.get::<Identity>("pk").unwrap().unwrap();
        let kind0 = identity.kind0.unwrap();
        assert_eq!(kind0["name"], "a");
        assert_eq!(kind0["about"], "b");
        assert_eq!(identity.kind0_updated_at, 20);
    }
}
