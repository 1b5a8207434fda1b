// crates/roost-ingest/src/dispatcher.rs
//
// Dispatcher: the entry point for decoded event batches.
//
// A batch is processed in chunks of `chunk_size` events with a short sleep
// between chunks, so a large catch-up batch does not starve the runtime.
// Events within a batch are handled strictly in order. A handler error is
// logged and counted; the rest of the batch still runs.

use std::sync::Arc;

use roost_core::event::Event;

use crate::config::IngestConfig;
use crate::context::HandlerContext;
use crate::dispatch::DispatchTable;

/// An ordered batch of events. Absent entries are dropped on conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch(pub Vec<Event>);

impl From<Event> for EventBatch {
    fn from(event: Event) -> Self {
        EventBatch(vec![event])
    }
}

impl From<Vec<Event>> for EventBatch {
    fn from(events: Vec<Event>) -> Self {
        EventBatch(events)
    }
}

impl From<Vec<Option<Event>>> for EventBatch {
    fn from(events: Vec<Option<Event>>) -> Self {
        EventBatch(events.into_iter().flatten().collect())
    }
}

/// What one `process_events` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub events: usize,
    pub chunks: usize,
    /// Local user events written to the archive.
    pub archived: usize,
    /// Handler invocations that returned an error.
    pub failures: usize,
}

pub struct Dispatcher {
    ctx: Arc<HandlerContext>,
    table: DispatchTable,
    config: IngestConfig,
}

impl Dispatcher {
    pub fn new(ctx: Arc<HandlerContext>, table: DispatchTable, config: IngestConfig) -> Self {
        Self { ctx, table, config }
    }

    /// Run every registered handler over a batch, in order.
    pub async fn process_events(&self, batch: impl Into<EventBatch>) -> BatchReport {
        let EventBatch(events) = batch.into();
        let mut report = BatchReport {
            events: events.len(),
            ..Default::default()
        };
        if events.is_empty() {
            return report;
        }

        let chunk_size = self.config.chunk_size.max(1);
        let total_chunks = events.len().div_ceil(chunk_size);

        for (index, chunk) in events.chunks(chunk_size).enumerate() {
            tracing::trace!(
                "Dispatching chunk {}/{} ({} events)",
                index + 1,
                total_chunks,
                chunk.len()
            );
            for event in chunk {
                self.dispatch_one(event, &mut report);
            }
            report.chunks += 1;

            if index + 1 < total_chunks {
                if self.config.chunk_delay_ms > 0 {
                    tokio::time::sleep(self.config.chunk_delay()).await;
                } else {
                    tokio::task::yield_now().await;
                }
            }
        }

        tracing::debug!(
            "Processed {} events in {} chunks ({} archived, {} handler failures)",
            report.events,
            report.chunks,
            report.archived,
            report.failures
        );
        report
    }

    fn dispatch_one(&self, event: &Event, report: &mut BatchReport) {
        if self.ctx.is_local_user(&event.pubkey) {
            match self.ctx.store.put(event) {
                Ok(()) => report.archived += 1,
                Err(e) => tracing::warn!("Failed to archive own event {}: {}", event.id, e),
            }
        }

        for (name, handler) in self.table.handlers_for(event.kind) {
            if let Err(e) = handler(self.ctx.as_ref(), event) {
                report.failures += 1;
                tracing::warn!(
                    "Handler {} failed on kind {} event {}: {}",
                    name,
                    event.kind,
                    event.id,
                    e
                );
            }
        }
    }
}
