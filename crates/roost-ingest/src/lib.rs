// crates/roost-ingest/src/lib.rs
//
// roost-ingest: Event ingestion for Roost.
//
// The networking layer hands decoded event batches to `Dispatcher`. The
// dispatcher chunks each batch, archives the local user's own events, and
// runs every handler registered for the event's kind in the `DispatchTable`.
// Handlers merge into the entity store under last-write-wins guards, feed
// the route engine, and kick off verification lookups.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod dispatcher;
pub mod handlers;
pub mod merger;
pub mod relay_lists;

// Re-export key types for ergonomic access from downstream crates.
pub use config::IngestConfig;
pub use context::HandlerContext;
pub use dispatch::{DispatchTable, HandlerFn};
pub use dispatcher::{BatchReport, Dispatcher, EventBatch};
pub use merger::MergeOutcome;
