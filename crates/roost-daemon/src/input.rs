// crates/roost-daemon/src/input.rs
//
// Newline-delimited event input. Each non-blank line is either one JSON
// event or a JSON array of events, and becomes one dispatcher batch.
// Array entries that do not decode as events are dropped individually.

use serde_json::Value;

use roost_core::event::Event;
use roost_ingest::EventBatch;

/// Decode one input line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<EventBatch>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let batch = match serde_json::from_str::<Value>(line)? {
        Value::Array(items) => {
            let events: Vec<Option<Event>> = items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect();
            EventBatch::from(events)
        }
        other => EventBatch::from(serde_json::from_value::<Event>(other)?),
    };
    Ok(Some(batch))
}
