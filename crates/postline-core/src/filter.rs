// ── Search filter ──
//
// Pure title match over a record snapshot. No I/O, no state.

use std::sync::Arc;

use crate::model::{Record, RecordSnapshot};

/// Keep the records whose title contains `query`, ignoring case.
///
/// An empty query returns the input snapshot itself. Output order always
/// matches input order.
pub fn filter_records(collection: &RecordSnapshot, query: &str) -> RecordSnapshot {
    if query.is_empty() {
        return Arc::clone(collection);
    }

    let needle = normalize(query);
    let matched: Vec<Arc<Record>> = collection
        .iter()
        .filter(|r| normalize(&r.title).contains(&needle))
        .map(Arc::clone)
        .collect();
    Arc::new(matched)
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
}
