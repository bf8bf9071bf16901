// ── Domain model ──
//
// Records are immutable once fetched and shared by `Arc` between the
// full collection and every filtered view derived from it.

use serde::{Deserialize, Serialize};

/// A single fetched record. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub owner_id: i64,
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl Record {
    pub fn new(owner_id: i64, id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            owner_id,
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// An ordered, shared snapshot of records (one fetch, or a view of one).
pub type RecordSnapshot = std::sync::Arc<Vec<std::sync::Arc<Record>>>;
