// ── Persisted search term ──
//
// A single string key in an async key-value store. The engine itself is
// supplied by the consumer; an in-memory store ships for tests and
// embedding.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CoreError;

/// Key under which the search query is stored.
pub const SEARCH_KEY: &str = "searchText";

/// Async get/set of string values. `Ok(None)` means "never written".
#[async_trait]
pub trait SearchStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemorySearchStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl MemorySearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock_values().insert(key.to_owned(), value.to_owned());
        store
    }

    /// Every `set` call so far, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lock_values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SearchStore for MemorySearchStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock_values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.lock_values().insert(key.to_owned(), value.to_owned());
        self.writes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((key.to_owned(), value.to_owned()));
        Ok(())
    }
}
