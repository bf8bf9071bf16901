// ── JSON file search store ──
//
// A flat string map persisted as one JSON object. Writes go to a sibling
// temp file that is renamed over the target, so readers never observe a
// half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use postline_core::{CoreError, SearchStore};

use crate::ConfigError;

type StateMap = BTreeMap<String, String>;

/// `SearchStore` backed by a JSON file. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<StateMap, ConfigError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StateMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(StateMap::new());
        }
        serde_json::from_slice(&raw).map_err(|source| ConfigError::State {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_map(&self, map: &StateMap) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(map).map_err(|source| ConfigError::State {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = map.len(), "state file written");
        Ok(())
    }

    /// Remove `key`, returning whether it was present.
    pub async fn remove(&self, key: &str) -> Result<bool, ConfigError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        let existed = map.remove(key).is_some();
        if existed {
            self.write_map(&map).await?;
        }
        Ok(existed)
    }
}

fn persistence(err: &ConfigError) -> CoreError {
    CoreError::Persistence {
        message: err.to_string(),
    }
}

#[async_trait]
impl SearchStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await.map_err(|e| persistence(&e))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await.map_err(|e| persistence(&e))?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map).await.map_err(|e| persistence(&e))
    }
}
