// ── Controller state ──
//
// The single aggregate observed by consumers. Mutated only by the fetch
// path and the search debouncer, always through one `watch` sender.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::model::RecordSnapshot;
use crate::source::SourceError;

/// What caused a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshTrigger {
    /// Mount-time load, or any consumer-driven reload.
    Initial,
    /// Manual "pull to refresh" gesture.
    UserPull,
}

/// Why a fetch produced no usable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The connectivity probe reported no connection; no call was made.
    Offline,
    /// The endpoint answered with a non-success status.
    ServerError(u16),
    /// The call could not complete or its payload could not be decoded.
    NetworkError,
}

impl From<&SourceError> for ErrorKind {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::Server { status } => Self::ServerError(*status),
            SourceError::Network { .. } => Self::NetworkError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("offline"),
            Self::ServerError(code) => write!(f, "server error ({code})"),
            Self::NetworkError => f.write_str("network error"),
        }
    }
}

/// Fetch lifecycle status. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum FetchStatus {
    /// Before `start()` has been called.
    #[default]
    Idle,
    /// First load, or a reload with nothing to show yet.
    Loading,
    /// Reloading while a previously fetched collection stays visible.
    RefreshingInBackground,
    Succeeded,
    Failed(ErrorKind),
}

impl FetchStatus {
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Loading | Self::RefreshingInBackground)
    }

    pub fn error_kind(self) -> Option<ErrorKind> {
        match self {
            Self::Failed(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::RefreshingInBackground => "refreshing",
            Self::Succeeded => "ok",
            Self::Failed(_) => "failed",
        }
    }
}

/// The error of the most recent applied fetch, if it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything a consumer needs to render.
///
/// `filtered` equals `filter_records(collection, query)` except while a
/// query edit is waiting out the debounce interval.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub collection: RecordSnapshot,
    pub filtered: RecordSnapshot,
    pub query: String,
    pub status: FetchStatus,
    pub error: Option<FetchError>,
    /// When the current `collection` was fetched. `None` until the first
    /// successful fetch.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Sequence number of the last applied fetch outcome.
    pub(crate) applied_seq: u64,
}

impl Default for ControllerState {
    fn default() -> Self {
        let collection: RecordSnapshot = Arc::new(Vec::new());
        Self {
            filtered: Arc::clone(&collection),
            collection,
            query: String::new(),
            status: FetchStatus::Idle,
            error: None,
            last_fetched_at: None,
            applied_seq: 0,
        }
    }
}

impl ControllerState {
    /// Whether a successful fetch has ever populated `collection`.
    pub fn has_collection(&self) -> bool {
        self.last_fetched_at.is_some()
    }

    /// `true` when `filtered` is a narrowed view rather than the whole collection.
    pub fn is_filtered(&self) -> bool {
        !Arc::ptr_eq(&self.collection, &self.filtered)
    }
}
