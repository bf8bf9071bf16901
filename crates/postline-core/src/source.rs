// ── Remote collaborators ──
//
// The controller talks to the network only through these two traits.
// Production impls wrap `postline_api`; tests substitute scripted fakes.

use async_trait::async_trait;
use thiserror::Error;

use postline_api::{ReachabilityProbe, RecordClient};

use crate::model::Record;

/// Classified failure of a collection fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The endpoint answered with a non-success status.
    #[error("server responded with HTTP {status}")]
    Server { status: u16 },

    /// No usable response: unreachable, timed out, or undecodable.
    #[error("network error: {message}")]
    Network { message: String },
}

/// Performs the remote call and yields a decoded collection.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Record>, SourceError>;
}

/// Answers "is the device currently connected". Must have no side effects.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_connected(&self) -> bool;
}

#[async_trait]
impl RecordSource for RecordClient {
    async fn fetch_all(&self) -> Result<Vec<Record>, SourceError> {
        let records = self.list_records().await?;
        Ok(records.into_iter().map(Record::from).collect())
    }
}

#[async_trait]
impl ConnectivityProbe for ReachabilityProbe {
    async fn is_connected(&self) -> bool {
        self.is_reachable().await
    }
}
