// ── API-to-domain type conversions ──
//
// Bridges raw `postline_api` wire types and errors into canonical
// `postline_core` types.

use postline_api::{Error as ApiError, RecordResponse};

use crate::model::Record;
use crate::source::SourceError;

impl From<RecordResponse> for Record {
    fn from(r: RecordResponse) -> Self {
        Self {
            owner_id: r.owner_id,
            id: r.id,
            title: r.title,
            body: r.body,
        }
    }
}

/// Classify a transport-layer error.
///
/// Anything that carries an HTTP status means the endpoint answered, so
/// it is a server error. Everything else (unreachable host, timeout,
/// undecodable payload, bad TLS setup) means no usable data arrived.
impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        match err.status() {
            Some(status) => SourceError::Server { status },
            None => SourceError::Network {
                message: err.to_string(),
            },
        }
    }
}
