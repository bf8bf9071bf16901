use thiserror::Error;

/// Top-level error type for the `postline-api` crate.
///
/// Covers every failure mode of a single collection fetch: transport,
/// non-success HTTP status, and payload decoding. `postline-core`
/// classifies these into the user-facing error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The bearer token cannot be sent as an HTTP header value.
    #[error("Invalid API token: {message}")]
    InvalidToken { message: String },

    // ── Remote ──────────────────────────────────────────────────────
    /// The endpoint answered with a non-success status code.
    #[error("Endpoint returned HTTP {status}")]
    Status { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The HTTP status code the endpoint answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the response body could not be decoded.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Deserialization { .. } => true,
            Self::Transport(e) => e.is_decode(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_exposes_code() {
        let err = Error::Status {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.is_transient());
        assert!(!err.is_decode());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = Error::Status {
            status: 404,
            body: "missing".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn deserialization_has_no_status() {
        let err = Error::Deserialization {
            message: "expected array".into(),
            body: "{}".into(),
        };
        assert_eq!(err.status(), None);
        assert!(err.is_decode());
    }
}
