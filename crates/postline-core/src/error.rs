// ── Core error types ──
//
// Errors from controller operations. Fetch failures are NOT errors at
// this level: they become `FetchStatus::Failed` plus a notification,
// and the controller stays usable.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Controller has not been started")]
    NotStarted,

    #[error("Controller has been shut down")]
    ShutDown,

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Search state persistence failed: {message}")]
    Persistence { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<postline_api::Error> for CoreError {
    fn from(err: postline_api::Error) -> Self {
        match err {
            postline_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            postline_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            err @ postline_api::Error::InvalidToken { .. } => CoreError::Config {
                message: err.to_string(),
            },
            other => CoreError::Internal(other.to_string()),
        }
    }
}
