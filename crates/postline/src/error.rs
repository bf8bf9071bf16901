//! CLI error types with miette diagnostics.
//!
//! Maps core, config, and fetch failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use postline_config::ConfigError;
use postline_core::{CoreError, ErrorKind, FetchError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const API: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Fetch failures ───────────────────────────────────────────────
    #[error("No network connection to {endpoint}")]
    #[diagnostic(
        code(postline::offline),
        help(
            "The endpoint host could not be reached.\n\
             Check your connection, then retry with: postline list --pull"
        )
    )]
    Offline { endpoint: String },

    #[error("Network error while fetching {endpoint}: {message}")]
    #[diagnostic(
        code(postline::network_error),
        help("Retry, or increase the request timeout with --timeout.")
    )]
    Network { endpoint: String, message: String },

    #[error("Server error {status} from {endpoint}")]
    #[diagnostic(
        code(postline::server_error),
        help("The endpoint answered but refused the request. Retry later.")
    )]
    Server { endpoint: String, status: u16 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(postline::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(postline::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: postline config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No endpoint configured")]
    #[diagnostic(
        code(postline::no_config),
        help(
            "Create a profile with: postline config init\n\
             Or pass --endpoint / set POSTLINE_ENDPOINT.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(postline::config))]
    Config(Box<figment::Error>),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(postline::config))]
    ConfigInvalid { message: String },

    // ── Search state ─────────────────────────────────────────────────
    #[error("Could not access search state: {message}")]
    #[diagnostic(
        code(postline::state),
        help("Check permissions on the state file, or choose another with --state-file.")
    )]
    State { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(postline::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(postline::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(postline::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(postline::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Offline { .. } | Self::Network { .. } => exit_code::CONNECTION,
            Self::Server { .. } => exit_code::API,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(_)
            | Self::ConfigInvalid { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }

    /// Error for a fetch that settled as `Failed`.
    pub fn from_fetch(endpoint: &url::Url, error: Option<&FetchError>, kind: ErrorKind) -> Self {
        let endpoint = endpoint.to_string();
        match kind {
            ErrorKind::Offline => Self::Offline { endpoint },
            ErrorKind::ServerError(status) => Self::Server { endpoint, status },
            ErrorKind::NetworkError => Self::Network {
                endpoint,
                message: error.map_or_else(|| kind.to_string(), |e| e.message.clone()),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Persistence { message } => CliError::State { message },
            CoreError::Config { message } => CliError::ConfigInvalid { message },
            other @ (CoreError::NotStarted | CoreError::ShutDown | CoreError::Internal(_)) => {
                CliError::Internal {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::ConfigInvalid {
                message: other.to_string(),
            },
        }
    }
}
