// ── Runtime controller configuration ──
//
// Describes *where* records come from and how the search pipeline is
// tuned. Never touches disk; the consumer builds a `ControllerConfig`
// and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use postline_api::{ReachabilityProbe, RecordClient, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::persist::SEARCH_KEY;

/// Default quiet period before a query edit is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development endpoints).
    DangerAcceptInvalid,
}

/// Configuration for a single record collection endpoint.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Full URL of the collection resource.
    pub endpoint: Url,
    /// Optional bearer token sent with every fetch.
    pub api_token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout for the remote call.
    pub timeout: Duration,
    /// Deadline for the connectivity probe.
    pub probe_timeout: Duration,
    /// Quiet period of the search debouncer.
    pub debounce: Duration,
    /// Store key holding the persisted query.
    pub search_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("https://jsonplaceholder.typicode.com/posts")
                .unwrap_or_else(|_| unreachable!("static URL parses")),
            api_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(3),
            debounce: DEFAULT_DEBOUNCE,
            search_key: SEARCH_KEY.into(),
        }
    }
}

impl ControllerConfig {
    /// Build the HTTP record source for this endpoint.
    pub fn record_client(&self) -> Result<RecordClient, CoreError> {
        Ok(RecordClient::new(self.endpoint.clone(), &self.transport())?)
    }

    /// Build a TCP reachability probe targeting the endpoint's host.
    pub fn reachability_probe(&self) -> Result<ReachabilityProbe, CoreError> {
        Ok(ReachabilityProbe::for_url(&self.endpoint, self.probe_timeout)?)
    }

    fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
            bearer_token: self.api_token.clone(),
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
