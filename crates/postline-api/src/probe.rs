// Connectivity probe
//
// Answers "can we currently reach the endpoint's host" without
// performing the data request itself: a bare TCP connect with a short
// deadline.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// TCP reachability check against a fixed `host:port`.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Derive the probe target from an endpoint URL, using the scheme's
    /// default port when none is given.
    pub fn for_url(url: &Url, timeout: Duration) -> Result<Self, Error> {
        let host = url
            .host_str()
            .ok_or(Error::InvalidUrl(url::ParseError::EmptyHost))?;
        let port = url
            .port_or_known_default()
            .ok_or(Error::InvalidUrl(url::ParseError::InvalidPort))?;
        Ok(Self::new(host, port, timeout))
    }

    /// The `host:port` pair this probe dials.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` if a TCP connection could be opened within the deadline.
    pub async fn is_reachable(&self) -> bool {
        let target = self.target();
        match tokio::time::timeout(self.timeout, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(%target, error = %e, "probe connect failed");
                false
            }
            Err(_) => {
                debug!(%target, timeout_ms = self.timeout.as_millis(), "probe timed out");
                false
            }
        }
    }
}
