//! Connectivity precondition for completion calls

use async_trait::async_trait;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Resolves the provider host; an unresolvable host means offline
pub struct DnsProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: PROBE_TIMEOUT,
        }
    }

    /// Probe for the host of a base URL. `None` if the URL has no host.
    pub fn for_base_url(base_url: &str) -> Option<Self> {
        let url = reqwest::Url::parse(base_url).ok()?;
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default().unwrap_or(443);
        Some(Self::new(host, port))
    }
}

#[async_trait]
impl ConnectivityProbe for DnsProbe {
    async fn is_online(&self) -> bool {
        let lookup = tokio::net::lookup_host((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                tracing::warn!(host = %self.host, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(host = %self.host, "Connectivity probe timed out");
                false
            }
        }
    }
}
