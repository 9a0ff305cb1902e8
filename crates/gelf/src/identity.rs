//! Process identity — the hostname attached to outgoing messages when a
//! record carries no per-container override.

use std::time::Duration;

use tracing::debug;

use crate::conf::GelfConfig;

/// The process-wide resolved hostname.
///
/// Resolved once before any stream consumption starts and shared read-only
/// afterwards. Resolution never fails; every step degrades to the next and
/// total failure yields the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessIdentity {
    hostname: String,
}

impl ProcessIdentity {
    /// Identity with a caller-supplied hostname, for runtimes that already
    /// know the name they want on outgoing messages.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    /// Resolve the identity: metadata endpoint body, then OS hostname,
    /// then empty.
    pub async fn resolve(config: &GelfConfig) -> Self {
        let hostname = match Self::from_metadata(config).await {
            Some(name) => name,
            None => os_hostname().unwrap_or_default(),
        };
        Self { hostname }
    }

    /// Platform self-reported host name, taken verbatim from the response
    /// body. Any failure, non-success status, or empty body resolves to
    /// `None`.
    async fn from_metadata(config: &GelfConfig) -> Option<String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.metadata_timeout_ms))
            .build()
            .ok()?;

        let response = match client.get(&config.metadata_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("metadata endpoint unreachable: {}", e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("metadata endpoint answered {}", response.status());
            return None;
        }

        response.text().await.ok().filter(|body| !body.is_empty())
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn is_empty(&self) -> bool {
        self.hostname.is_empty()
    }
}

/// Local OS hostname, queried fresh on every call.
pub(crate) fn os_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        Ok(name) => name
            .to_str()
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        Err(e) => {
            debug!("OS hostname lookup failed: {}", e);
            None
        }
    }
}
