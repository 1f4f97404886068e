// ── Runtime connection configuration ──
//
// Describes where the backend lives and how to talk to it. Never touches
// disk: pilotsync-config (or a test) builds a `DashboardConfig` and hands
// it to `Dashboard::new`.

use std::time::Duration;

use pilotsync_api::ReconnectConfig;
use url::Url;

use crate::error::CoreError;

/// Backend address used when nothing else is configured.
pub const DEFAULT_HOST: &str = "localhost:8000";

/// Configuration for one dashboard backend.
///
/// The channel and the control requests share a host; `secure` picks
/// `wss`/`https` over `ws`/`http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// `host[:port]` of the backend process.
    pub host: String,
    /// Use TLS for both the channel and control requests.
    pub secure: bool,
    /// Channel backoff and liveness tuning.
    pub reconnect: ReconnectConfig,
    /// Timeout for a single control request.
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            secure: false,
            reconnect: ReconnectConfig::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl DashboardConfig {
    /// Config for a specific backend host with default tuning.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// WebSocket URL of the state channel.
    pub fn channel_url(&self) -> Result<Url, CoreError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        self.url(scheme)
    }

    /// Base URL for control requests.
    pub fn control_url(&self) -> Result<Url, CoreError> {
        let scheme = if self.secure { "https" } else { "http" };
        self.url(scheme)
    }

    fn url(&self, scheme: &str) -> Result<Url, CoreError> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() || host.contains("://") {
            return Err(CoreError::Config {
                message: format!("backend host must be host[:port], got '{}'", self.host),
            });
        }
        Url::parse(&format!("{scheme}://{host}/")).map_err(|e| CoreError::Config {
            message: format!("invalid backend host '{}': {e}", self.host),
        })
    }
}
