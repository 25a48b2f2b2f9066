//! Client configuration.

use std::time::Duration;

/// Backing service the original deployment listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Push endpoint, served from the same host as the REST API.
pub const DEFAULT_PUSH_URL: &str = "ws://localhost:8081";

/// Upper bound on a single loader or coordinator call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoints and limits for one viewing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base URL, without a trailing slash.
    pub base_url: String,
    /// WebSocket URL of the push channel.
    pub push_url: String,
    /// Per-call timeout. `None` waits as long as the transport does.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            push_url: DEFAULT_PUSH_URL.to_owned(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl ClientConfig {
    /// Configuration for a service at `base_url`, with the push URL derived
    /// from it (`http` becomes `ws`, `https` becomes `wss`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let push_url = push_url_for(&base_url);
        Self { base_url, push_url, ..Self::default() }
    }

    /// Override the push URL.
    #[must_use]
    pub fn with_push_url(mut self, push_url: impl Into<String>) -> Self {
        self.push_url = push_url.into();
        self
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute URL for an API path such as `/events`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn push_url_for(base_url: &str) -> String {
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.push_url, "ws://localhost:8081");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn push_url_follows_base_scheme() {
        assert_eq!(ClientConfig::new("https://events.example.org/").push_url, "wss://events.example.org");
        assert_eq!(ClientConfig::new("http://127.0.0.1:9000").push_url, "ws://127.0.0.1:9000");
    }

    #[test]
    fn endpoint_joins_path() {
        let config = ClientConfig::new("http://host:1/");
        assert_eq!(config.endpoint("/events/attendees"), "http://host:1/events/attendees");
    }
}
