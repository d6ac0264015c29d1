//! Session configuration: where the server is and how hard to retry.

use std::fmt;
use std::time::Duration;

use hearthcoach_retry::ReconnectPolicy;
use url::Url;

use crate::SessionError;

/// Host the suggestion server listens on by default.
pub const DEFAULT_HOST: &str = "localhost";
/// Port the suggestion server listens on by default.
pub const DEFAULT_PORT: u16 = 9876;

/// The suggestion server's address as the user configured it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The streaming URL, `ws://{host}:{port}/`.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidEndpoint`] if the host is empty,
    /// contains characters that would change the URL's meaning (path,
    /// query, credentials), or is otherwise unparseable.
    pub fn ws_url(&self) -> Result<Url, SessionError> {
        self.url("ws")
    }

    /// The base URL for discrete calls, `http://{host}:{port}/`.
    ///
    /// # Errors
    /// Same rules as [`Endpoint::ws_url`].
    pub fn http_url(&self) -> Result<Url, SessionError> {
        self.url("http")
    }

    fn url(&self, scheme: &str) -> Result<Url, SessionError> {
        let host = self.host.trim();
        let invalid = |reason: &str| SessionError::InvalidEndpoint {
            address: self.to_string(),
            reason: reason.to_owned(),
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }
        if host.contains(['/', '?', '#', '@']) {
            return Err(invalid("host must not contain '/', '?', '#' or '@'"));
        }

        // Bare IPv6 literals need brackets inside a URL.
        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        };

        let url = Url::parse(&format!("{scheme}://{authority}"))
            .map_err(|e| invalid(&e.to_string()))?;

        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.port_or_known_default() != Some(self.port) {
            return Err(invalid("port did not survive parsing"));
        }
        Ok(url)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Configuration for a [`SessionHandle`](crate::SessionHandle).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server address used by the next connection attempt.
    pub endpoint: Endpoint,

    /// Retry limits after transport failures.
    pub reconnect: ReconnectPolicy,

    /// How long `disconnect()` waits for the close handshake.
    pub close_timeout: Duration,

    /// Buffered events per subscriber before a slow subscriber starts
    /// missing them.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            reconnect: ReconnectPolicy::default(),
            close_timeout: Duration::from_secs(2),
            event_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_is_localhost_9876() {
        let url = Endpoint::default().ws_url().unwrap();
        assert_eq!(url.as_str(), "ws://localhost:9876/");
    }

    #[test]
    fn test_http_url_uses_http_scheme() {
        let url = Endpoint::new("10.0.0.5", 8080).http_url().unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_default_port_for_scheme_is_accepted() {
        // `Url` hides the port when it equals the scheme default.
        let url = Endpoint::new("example.org", 80).ws_url().unwrap();
        assert_eq!(url.port_or_known_default(), Some(80));
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let url = Endpoint::new("::1", 9876).ws_url().unwrap();
        assert_eq!(url.as_str(), "ws://[::1]:9876/");
    }

    #[test]
    fn test_host_is_trimmed() {
        let url = Endpoint::new("  localhost ", 9876).ws_url().unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_empty_host_is_invalid() {
        let err = Endpoint::new("", 9876).ws_url().unwrap_err();
        assert!(matches!(err, SessionError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_host_with_space_is_invalid() {
        assert!(Endpoint::new("bad host", 9876).ws_url().is_err());
    }

    #[test]
    fn test_host_with_path_is_invalid() {
        assert!(Endpoint::new("localhost/ws", 9876).ws_url().is_err());
    }

    #[test]
    fn test_invalid_endpoint_message_names_address() {
        let err = Endpoint::new("", 1).ws_url().unwrap_err();
        assert!(err.to_string().contains(":1"));
    }
}
