//! The discrete-call client: health probe and one-shot suggestion pulls.

use std::future::Future;
use std::time::Duration;

use hearthcoach_protocol::{
    decode_suggestion, Codec, GameState, JsonCodec, SuggestRequest, Suggestion,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

use crate::RequestError;

/// Per-request time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    pub health_timeout: Duration,
    pub suggest_timeout: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            health_timeout: Duration::from_secs(2),
            suggest_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of the most recent health probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthStatus {
    /// `true` after a probe answered HTTP 200.
    pub available: bool,
    /// Why the last probe failed.
    pub last_error: Option<String>,
    /// Whether any probe has completed yet.
    pub checked: bool,
}

impl HealthStatus {
    pub fn label(&self) -> String {
        match (&self.last_error, self.available, self.checked) {
            (_, true, _) => "Server available".to_owned(),
            (Some(e), false, _) => format!("Server unavailable: {e}"),
            (None, false, true) => "Server unavailable".to_owned(),
            (None, false, false) => "Not checked".to_owned(),
        }
    }
}

/// Client for the server's request/response endpoints.
///
/// Each call is independent and bounded by its own timeout. Health results
/// are also published on a watch channel so a status display can follow
/// them without owning the client.
#[derive(Debug)]
pub struct SuggestionClient {
    http: reqwest::Client,
    base: Url,
    config: RequestConfig,
    codec: JsonCodec,
    health: watch::Sender<HealthStatus>,
}

impl SuggestionClient {
    /// Creates a client for the server at `base` (e.g. `http://localhost:9876/`).
    ///
    /// # Errors
    /// Returns [`RequestError::Transport`] if the HTTP stack can't be
    /// initialised.
    pub fn new(base: Url, config: RequestConfig) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder().build()?;
        let (health, _) = watch::channel(HealthStatus::default());
        Ok(Self {
            http,
            base,
            config,
            codec: JsonCodec,
            health,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Points later calls at a different server. The last health result
    /// no longer applies and is cleared.
    pub fn set_base_url(&mut self, base: Url) {
        if base != self.base {
            debug!(%base, "request base URL changed");
            self.base = base;
            self.health.send_replace(HealthStatus::default());
        }
    }

    pub fn set_config(&mut self, config: RequestConfig) {
        self.config = config;
    }

    /// The latest health result.
    pub fn health(&self) -> HealthStatus {
        self.health.borrow().clone()
    }

    /// A receiver that observes every health result.
    pub fn watch_health(&self) -> watch::Receiver<HealthStatus> {
        self.health.subscribe()
    }

    /// Probes `GET /health`. Only HTTP 200 counts as available.
    ///
    /// # Errors
    /// [`RequestError::Status`] for any other status code, plus the usual
    /// timeout and transport failures. Every outcome is also published to
    /// [`SuggestionClient::watch_health`].
    pub async fn check_health(&self) -> Result<(), RequestError> {
        let result = self.probe_health().await;

        let status = match &result {
            Ok(()) => HealthStatus {
                available: true,
                last_error: None,
                checked: true,
            },
            Err(e) => HealthStatus {
                available: false,
                last_error: Some(e.to_string()),
                checked: true,
            },
        };
        if status.available != self.health.borrow().available {
            info!(available = status.available, "server health changed");
        }
        self.health.send_replace(status);

        result
    }

    async fn probe_health(&self) -> Result<(), RequestError> {
        let url = self.base.join("health")?;
        let timeout = self.config.health_timeout;

        let response = with_timeout(timeout, self.http.get(url).send()).await??;
        match response.status() {
            StatusCode::OK => Ok(()),
            other => {
                debug!(status = other.as_u16(), "health check failed");
                Err(RequestError::Status(other.as_u16()))
            }
        }
    }

    /// Asks `POST /suggest` for the best move in `state`.
    ///
    /// # Errors
    /// [`RequestError::Status`] for a non-2xx answer,
    /// [`RequestError::Protocol`] if the body isn't a suggestion, plus
    /// timeout and transport failures.
    pub async fn get_suggestion(&self, state: &GameState) -> Result<Suggestion, RequestError> {
        let url = self.base.join("suggest")?;
        let body = self.codec.encode(&SuggestRequest { game_state: state })?;
        let timeout = self.config.suggest_timeout;

        let request = async {
            let response = self
                .http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        };

        let text = with_timeout(timeout, request).await??;
        let suggestion = decode_suggestion(&self.codec, &text)?;
        debug!(%suggestion, "suggestion fetched");
        Ok(suggestion)
    }
}

/// Bounds a request future, mapping expiry to [`RequestError::Timeout`].
async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = T>,
) -> Result<T, RequestError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| RequestError::Timeout(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = RequestConfig::default();
        assert_eq!(config.health_timeout, Duration::from_secs(2));
        assert_eq!(config.suggest_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_health_labels() {
        assert_eq!(HealthStatus::default().label(), "Not checked");
        let down = HealthStatus {
            available: false,
            last_error: Some("server returned HTTP 503".into()),
            checked: true,
        };
        assert_eq!(down.label(), "Server unavailable: server returned HTTP 503");
    }

    #[test]
    fn test_set_base_url_clears_health() {
        let base = Url::parse("http://localhost:9876/").unwrap();
        let mut client = SuggestionClient::new(base, RequestConfig::default()).unwrap();
        client.health.send_replace(HealthStatus {
            available: true,
            last_error: None,
            checked: true,
        });

        client.set_base_url(Url::parse("http://10.0.0.2:9876/").unwrap());

        assert_eq!(client.health(), HealthStatus::default());
        assert_eq!(client.base_url().as_str(), "http://10.0.0.2:9876/");
    }
}
