//! The companion: one streaming session plus one discrete-call client,
//! driven by the user's preferences.

use hearthcoach_http::{HealthStatus, SuggestionClient};
use hearthcoach_protocol::{GameState, Suggestion};
use hearthcoach_session::{SessionEvent, SessionHandle, SessionStatus};
use hearthcoach_transport::{Connector, WebSocketConnector};
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::{CompanionConfig, CompanionError};

/// Entry point for host applications.
///
/// Owns the streaming session and the request client for one suggestion
/// server. Construct one per application and pass it to whatever needs it.
///
/// ```rust,no_run
/// use hearthcoach::prelude::*;
///
/// # async fn run() -> Result<(), CompanionError> {
/// let companion = Companion::new(CompanionConfig::default())?;
/// let mut events = companion.subscribe();
/// companion.start().await?;
///
/// companion.session().send_log_line("D 12:00:00 GameState.DebugPrintPower()").await?;
/// while let Ok(event) = events.recv().await {
///     if let SessionEvent::Suggestion(s) = event {
///         println!("{s}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Companion {
    config: CompanionConfig,
    session: SessionHandle,
    client: SuggestionClient,
}

impl Companion {
    /// Creates a companion that talks WebSocket to the configured server.
    /// Nothing connects until [`Companion::start`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CompanionConfig) -> Result<Self, CompanionError> {
        Self::with_connector(WebSocketConnector::new(), config)
    }

    /// Like [`Companion::new`] with a custom transport.
    pub fn with_connector<C: Connector>(
        connector: C,
        config: CompanionConfig,
    ) -> Result<Self, CompanionError> {
        let base = config.endpoint().http_url()?;
        let client = SuggestionClient::new(base, config.request_config())?;
        let session = SessionHandle::spawn(connector, config.session_config());
        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Connects if the preferences say so.
    pub async fn start(&self) -> Result<(), CompanionError> {
        if self.config.enabled {
            self.session.connect().await?;
        } else {
            info!("companion disabled, not connecting");
        }
        Ok(())
    }

    /// Applies changed preferences.
    ///
    /// A new endpoint reconnects an enabled session; disabling disconnects;
    /// enabling connects. Timeouts and retry limits take effect for the
    /// next request or failure.
    ///
    /// # Errors
    /// If the new address is invalid, nothing changes and the error is
    /// returned.
    pub async fn apply_settings(&mut self, config: CompanionConfig) -> Result<(), CompanionError> {
        let endpoint = config.endpoint();
        let base = endpoint.http_url()?;
        let endpoint_changed = endpoint != self.config.endpoint();

        if endpoint_changed {
            info!(%endpoint, "server address changed");
            self.session.set_endpoint(endpoint).await?;
            self.client.set_base_url(base);
        }
        self.session
            .set_reconnect_policy(config.reconnect_policy())
            .await?;
        self.client.set_config(config.request_config());

        match (config.enabled, endpoint_changed) {
            (false, _) => {
                if self.config.enabled {
                    info!("companion disabled");
                }
                self.session.disconnect().await?;
            }
            (true, true) => {
                self.session.disconnect().await?;
                self.session.connect().await?;
            }
            (true, false) => self.session.connect().await?,
        }

        self.config = config;
        Ok(())
    }

    /// Probes the server's health endpoint.
    pub async fn check_health(&self) -> Result<(), CompanionError> {
        Ok(self.client.check_health().await?)
    }

    /// Pulls one suggestion for `state` over the discrete endpoint.
    pub async fn get_suggestion(&self, state: &GameState) -> Result<Suggestion, CompanionError> {
        Ok(self.client.get_suggestion(state).await?)
    }

    /// Stops the session. The request client needs no teardown.
    pub async fn shutdown(self) -> Result<(), CompanionError> {
        Ok(self.session.shutdown().await?)
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn client(&self) -> &SuggestionClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.session.watch_status()
    }

    pub fn watch_health(&self) -> watch::Receiver<HealthStatus> {
        self.client.watch_health()
    }
}
