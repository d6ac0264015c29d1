//! The session handle: the public face of the session actor.
//!
//! A [`SessionHandle`] is a cheap, cloneable wrapper around the actor's
//! command channel plus the two observation channels (events and status).
//! Every state change happens inside the actor; the handle only asks.

use hearthcoach_protocol::OutboundEvent;
use hearthcoach_retry::ReconnectPolicy;
use hearthcoach_transport::Connector;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::actor::{Command, SessionActor};
use crate::{Endpoint, SessionConfig, SessionError, SessionEvent, SessionStatus};

/// Command channel size. Outbound events queue here while the actor is busy.
const COMMAND_CHANNEL_SIZE: usize = 256;

/// Handle to a running session actor.
///
/// Cloning is cheap; all clones talk to the same session. The actor stops
/// when [`SessionHandle::shutdown`] is called or the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Spawns a session actor on the current Tokio runtime.
    ///
    /// The session starts `Idle`; nothing connects until
    /// [`SessionHandle::connect`] is called.
    pub fn spawn<C: Connector>(connector: C, config: SessionConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(SessionStatus::default());

        let actor =
            SessionActor::new(connector, config, cmd_rx, events_tx.clone(), status_tx);
        tokio::spawn(actor.run());

        Self {
            commands: cmd_tx,
            events: events_tx,
            status: status_rx,
        }
    }

    /// Starts connecting, unless a connection is already open or in flight.
    ///
    /// Returns once the session has acted on the request, not once the
    /// connection is open: watch [`SessionHandle::watch_status`] or the
    /// event stream for that. Transport failures are not errors here; they
    /// trigger the reconnection policy.
    ///
    /// # Errors
    /// - [`SessionError::InvalidEndpoint`] if the configured address is
    ///   unusable. Nothing is retried.
    /// - [`SessionError::Unavailable`] if the session has shut down.
    pub async fn connect(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(Command::Connect { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Closes the connection and cancels any pending retry. Returns once
    /// the session is `Idle`.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(Command::Disconnect { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Queues an event for the server.
    ///
    /// Events sent while no connection is open are dropped (and counted in
    /// [`SessionDiagnostics::dropped_sends`](crate::SessionDiagnostics)).
    /// Events that reach an open connection are written in call order.
    pub async fn send(&self, event: OutboundEvent) -> Result<(), SessionError> {
        self.request(Command::Send { event }).await
    }

    /// Like [`SessionHandle::send`] but never waits; returns `false` if the
    /// command queue is full or the session is gone.
    pub fn try_send(&self, event: OutboundEvent) -> bool {
        self.commands.try_send(Command::Send { event }).is_ok()
    }

    /// Sends one raw game-log line.
    pub async fn send_log_line(
        &self,
        line: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.send(OutboundEvent::log_line(line)).await
    }

    /// Asks the server for a suggestion.
    pub async fn request_suggestion(&self) -> Result<(), SessionError> {
        self.send(OutboundEvent::RequestSuggestion).await
    }

    /// Tells the server to forget the current game.
    pub async fn reset_game_state(&self) -> Result<(), SessionError> {
        self.send(OutboundEvent::ResetGameState).await
    }

    /// Replaces the server address used by the next connection attempt.
    /// An open connection is left alone.
    ///
    /// # Errors
    /// [`SessionError::InvalidEndpoint`] if the address is unusable; the
    /// previous endpoint is kept.
    pub async fn set_endpoint(&self, endpoint: Endpoint) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(Command::SetEndpoint {
            endpoint,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Replaces the retry limits. Failures already counted still count.
    pub async fn set_reconnect_policy(
        &self,
        policy: ReconnectPolicy,
    ) -> Result<(), SessionError> {
        self.request(Command::SetReconnectPolicy { policy }).await
    }

    /// Closes the connection and stops the actor. Later calls on any clone
    /// return [`SessionError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(Command::Shutdown).await
    }

    /// Subscribes to session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// A receiver that observes every status change.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// The current status snapshot.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Whether the session actor is still running.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request(&self, cmd: Command) -> Result<(), SessionError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}
