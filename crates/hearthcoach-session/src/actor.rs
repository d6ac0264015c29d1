//! Session actor: the Tokio task that owns the connection state.
//!
//! All mutations of the session (phase, retry count, pending deadline,
//! current connection) happen here, one message at a time. Connect attempts
//! and the per-connection reader and writer run as separate tasks and
//! report back over an internal channel, tagged with the generation that
//! spawned them. Bumping the generation (on disconnect, on connection loss
//! or on a new attempt) turns everything still in flight from the old one
//! into noise that is discarded on arrival.

use std::sync::Arc;

use hearthcoach_protocol::{
    decode_inbound, encode_outbound, InboundEvent, JsonCodec, OutboundEvent,
};
use hearthcoach_retry::{ReconnectPolicy, ReconnectTimer, Scheduled};
use hearthcoach_transport::{Connection, Connector, TransportError};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, trace, warn};

use crate::{
    ConnectionPhase, Endpoint, SessionConfig, SessionDiagnostics, SessionError,
    SessionEvent, SessionStatus,
};

/// Requests from [`SessionHandle`](crate::SessionHandle).
pub(crate) enum Command {
    Connect {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Send {
        event: OutboundEvent,
    },
    SetEndpoint {
        endpoint: Endpoint,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SetReconnectPolicy {
        policy: ReconnectPolicy,
    },
    Shutdown,
}

/// Reports from the tasks the actor spawns.
enum Internal<T> {
    Opened { generation: u64, conn: T },
    ConnectFailed { generation: u64, error: TransportError },
    Frame { generation: u64, text: String },
    Closed { generation: u64, error: Option<TransportError> },
    WriteFailed { generation: u64, error: TransportError },
}

impl<T> Internal<T> {
    fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation, .. }
            | Self::ConnectFailed { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Closed { generation, .. }
            | Self::WriteFailed { generation, .. } => *generation,
        }
    }
}

/// One open connection and the two tasks pumping it.
struct Link<T> {
    conn: Arc<T>,
    outbound: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

pub(crate) struct SessionActor<C: Connector> {
    connector: Arc<C>,
    codec: JsonCodec,
    config: SessionConfig,
    phase: ConnectionPhase,
    last_error: Option<String>,
    server_ready: Option<bool>,
    timer: ReconnectTimer,
    generation: u64,
    link: Option<Link<C::Connection>>,
    attempt: Option<JoinHandle<()>>,
    diagnostics: SessionDiagnostics,
    commands: mpsc::Receiver<Command>,
    internal_tx: mpsc::UnboundedSender<Internal<C::Connection>>,
    internal_rx: mpsc::UnboundedReceiver<Internal<C::Connection>>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Sender<SessionStatus>,
}

impl<C: Connector> SessionActor<C> {
    pub(crate) fn new(
        connector: C,
        config: SessionConfig,
        commands: mpsc::Receiver<Command>,
        events: broadcast::Sender<SessionEvent>,
        status: watch::Sender<SessionStatus>,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        Self {
            connector: Arc::new(connector),
            codec: JsonCodec,
            timer: ReconnectTimer::new(config.reconnect),
            config,
            phase: ConnectionPhase::Idle,
            last_error: None,
            server_ready: None,
            generation: 0,
            link: None,
            attempt: None,
            diagnostics: SessionDiagnostics::default(),
            commands,
            internal_tx,
            internal_rx,
            events,
            status,
        }
    }

    /// Runs the actor loop until shutdown or until every handle is dropped.
    pub(crate) async fn run(mut self) {
        info!(endpoint = %self.config.endpoint, "session actor started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                Some(msg) = self.internal_rx.recv() => self.handle_internal(msg),
                attempt = self.timer.wait() => {
                    debug!(attempt, "retrying connection");
                    if let Err(e) = self.start_attempt() {
                        warn!(attempt, error = %e, "retry abandoned");
                    }
                }
            }
        }

        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
        self.timer.reset();
        self.close_link().await;
        self.phase = ConnectionPhase::Idle;
        self.publish_status();
        info!("session actor stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => {
                let result = self.handle_connect();
                let _ = reply.send(result);
            }
            Command::Disconnect { reply } => {
                self.handle_disconnect().await;
                let _ = reply.send(());
            }
            Command::Send { event } => self.handle_send(event),
            Command::SetEndpoint { endpoint, reply } => {
                let result = endpoint.ws_url().map(|url| {
                    debug!(%url, "endpoint updated");
                    self.config.endpoint = endpoint;
                });
                let _ = reply.send(result);
            }
            Command::SetReconnectPolicy { policy } => {
                debug!(
                    max_attempts = policy.max_attempts,
                    step_ms = policy.step.as_millis() as u64,
                    "reconnect policy updated"
                );
                self.timer.set_policy(policy);
                self.config.reconnect = *self.timer.policy();
            }
            Command::Shutdown => {}
        }
    }

    // -----------------------------------------------------------------------
    // Connecting
    // -----------------------------------------------------------------------

    fn handle_connect(&mut self) -> Result<(), SessionError> {
        match self.phase {
            ConnectionPhase::Connecting | ConnectionPhase::Open => {
                trace!(phase = %self.phase, "connect ignored");
                return Ok(());
            }
            // Retry now instead of waiting; the failure count carries over.
            ConnectionPhase::Reconnecting => self.timer.cancel(),
            // A fresh connect after giving up gets a fresh budget.
            ConnectionPhase::Idle | ConnectionPhase::Closing => self.timer.reset(),
        }
        self.start_attempt()
    }

    /// Spawns one connection attempt under a new generation.
    fn start_attempt(&mut self) -> Result<(), SessionError> {
        let url = match self.config.endpoint.ws_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot connect");
                self.timer.reset();
                self.phase = ConnectionPhase::Idle;
                self.last_error = Some(e.to_string());
                self.publish_status();
                return Err(e);
            }
        };

        self.generation += 1;
        let generation = self.generation;
        if let Some(previous) = self.attempt.take() {
            previous.abort();
        }

        self.phase = ConnectionPhase::Connecting;
        self.publish_status();
        info!(%url, generation, "connecting");

        let connector = Arc::clone(&self.connector);
        let tx = self.internal_tx.clone();
        self.attempt = Some(tokio::spawn(async move {
            let msg = match connector.connect(url.as_str()).await {
                Ok(conn) => Internal::Opened { generation, conn },
                Err(error) => Internal::ConnectFailed { generation, error },
            };
            let _ = tx.send(msg);
        }));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Task reports
    // -----------------------------------------------------------------------

    fn handle_internal(&mut self, msg: Internal<C::Connection>) {
        if msg.generation() != self.generation {
            trace!(
                stale = msg.generation(),
                current = self.generation,
                "discarding stale report"
            );
            if let Internal::Opened { conn, .. } = msg {
                tokio::spawn(async move {
                    let _ = conn.close().await;
                });
            }
            return;
        }

        match msg {
            Internal::Opened { generation, conn } => self.on_open(generation, conn),
            Internal::ConnectFailed { error, .. } => {
                self.attempt = None;
                debug!(error = %error, "connect attempt failed");
                self.connection_lost(error.to_string());
            }
            Internal::Frame { text, .. } => self.on_frame(&text),
            Internal::Closed { error, .. } => {
                let reason = match error {
                    Some(e) => e.to_string(),
                    None => "connection closed by server".to_owned(),
                };
                self.connection_lost(reason);
            }
            Internal::WriteFailed { error, .. } => {
                self.connection_lost(error.to_string());
            }
        }
    }

    fn on_open(&mut self, generation: u64, conn: C::Connection) {
        self.attempt = None;
        let conn = Arc::new(conn);
        let id = conn.id();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_loop(
            Arc::clone(&conn),
            generation,
            self.internal_tx.clone(),
        ));
        let writer = tokio::spawn(write_loop(
            Arc::clone(&conn),
            generation,
            outbound_rx,
            self.internal_tx.clone(),
        ));
        self.link = Some(Link {
            conn,
            outbound: outbound_tx,
            reader,
            writer,
        });

        self.phase = ConnectionPhase::Open;
        self.timer.reset();
        self.last_error = None;
        self.server_ready = None;
        info!(connection = %id, "connected");

        self.publish_status();
        self.emit(SessionEvent::ConnectionChanged { connected: true });
    }

    fn on_frame(&mut self, text: &str) {
        self.diagnostics.frames_received += 1;
        trace!(len = text.len(), "frame received");

        match decode_inbound(&self.codec, text) {
            Ok(Some(InboundEvent::Suggestion(suggestion))) => {
                self.diagnostics.suggestions += 1;
                debug!(%suggestion, "suggestion received");
                self.publish_status();
                self.emit(SessionEvent::Suggestion(suggestion));
            }
            Ok(Some(InboundEvent::Status { connected })) => {
                self.server_ready = Some(connected);
                debug!(server_ready = connected, "server status");
                self.publish_status();
                self.emit(SessionEvent::ServerStatus { connected });
            }
            Ok(None) => {
                self.diagnostics.ignored_messages += 1;
                debug!("ignoring message with unhandled type");
                self.publish_status();
            }
            Err(e) => {
                self.diagnostics.malformed_messages += 1;
                debug!(error = %e, "dropping malformed message");
                self.publish_status();
            }
        }
    }

    /// Tears down whatever connection or attempt exists and either schedules
    /// the next retry or gives up.
    fn connection_lost(&mut self, reason: String) {
        // Reader and writer can both report the same loss; only the first counts.
        self.generation += 1;
        if let Some(link) = self.link.take() {
            link.reader.abort();
            link.writer.abort();
            let conn = link.conn;
            tokio::spawn(async move {
                let _ = conn.close().await;
            });
            info!(reason = %reason, "connection lost");
        }

        self.server_ready = None;
        self.last_error = Some(reason);

        match self.timer.schedule_next() {
            Scheduled::Retry { attempt, delay } => {
                self.phase = ConnectionPhase::Reconnecting;
                self.publish_status();
                self.emit(SessionEvent::ConnectionChanged { connected: false });
                self.emit(SessionEvent::ReconnectScheduled { attempt, delay });
            }
            Scheduled::Exhausted => {
                let attempts = self.timer.attempts();
                warn!(attempts, "giving up on reconnecting");
                self.phase = ConnectionPhase::Idle;
                self.publish_status();
                self.emit(SessionEvent::ConnectionChanged { connected: false });
                self.emit(SessionEvent::ReconnectExhausted { attempts });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Disconnecting and sending
    // -----------------------------------------------------------------------

    async fn handle_disconnect(&mut self) {
        let was_connected = self.phase == ConnectionPhase::Open;

        self.timer.reset();
        self.generation += 1;
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }

        if self.link.is_some() {
            self.phase = ConnectionPhase::Closing;
            self.publish_status();
            self.close_link().await;
        }

        self.phase = ConnectionPhase::Idle;
        self.last_error = None;
        self.server_ready = None;
        self.publish_status();
        if was_connected {
            self.emit(SessionEvent::ConnectionChanged { connected: false });
        }
        info!("disconnected");
    }

    /// Flushes queued writes and closes the connection, bounded by the
    /// close timeout.
    async fn close_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        link.reader.abort();
        let writer_abort = link.writer.abort_handle();
        drop(link.outbound);

        let conn = link.conn;
        let writer = link.writer;
        let closing = async {
            let _ = writer.await;
            conn.close().await
        };
        match time::timeout(self.config.close_timeout, closing).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "error while closing connection"),
            Err(_) => debug!("close handshake timed out"),
        }
        writer_abort.abort();
    }

    fn handle_send(&mut self, event: OutboundEvent) {
        let Some(link) = &self.link else {
            self.diagnostics.dropped_sends += 1;
            debug!(kind = event.kind(), "not connected, dropping event");
            self.publish_status();
            return;
        };

        match encode_outbound(&self.codec, &event) {
            Ok(text) => {
                if link.outbound.send(text).is_ok() {
                    self.diagnostics.sent += 1;
                } else {
                    self.diagnostics.dropped_sends += 1;
                }
            }
            Err(e) => warn!(kind = event.kind(), error = %e, "failed to encode event"),
        }
        self.publish_status();
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    fn publish_status(&self) {
        self.status.send_replace(SessionStatus {
            phase: self.phase,
            connected: self.phase == ConnectionPhase::Open,
            last_error: self.last_error.clone(),
            reconnect_attempts: self.timer.attempts(),
            reconnect_pending: self.timer.is_pending(),
            server_ready: self.server_ready,
            diagnostics: self.diagnostics,
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

async fn read_loop<T: Connection>(
    conn: Arc<T>,
    generation: u64,
    tx: mpsc::UnboundedSender<Internal<T>>,
) {
    loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                if tx.send(Internal::Frame { generation, text }).is_err() {
                    return;
                }
            }
            Ok(None) => {
                let _ = tx.send(Internal::Closed {
                    generation,
                    error: None,
                });
                return;
            }
            Err(error) => {
                let _ = tx.send(Internal::Closed {
                    generation,
                    error: Some(error),
                });
                return;
            }
        }
    }
}

async fn write_loop<T: Connection>(
    conn: Arc<T>,
    generation: u64,
    mut rx: mpsc::UnboundedReceiver<String>,
    tx: mpsc::UnboundedSender<Internal<T>>,
) {
    while let Some(text) = rx.recv().await {
        if let Err(error) = conn.send(&text).await {
            let _ = tx.send(Internal::WriteFailed { generation, error });
            return;
        }
    }
}
