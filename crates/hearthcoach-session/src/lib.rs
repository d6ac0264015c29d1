//! Streaming session management for Hearthcoach.
//!
//! A session keeps at most one live connection to the suggestion server,
//! forwards outbound events to it, turns inbound frames into
//! [`SessionEvent`]s, and reconnects on a linear backoff when the
//! transport fails.
//!
//! # Architecture
//!
//! [`SessionHandle::spawn`] starts a session actor on the current Tokio
//! runtime and returns a cloneable handle. The handle sends commands; the
//! actor owns every piece of mutable state and publishes:
//!
//! - a `broadcast` stream of [`SessionEvent`]s ([`SessionHandle::subscribe`]);
//! - a `watch` of the latest [`SessionStatus`]
//!   ([`SessionHandle::watch_status`]).
//!
//! The actor is generic over [`Connector`](hearthcoach_transport::Connector),
//! so tests drive it with an in-memory transport.

mod actor;
mod config;
mod error;
mod manager;
mod state;

pub use config::{Endpoint, SessionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::SessionError;
pub use manager::SessionHandle;
pub use state::{ConnectionPhase, SessionDiagnostics, SessionEvent, SessionStatus};

pub use hearthcoach_retry::ReconnectPolicy;
