//! # Hearthcoach
//!
//! Companion client for a Hearthstone suggestion server.
//!
//! A host application (a log tailer, an overlay) streams raw game-log
//! lines to the server and receives move suggestions back. Hearthcoach
//! handles the connection lifecycle, reconnection, the wire format, and
//! the server's discrete health and suggestion endpoints; the host only
//! deals with [`Companion`] and the events it publishes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hearthcoach::prelude::*;
//!
//! # async fn run() -> Result<(), CompanionError> {
//! let config = CompanionConfig::load_or_default("hearthcoach.toml".as_ref())?;
//! hearthcoach::logging::init(&config.log_filter);
//!
//! let companion = Companion::new(config)?;
//! companion.start().await?;
//! companion.session().request_suggestion().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate | Concern |
//! |---|---|
//! | `hearthcoach-transport` | text duplex connections (WebSocket) |
//! | `hearthcoach-protocol` | message shapes and the suggestion model |
//! | `hearthcoach-retry` | linear reconnection backoff |
//! | `hearthcoach-session` | the streaming session actor |
//! | `hearthcoach-http` | health and suggestion requests |

mod companion;
mod config;
mod error;
pub mod logging;

pub use companion::Companion;
pub use config::{CompanionConfig, ConfigError, ReconnectSettings, RequestSettings};
pub use error::CompanionError;

pub use hearthcoach_http as http;
pub use hearthcoach_protocol as protocol;
pub use hearthcoach_retry as retry;
pub use hearthcoach_session as session;
pub use hearthcoach_transport as transport;

/// The types most host applications need.
pub mod prelude {
    pub use crate::{Companion, CompanionConfig, CompanionError};
    pub use hearthcoach_http::{HealthStatus, RequestError};
    pub use hearthcoach_protocol::{
        Action, BoardMinion, GameState, HandCard, OutboundEvent, Suggestion, Target,
        TargetType,
    };
    pub use hearthcoach_session::{
        ConnectionPhase, Endpoint, SessionError, SessionEvent, SessionHandle, SessionStatus,
    };
}
